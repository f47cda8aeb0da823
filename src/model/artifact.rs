use std::{collections::HashSet, fs, path::Path, sync::Arc};

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::{
    ModelHandle,
    estimator::{Estimator, Node, Tree},
    pipeline::HousingPipeline,
};
use crate::{error::LoadError, features::COLUMNS};

/// The artifact format version this build reads and writes.
pub const FORMAT_VERSION: u64 = 1;

/// On-disk description of a fitted housing-price model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u64,
    pub columns: Vec<String>,
    pub preprocessing: PreprocessingSpec,
    pub estimator: EstimatorSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessingSpec {
    pub combined_attributes: CombinedAttributesSpec,
    pub scaler: ScalerSpec,
    pub encoder: EncoderSpec,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CombinedAttributesSpec {
    #[serde(default = "default_true")]
    pub add_bedrooms_per_room: bool,
}

/// Per-feature statistics of a fitted standard scaler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerSpec {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Fitted one-hot encoder for `ocean_proximity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderSpec {
    pub categories: Vec<String>,
    #[serde(default)]
    pub handle_unknown: UnknownCategory,
}

/// What the encoder does with a label it was not fitted on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCategory {
    #[default]
    Error,
    Ignore,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimatorSpec {
    Linear {
        coefficients: Vec<f64>,
        intercept: f64,
    },
    Forest {
        trees: Vec<TreeSpec>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSpec {
    pub nodes: Vec<NodeSpec>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeSpec {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

fn default_true() -> bool {
    true
}

/// Reads the model artifact at `path` and builds a shareable handle.
///
/// # Errors
/// Returns `LoadError` if the file is missing or unreadable, is not a valid
/// artifact document, was written for another format version, or describes an
/// inconsistent model.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<ModelHandle, LoadError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let parse_err = |source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    };

    // The version is checked on the raw document so that a newer schema is
    // reported as such rather than as a parse failure.
    let raw: serde_json::Value = serde_json::from_str(&content).map_err(parse_err)?;
    let found = raw
        .get("format_version")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| LoadError::Invalid("missing numeric format_version".into()))?;
    if found != FORMAT_VERSION {
        return Err(LoadError::UnsupportedVersion {
            found,
            supported: FORMAT_VERSION,
        });
    }

    let artifact: ModelArtifact = serde_json::from_value(raw).map_err(parse_err)?;
    let pipeline = HousingPipeline::try_from(artifact)?;
    log::debug!("loaded model artifact from {}", path.display());

    Ok(Arc::new(pipeline))
}

impl TryFrom<ModelArtifact> for HousingPipeline {
    type Error = LoadError;

    fn try_from(artifact: ModelArtifact) -> Result<Self, Self::Error> {
        if artifact.format_version != FORMAT_VERSION {
            return Err(LoadError::UnsupportedVersion {
                found: artifact.format_version,
                supported: FORMAT_VERSION,
            });
        }
        validate_columns(&artifact.columns)?;

        let PreprocessingSpec {
            combined_attributes,
            scaler,
            encoder,
        } = artifact.preprocessing;

        let numeric_width = HousingPipeline::numeric_width(combined_attributes.add_bedrooms_per_room);
        validate_scaler(&scaler, numeric_width)?;
        validate_encoder(&encoder)?;

        let width = numeric_width + encoder.categories.len();
        let estimator = adapt_estimator(artifact.estimator, width)?;

        Ok(Self {
            add_bedrooms_per_room: combined_attributes.add_bedrooms_per_room,
            mean: Array1::from(scaler.mean),
            scale: Array1::from(scaler.scale),
            categories: encoder.categories,
            handle_unknown: encoder.handle_unknown,
            estimator,
        })
    }
}

// -----------------------------------------------------------------------------
// Validation
// -----------------------------------------------------------------------------

fn validate_columns(columns: &[String]) -> Result<(), LoadError> {
    if columns.len() != COLUMNS.len() || columns.iter().zip(COLUMNS).any(|(a, b)| a != b) {
        return Err(LoadError::Invalid(format!(
            "artifact columns {columns:?} do not match the expected columns {COLUMNS:?}"
        )));
    }
    Ok(())
}

fn validate_scaler(scaler: &ScalerSpec, numeric_width: usize) -> Result<(), LoadError> {
    for (name, values) in [("mean", &scaler.mean), ("scale", &scaler.scale)] {
        if values.len() != numeric_width {
            return Err(LoadError::Invalid(format!(
                "scaler {name} has {} entries, expected {numeric_width}",
                values.len()
            )));
        }
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(LoadError::Invalid(format!(
                "scaler {name}[{i}] is not finite"
            )));
        }
    }

    if let Some(i) = scaler.scale.iter().position(|s| *s == 0.0) {
        return Err(LoadError::Invalid(format!("scaler scale[{i}] is zero")));
    }
    Ok(())
}

fn validate_encoder(encoder: &EncoderSpec) -> Result<(), LoadError> {
    if encoder.categories.is_empty() {
        return Err(LoadError::Invalid(
            "encoder must have at least one category".into(),
        ));
    }

    let mut seen = HashSet::new();
    for category in &encoder.categories {
        if !seen.insert(category.as_str()) {
            return Err(LoadError::Invalid(format!(
                "duplicate encoder category {category:?}"
            )));
        }
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// Adaptation
// -----------------------------------------------------------------------------

fn adapt_estimator(spec: EstimatorSpec, width: usize) -> Result<Estimator, LoadError> {
    match spec {
        EstimatorSpec::Linear {
            coefficients,
            intercept,
        } => {
            if coefficients.len() != width {
                return Err(LoadError::Invalid(format!(
                    "linear estimator has {} coefficients, expected {width}",
                    coefficients.len()
                )));
            }
            if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                return Err(LoadError::Invalid(
                    "linear estimator parameters must be finite".into(),
                ));
            }
            Ok(Estimator::Linear {
                coefficients: Array1::from(coefficients),
                intercept,
            })
        }
        EstimatorSpec::Forest { trees } => {
            if trees.is_empty() {
                return Err(LoadError::Invalid(
                    "forest estimator must have at least one tree".into(),
                ));
            }
            let trees = trees
                .into_iter()
                .enumerate()
                .map(|(i, tree)| adapt_tree(i, tree, width))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Estimator::Forest { trees })
        }
    }
}

fn adapt_tree(tree_idx: usize, spec: TreeSpec, width: usize) -> Result<Tree, LoadError> {
    let len = spec.nodes.len();
    if len == 0 {
        return Err(LoadError::Invalid(format!("tree {tree_idx} has no nodes")));
    }

    let invalid = |idx: usize, msg: String| {
        LoadError::Invalid(format!("tree {tree_idx}, node {idx}: {msg}"))
    };

    let nodes = spec
        .nodes
        .into_iter()
        .enumerate()
        .map(|(idx, node)| match node {
            NodeSpec::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if feature >= width {
                    return Err(invalid(
                        idx,
                        format!("feature {feature} out of range (width {width})"),
                    ));
                }
                if threshold.is_nan() {
                    return Err(invalid(idx, "threshold is NaN".into()));
                }
                for child in [left, right] {
                    if child <= idx || child >= len {
                        return Err(invalid(
                            idx,
                            format!("child {child} must lie in {}..{len}", idx + 1),
                        ));
                    }
                }
                Ok(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                })
            }
            NodeSpec::Leaf { value } => {
                if !value.is_finite() {
                    return Err(invalid(idx, "leaf value is not finite".into()));
                }
                Ok(Node::Leaf { value })
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Tree::new(nodes))
}
