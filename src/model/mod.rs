mod artifact;
mod estimator;
mod pipeline;

use std::sync::Arc;

use crate::{error::InferenceError, table::FeatureTable};

pub use artifact::{
    CombinedAttributesSpec, EncoderSpec, EstimatorSpec, FORMAT_VERSION, ModelArtifact, NodeSpec,
    PreprocessingSpec, ScalerSpec, TreeSpec, UnknownCategory, load_model,
};
pub use estimator::{Estimator, Tree};
pub use pipeline::HousingPipeline;

/// A fitted model that scores feature tables.
///
/// Implementations are loaded once and only read afterwards, so a handle can
/// be shared across request workers without locking.
pub trait Regressor: Send + Sync {
    /// Produces one prediction per table row, in row order.
    ///
    /// # Errors
    /// Returns `InferenceError` if a value is not something the model can
    /// score (wrong type, unseen category) or the output is not finite.
    fn predict(&self, table: &FeatureTable) -> Result<Vec<f64>, InferenceError>;

    /// Short human-readable summary, used in startup logs.
    fn describe(&self) -> String;
}

/// Shared, read-only model handle owned by the composition root.
pub type ModelHandle = Arc<dyn Regressor>;
