use ndarray::{Array1, Array2};

use super::{Regressor, artifact::UnknownCategory, estimator::Estimator};
use crate::{
    error::InferenceError,
    features::{COLUMNS, FeatureValue, NUMERIC_COLUMNS},
    table::FeatureTable,
};

const TOTAL_ROOMS: usize = 3;
const TOTAL_BEDROOMS: usize = 4;
const POPULATION: usize = 5;
const HOUSEHOLDS: usize = 6;
const CATEGORY: usize = NUMERIC_COLUMNS;

/// Fitted preprocessing followed by a regression estimator.
///
/// Rows go through three stages before reaching the estimator:
/// - ratio features derived from the raw counts,
/// - standard scaling of every numeric feature,
/// - one-hot encoding of `ocean_proximity`, appended after the numeric block.
#[derive(Debug, Clone)]
pub struct HousingPipeline {
    pub(crate) add_bedrooms_per_room: bool,
    pub(crate) mean: Array1<f64>,
    pub(crate) scale: Array1<f64>,
    pub(crate) categories: Vec<String>,
    pub(crate) handle_unknown: UnknownCategory,
    pub(crate) estimator: Estimator,
}

impl HousingPipeline {
    /// Number of numeric features after the derived ratios are appended.
    pub fn numeric_width(add_bedrooms_per_room: bool) -> usize {
        NUMERIC_COLUMNS + if add_bedrooms_per_room { 3 } else { 2 }
    }

    /// Number of columns fed to the estimator.
    pub fn width(&self) -> usize {
        self.mean.len() + self.categories.len()
    }

    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }

    /// Turns a feature table into the estimator's design matrix.
    ///
    /// # Errors
    /// Returns `InferenceError` when a cell has the wrong type for its column,
    /// a derived ratio divides by zero, or a cell holds a category the encoder
    /// was not fitted on (under the `error` policy).
    pub fn transform(&self, table: &FeatureTable) -> Result<Array2<f64>, InferenceError> {
        let numeric_width = self.mean.len();
        let mut x = Array2::<f64>::zeros((table.len(), self.width()));

        for (row, (values, mut out)) in table.rows().iter().zip(x.rows_mut()).enumerate() {
            let mut raw = [0.0; NUMERIC_COLUMNS];
            for (col, slot) in raw.iter_mut().enumerate() {
                *slot = values[col]
                    .as_number()
                    .ok_or(InferenceError::ExpectedNumber {
                        row,
                        column: COLUMNS[col],
                    })?;
            }

            let numeric = raw.iter().copied().chain(self.derived(&raw));
            for (j, v) in numeric.enumerate() {
                let scaled = (v - self.mean[j]) / self.scale[j];
                if !scaled.is_finite() {
                    return Err(InferenceError::NonFiniteFeature { row, feature: j });
                }
                out[j] = scaled;
            }

            if let Some(hot) = self.encode(row, &values[CATEGORY])? {
                out[numeric_width + hot] = 1.0;
            }
        }

        Ok(x)
    }

    fn derived(&self, raw: &[f64; NUMERIC_COLUMNS]) -> impl Iterator<Item = f64> {
        let rooms_per_household = raw[TOTAL_ROOMS] / raw[HOUSEHOLDS];
        let population_per_household = raw[POPULATION] / raw[HOUSEHOLDS];
        let bedrooms_per_room = self
            .add_bedrooms_per_room
            .then(|| raw[TOTAL_BEDROOMS] / raw[TOTAL_ROOMS]);

        [rooms_per_household, population_per_household]
            .into_iter()
            .chain(bedrooms_per_room)
    }

    fn encode(&self, row: usize, value: &FeatureValue) -> Result<Option<usize>, InferenceError> {
        let column = COLUMNS[CATEGORY];
        let label = value
            .as_text()
            .ok_or(InferenceError::ExpectedText { row, column })?;

        match self.categories.iter().position(|c| c == label) {
            Some(idx) => Ok(Some(idx)),
            None => match self.handle_unknown {
                UnknownCategory::Ignore => Ok(None),
                UnknownCategory::Error => Err(InferenceError::UnknownCategory {
                    row,
                    column,
                    value: label.to_string(),
                }),
            },
        }
    }
}

impl Regressor for HousingPipeline {
    fn predict(&self, table: &FeatureTable) -> Result<Vec<f64>, InferenceError> {
        let x = self.transform(table)?;
        let y = self.estimator.predict(x.view());

        if let Some(row) = y.iter().position(|v| !v.is_finite()) {
            return Err(InferenceError::NonFinite { row });
        }

        Ok(y.to_vec())
    }

    fn describe(&self) -> String {
        format!(
            "{} estimator over {} features ({} numeric, {} categories)",
            self.estimator.kind(),
            self.width(),
            self.mean.len(),
            self.categories.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::{
        features::{FeatureRow, FeatureValue::*},
        model::estimator::{Node, Tree},
    };

    fn pipeline(handle_unknown: UnknownCategory) -> HousingPipeline {
        // Identity scaling keeps the expected design matrix readable.
        let width = HousingPipeline::numeric_width(true);
        HousingPipeline {
            add_bedrooms_per_room: true,
            mean: Array1::zeros(width),
            scale: Array1::ones(width),
            categories: vec!["INLAND".into(), "NEAR BAY".into()],
            handle_unknown,
            estimator: Estimator::Linear {
                coefficients: Array1::ones(width + 2),
                intercept: 0.0,
            },
        }
    }

    fn row(category: FeatureValue) -> FeatureRow {
        vec![
            Number(-122.0),
            Number(37.0),
            Number(41.0),
            Number(880.0),
            Number(220.0),
            Number(320.0),
            Number(160.0),
            Number(8.0),
            category,
        ]
    }

    #[test]
    fn transform_appends_ratios_and_one_hot() {
        let table = FeatureTable::from_rows(vec![row(Text("NEAR BAY".into()))]).unwrap();
        let x = pipeline(UnknownCategory::Error).transform(&table).unwrap();
        assert_eq!(
            x,
            array![[
                -122.0, 37.0, 41.0, 880.0, 220.0, 320.0, 160.0, 8.0, 5.5, 2.0, 0.25, 0.0, 1.0
            ]]
        );
    }

    #[test]
    fn scaling_uses_mean_and_scale() {
        let mut p = pipeline(UnknownCategory::Error);
        p.mean[0] = -120.0;
        p.scale[0] = 2.0;
        let table = FeatureTable::from_rows(vec![row(Text("INLAND".into()))]).unwrap();
        let x = p.transform(&table).unwrap();
        assert_eq!(x[[0, 0]], -1.0);
        assert_eq!(x[[0, 11]], 1.0);
        assert_eq!(x[[0, 12]], 0.0);
    }

    #[test]
    fn without_bedrooms_ratio_numeric_block_shrinks() {
        assert_eq!(HousingPipeline::numeric_width(false), 10);
        assert_eq!(HousingPipeline::numeric_width(true), 11);
    }

    #[test]
    fn unknown_category_errors_by_default() {
        let table = FeatureTable::from_rows(vec![row(Text("MOON".into()))]).unwrap();
        let err = pipeline(UnknownCategory::Error).predict(&table).unwrap_err();
        assert_eq!(
            err,
            InferenceError::UnknownCategory {
                row: 0,
                column: "ocean_proximity",
                value: "MOON".into()
            }
        );
    }

    #[test]
    fn unknown_category_can_be_ignored() {
        let table = FeatureTable::from_rows(vec![row(Text("MOON".into()))]).unwrap();
        let x = pipeline(UnknownCategory::Ignore).transform(&table).unwrap();
        assert_eq!(x[[0, 11]], 0.0);
        assert_eq!(x[[0, 12]], 0.0);
    }

    #[test]
    fn text_in_numeric_column_is_an_inference_error() {
        let mut values = row(Text("INLAND".into()));
        values[2] = Text("forty".into());
        let table = FeatureTable::from_rows(vec![values]).unwrap();
        let err = pipeline(UnknownCategory::Error).predict(&table).unwrap_err();
        assert_eq!(
            err,
            InferenceError::ExpectedNumber {
                row: 0,
                column: "housing_median_age"
            }
        );
    }

    #[test]
    fn number_in_categorical_column_is_an_inference_error() {
        let table = FeatureTable::from_rows(vec![row(Number(1.0))]).unwrap();
        let err = pipeline(UnknownCategory::Error).predict(&table).unwrap_err();
        assert!(matches!(err, InferenceError::ExpectedText { row: 0, .. }));
    }

    #[test]
    fn zero_households_is_rejected_before_the_estimator() {
        let mut values = row(Text("INLAND".into()));
        values[6] = Number(0.0);
        let table = FeatureTable::from_rows(vec![values]).unwrap();
        let err = pipeline(UnknownCategory::Error).predict(&table).unwrap_err();
        // rooms_per_household is the first derived feature.
        assert_eq!(err, InferenceError::NonFiniteFeature { row: 0, feature: 8 });
    }

    #[test]
    fn forest_does_not_score_undefined_ratios() {
        let mut p = pipeline(UnknownCategory::Error);
        p.estimator = Estimator::Forest {
            trees: vec![Tree::new(vec![
                Node::Split {
                    feature: 8,
                    threshold: 5.0,
                    left: 1,
                    right: 2,
                },
                Node::Leaf { value: 100000.0 },
                Node::Leaf { value: 300000.0 },
            ])],
        };

        let mut inf_ratio = row(Text("INLAND".into()));
        inf_ratio[6] = Number(0.0);
        let mut nan_ratio = inf_ratio.clone();
        nan_ratio[3] = Number(0.0);

        for values in [inf_ratio, nan_ratio] {
            let table =
                FeatureTable::from_rows(vec![row(Text("INLAND".into())), values]).unwrap();
            let err = p.predict(&table).unwrap_err();
            assert!(
                matches!(err, InferenceError::NonFiniteFeature { row: 1, .. }),
                "{err:?}"
            );
        }
    }

    #[test]
    fn predictions_follow_row_order() {
        let mut second = row(Text("INLAND".into()));
        second[7] = Number(9.0);
        let table =
            FeatureTable::from_rows(vec![row(Text("INLAND".into())), second]).unwrap();
        let y = pipeline(UnknownCategory::Error).predict(&table).unwrap();
        assert_eq!(y.len(), 2);
        assert_eq!(y[1] - y[0], 1.0);
    }
}
