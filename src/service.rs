use crate::{
    error::PredictError,
    features::FeatureRow,
    model::{ModelHandle, Regressor},
    table::FeatureTable,
};

/// Scores raw feature rows with `model`.
///
/// Rows are bound to the fixed column list and handed to the model as one
/// table. The result holds one prediction per row, in input order.
///
/// # Errors
/// Returns `PredictError::ShapeMismatch` if any row does not have exactly one
/// value per column, and `PredictError::Inference` if the model rejects the
/// table.
pub fn predict<M: Regressor + ?Sized>(
    model: &M,
    rows: Vec<FeatureRow>,
) -> Result<Vec<f64>, PredictError> {
    let table = FeatureTable::from_rows(rows)?;
    if table.is_empty() {
        return Ok(Vec::new());
    }

    Ok(model.predict(&table)?)
}

/// The prediction service as injected into request handlers.
#[derive(Clone)]
pub struct PredictionService {
    model: ModelHandle,
}

impl PredictionService {
    pub fn new(model: ModelHandle) -> Self {
        Self { model }
    }

    pub fn predict(&self, rows: Vec<FeatureRow>) -> Result<Vec<f64>, PredictError> {
        predict(self.model.as_ref(), rows)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::{
        error::InferenceError,
        features::FeatureValue::{Number, Text},
    };

    /// Predicts the row's longitude and counts invocations.
    #[derive(Default)]
    struct Echo {
        calls: AtomicUsize,
    }

    impl Regressor for Echo {
        fn predict(&self, table: &FeatureTable) -> Result<Vec<f64>, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            table
                .column("longitude")
                .into_iter()
                .flatten()
                .enumerate()
                .map(|(row, v)| {
                    v.as_number().ok_or(InferenceError::ExpectedNumber {
                        row,
                        column: "longitude",
                    })
                })
                .collect()
        }

        fn describe(&self) -> String {
            "echo".into()
        }
    }

    fn row(longitude: f64) -> FeatureRow {
        let mut values: FeatureRow = (0..8).map(|_| Number(1.0)).collect();
        values[0] = Number(longitude);
        values.push(Text("NEAR BAY".into()));
        values
    }

    #[test]
    fn one_prediction_per_row_in_order() {
        let model = Echo::default();
        let out = predict(&model, vec![row(3.0), row(1.0), row(2.0)]).unwrap();
        assert_eq!(out, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn empty_input_skips_the_model() {
        let model = Echo::default();
        assert_eq!(predict(&model, vec![]).unwrap(), Vec::<f64>::new());
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn shape_error_never_reaches_the_model() {
        let model = Echo::default();
        let mut bad = row(1.0);
        bad.pop();
        let err = predict(&model, vec![row(1.0), bad]).unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn inference_errors_propagate_as_is() {
        let model = Echo::default();
        let mut bad = row(1.0);
        bad[0] = Text("west".into());
        let err = predict(&model, vec![bad]).unwrap_err();
        assert_eq!(
            err,
            PredictError::Inference(InferenceError::ExpectedNumber {
                row: 0,
                column: "longitude"
            })
        );
        assert!(!err.is_client_error());
    }

    #[test]
    fn service_is_idempotent_over_shared_handle() {
        let service = PredictionService::new(Arc::new(Echo::default()));
        let a = service.predict(vec![row(-122.23)]).unwrap();
        let b = service.clone().predict(vec![row(-122.23)]).unwrap();
        assert_eq!(a, b);
    }
}
