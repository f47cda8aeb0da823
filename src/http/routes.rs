use actix_web::{HttpRequest, Responder, error::JsonPayloadError, get, post, web};
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::{features::FeatureRow, service::PredictionService};

pub const WELCOME_MESSAGE: &str = "Welcome to the TP2 ML Model API";

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictRequest {
    pub features: Vec<FeatureRow>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: Vec<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
}

#[get("/")]
pub async fn root() -> impl Responder {
    web::Json(Message {
        message: WELCOME_MESSAGE.to_string(),
    })
}

#[get("/health")]
pub async fn health() -> impl Responder {
    web::Json(Health {
        status: "ok".to_string(),
    })
}

#[post("/predict")]
pub async fn predict(
    service: web::Data<PredictionService>,
    body: web::Json<PredictRequest>,
) -> Result<web::Json<PredictResponse>, ApiError> {
    let rows = body.into_inner().features;
    debug!(rows = rows.len(); "scoring");

    let service = service.into_inner();
    let prediction = web::block(move || service.predict(rows))
        .await
        .map_err(|e| ApiError::Internal(format!("prediction task failed: {e}")))?
        .map_err(|e| {
            if e.is_client_error() {
                warn!("rejected prediction request: {e}");
            } else {
                error!("{e}");
            }
            ApiError::from(e)
        })?;

    Ok(web::Json(PredictResponse { prediction }))
}

/// Turns body extraction failures into API errors. Oversized bodies are kept
/// apart from malformed ones.
pub fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    warn!("rejected request body: {err}");
    match err {
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            ApiError::PayloadTooLarge(err.to_string()).into()
        }
        _ => ApiError::Validation(err.to_string()).into(),
    }
}
