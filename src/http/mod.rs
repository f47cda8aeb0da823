mod error;
mod routes;

use actix_web::web;

pub use error::{ApiError, ErrorBody};
pub use routes::{Health, Message, PredictRequest, PredictResponse, WELCOME_MESSAGE};

/// Registers every endpoint, accepting JSON bodies up to `max_body_bytes`.
/// The `PredictionService` is expected as app data.
pub fn configure(max_body_bytes: usize) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let json = web::JsonConfig::default()
            .limit(max_body_bytes)
            .error_handler(routes::json_error);

        cfg.app_data(json)
            .service(routes::root)
            .service(routes::health)
            .service(routes::predict);
    }
}
