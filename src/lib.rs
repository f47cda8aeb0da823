pub mod config;
pub mod error;
pub mod features;
pub mod http;
pub mod model;
pub mod server;
pub mod service;
pub mod table;

pub use config::Config;
pub use error::{ConfigError, InferenceError, LoadError, PredictError};
pub use features::{COLUMNS, FeatureRow, FeatureValue};
pub use model::{ModelHandle, Regressor, load_model};
pub use service::{PredictionService, predict};
pub use table::FeatureTable;
