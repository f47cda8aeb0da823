use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use log::info;

use crate::{
    config::Config,
    error::LoadError,
    http,
    model::load_model,
    service::PredictionService,
};

/// Loads the model named by `config` and wraps it for the request handlers.
///
/// # Errors
/// Returns `LoadError` if the artifact cannot be loaded.
pub fn prepare(config: &Config) -> Result<web::Data<PredictionService>, LoadError> {
    info!("loading model from {}", config.model_path.display());
    let model = load_model(&config.model_path)?;
    info!("model ready: {}", model.describe());
    Ok(web::Data::new(PredictionService::new(model)))
}

/// Loads the model, then serves HTTP until the server is stopped.
///
/// No socket is bound before the model is loaded, so a bad artifact keeps the
/// process from ever accepting traffic.
///
/// # Errors
/// Returns an error if the model cannot be loaded or the address cannot be
/// bound.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let service = prepare(&config)
        .with_context(|| format!("cannot start without a model ({})", config.model_path.display()))?;

    let max_body_bytes = config.max_body_bytes;
    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(service.clone())
            .configure(http::configure(max_body_bytes))
    });
    if let Some(workers) = config.workers {
        server = server.workers(workers.get());
    }

    let addr = config.bind_addr();
    let server = server
        .bind(&addr)
        .with_context(|| format!("cannot bind {}:{}", addr.0, addr.1))?;
    info!("listening at {}:{}", addr.0, addr.1);

    server.run().await?;
    info!("server stopped");
    Ok(())
}
