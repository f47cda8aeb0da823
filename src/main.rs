use housing_api::{Config, server};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::from_env()?;
    log::info!("starting with {config:?}");

    server::run(config).await
}
