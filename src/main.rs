use fashion_studio::{logger, server, Config, ImageGenerator, UnavailableGenerator, VertexClient};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let config = Config::from_env();
    let logger_config = config.logging.logger_config();
    logger::init_with_config(logger_config)?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded");
    } else {
        log::debug!("No .env file found, using process environment");
    }

    logger::log_startup_info(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        &config,
    );

    // A broken client must not keep the server down; requests report the cause instead.
    let generator: Arc<dyn ImageGenerator> = match VertexClient::new(config.vertex.clone()).await
    {
        Ok(client) => {
            log::info!("✅ Connected to Google Cloud AI Platform");
            Arc::new(client)
        }
        Err(e) => {
            log::error!(
                "❌ Could not connect to Google Cloud. Check the project id and key file: {}",
                e
            );
            Arc::new(UnavailableGenerator::new(e.to_string()))
        }
    };

    server::run(config.server, generator).await?;
    Ok(())
}
