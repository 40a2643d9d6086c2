pub mod handlers;

use crate::{
    config::ServerConfig, error::ApiError, models::INVALID_STYLE_MESSAGE, vertex::ImageGenerator,
};
use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;

pub const GENERATE_IMAGE_PATH: &str = "/api/generate-image";

/// Per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn ImageGenerator>,
}

impl AppState {
    pub fn new(generator: Arc<dyn ImageGenerator>) -> Self {
        Self { generator }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(GENERATE_IMAGE_PATH)
            .app_data(query_config())
            .route(web::post().to(handlers::generate_image)),
    );
}

/// A query string that does not fit `StyleQuery` (e.g. `style` repeated) is
/// an invalid style, answered with the same JSON body.
fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        log::debug!("Rejected query string: {}", err);
        ApiError::InvalidArgument(INVALID_STYLE_MESSAGE.to_string()).into()
    })
}

/// Browser frontends are served from another origin, so only POST and its
/// preflight need to pass.
pub fn cors(config: &ServerConfig) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["POST"])
        .allow_any_header()
        .supports_credentials()
        .max_age(3600);

    if config.allows_any_origin() {
        cors.allow_any_origin()
    } else {
        config
            .allowed_origins
            .iter()
            .fold(cors, |cors, origin| cors.allowed_origin(origin))
    }
}

pub async fn run(config: ServerConfig, generator: Arc<dyn ImageGenerator>) -> std::io::Result<()> {
    let state = web::Data::new(AppState::new(generator));
    let bind = (config.host.clone(), config.port);

    log::info!("Listening on http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(cors(&config))
            .wrap(middleware::Logger::new("%a \"%r\" %s %b %Dms"))
            .configure(configure)
    })
    .bind(bind)?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertex::UnavailableGenerator;
    use actix_web::{http::StatusCode, test};

    fn state() -> web::Data<AppState> {
        web::Data::new(AppState::new(Arc::new(UnavailableGenerator::new("test"))))
    }

    #[actix_web::test]
    async fn test_preflight_allows_post_from_any_origin() {
        let app = test::init_service(
            App::new()
                .app_data(state())
                .wrap(cors(&ServerConfig::new()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri(GENERATE_IMAGE_PATH)
            .insert_header(("Origin", "https://fashion-studio.vercel.app"))
            .insert_header(("Access-Control-Request-Method", "POST"))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("https://fashion-studio.vercel.app")
        );
    }

    #[actix_web::test]
    async fn test_get_is_not_allowed() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        let req = test::TestRequest::get().uri(GENERATE_IMAGE_PATH).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
