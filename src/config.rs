use crate::logger::{LogLevel, LoggerConfig};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_PROJECT_ID: &str = "[PASTE-YOUR-PROJECT-ID-HERE]";
pub const DEFAULT_LOCATION: &str = "us-central1";
pub const DEFAULT_CREDENTIALS_FILE: &str = "service_account_key.json";
pub const DEFAULT_MODEL_ID: &str = "imagegeneration@005";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone)]
pub struct VertexConfig {
    pub project_id: String,
    pub location: String,
    pub credentials_path: PathBuf,
    pub model_id: String,
    pub endpoint: Option<String>,
}

impl Default for VertexConfig {
    fn default() -> Self {
        VertexConfig {
            project_id: DEFAULT_PROJECT_ID.to_string(),
            location: DEFAULT_LOCATION.to_string(),
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_FILE),
            model_id: DEFAULT_MODEL_ID.to_string(),
            endpoint: None,
        }
    }
}

impl VertexConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();

        VertexConfig {
            project_id: env_or("GOOGLE_CLOUD_PROJECT", defaults.project_id),
            location: env_or("GOOGLE_CLOUD_LOCATION", defaults.location),
            credentials_path: env::var("GOOGLE_APPLICATION_CREDENTIALS")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.credentials_path),
            model_id: env_or("IMAGEN_MODEL", defaults.model_id),
            endpoint: env::var("VERTEX_ENDPOINT").ok().filter(|v| !v.is_empty()),
        }
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = project_id.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = path.into();
        self
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Overrides the regional API host, e.g. to point at a mock server.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn base_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://{}-aiplatform.googleapis.com", self.location),
        }
    }

    pub fn predict_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:predict",
            self.base_url(),
            self.project_id,
            self.location,
            self.model_id
        )
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            allowed_origins: vec!["*".to_string()],
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let port = env::var("PORT")
            .ok()
            .and_then(|port| port.parse().ok())
            .unwrap_or(defaults.port);
        let allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .ok()
            .map(|raw| parse_origins(&raw))
            .filter(|origins| !origins.is_empty())
            .unwrap_or(defaults.allowed_origins);

        ServerConfig {
            host: env_or("HOST", defaults.host),
            port,
            allowed_origins,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Colored console output at info level.
    #[default]
    Pretty,
    /// Debug level with file locations.
    Dev,
    /// JSON lines without colors.
    Json,
}

impl LogFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" => Some(LogFormat::Pretty),
            "dev" | "development" => Some(LogFormat::Dev),
            "json" | "production" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: Option<LogLevel>,
    pub file: Option<String>,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        LoggingConfig {
            format: env::var("LOG_FORMAT")
                .ok()
                .and_then(|v| LogFormat::parse(&v))
                .unwrap_or_default(),
            level: env::var("LOG_LEVEL")
                .ok()
                .and_then(|v| LogLevel::parse(&v)),
            file: env::var("LOG_FILE").ok().filter(|v| !v.trim().is_empty()),
        }
    }

    /// Preset for `format`, then the level and file overrides on top.
    pub fn logger_config(&self) -> LoggerConfig {
        let mut config = match self.format {
            LogFormat::Pretty => LoggerConfig::default(),
            LogFormat::Dev => LoggerConfig::development(),
            LogFormat::Json => LoggerConfig::production(),
        };
        if let Some(level) = self.level {
            config = config.with_level(level);
        }
        if let Some(path) = &self.file {
            config = config.with_file_output(path);
        }
        config
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub vertex: VertexConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Config {
            server: ServerConfig::from_env(),
            vertex: VertexConfig::from_env(),
            logging: LoggingConfig::from_env(),
        }
    }

    pub fn with_server(mut self, config: ServerConfig) -> Self {
        self.server = config;
        self
    }

    pub fn with_vertex(mut self, config: VertexConfig) -> Self {
        self.vertex = config;
        self
    }

    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging = config;
        self
    }
}

fn env_or(key: &str, default: String) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_defaults() {
        let config = VertexConfig::new();
        assert_eq!(config.location, "us-central1");
        assert_eq!(config.model_id, "imagegeneration@005");
        assert_eq!(
            config.credentials_path,
            PathBuf::from("service_account_key.json")
        );
    }

    #[test]
    fn test_predict_url() {
        let config = VertexConfig::new().with_project("demo-project");
        assert_eq!(
            config.predict_url(),
            "https://us-central1-aiplatform.googleapis.com/v1/projects/demo-project/locations/us-central1/publishers/google/models/imagegeneration@005:predict"
        );
    }

    #[test]
    fn test_predict_url_with_endpoint_override() {
        let config = VertexConfig::new()
            .with_project("p")
            .with_location("europe-west4")
            .with_endpoint("http://127.0.0.1:9000/");
        assert_eq!(
            config.predict_url(),
            "http://127.0.0.1:9000/v1/projects/p/locations/europe-west4/publishers/google/models/imagegeneration@005:predict"
        );
    }

    #[test]
    fn test_server_defaults() {
        let config = ServerConfig::new();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert!(config.allows_any_origin());

        let restricted = config.with_origins(vec!["https://studio.vercel.app".into()]);
        assert!(!restricted.allows_any_origin());
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(" https://a.example , ,https://b.example"),
            vec!["https://a.example", "https://b.example"]
        );
        assert!(parse_origins(" , ").is_empty());
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("JSON"), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse(" dev "), Some(LogFormat::Dev));
        assert_eq!(LogFormat::parse("pretty"), Some(LogFormat::Pretty));
        assert_eq!(LogFormat::parse("xml"), None);
    }

    #[test]
    fn test_logger_config_presets_and_overrides() {
        let dev = LoggingConfig {
            format: LogFormat::Dev,
            ..Default::default()
        }
        .logger_config();
        assert_eq!(dev.min_level, LogLevel::Debug);
        assert!(dev.show_file_location);
        assert!(dev.log_file_path.is_none());

        let prod = LoggingConfig {
            format: LogFormat::Json,
            level: Some(LogLevel::Warn),
            file: Some("studio.log".into()),
        }
        .logger_config();
        assert!(prod.output_json);
        assert_eq!(prod.min_level, LogLevel::Warn);
        assert_eq!(prod.log_file_path.as_deref(), Some("studio.log"));

        let pretty = LoggingConfig::default().logger_config();
        assert_eq!(pretty.min_level, LogLevel::Info);
        assert!(!pretty.output_json);
    }
}
