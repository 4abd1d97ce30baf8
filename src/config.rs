use clap::Parser;
use reqwest::Url;
use std::time::Duration;

/// Runtime configuration, read once at start-up from flags or `RELAY_*` variables.
#[derive(Parser, Debug, Clone)]
#[command(name = "beef-relay", version, about = "Relays graded carcass images to the model server and the classification API")]
pub struct RelayConfig {
    /// Address to bind
    #[arg(long, env = "RELAY_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind
    #[arg(long, env = "RELAY_PORT", default_value_t = 5000)]
    pub port: u16,

    /// TensorFlow Serving predict endpoint
    #[arg(long, env = "RELAY_INFERENCE_URL")]
    pub inference_url: Url,

    /// Endpoint that stores the classification result
    #[arg(long, env = "RELAY_DOWNSTREAM_URL")]
    pub downstream_url: Url,

    /// Timeout applied to each outbound call
    #[arg(long, env = "RELAY_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Largest accepted upload, in bytes
    #[arg(long, env = "RELAY_MAX_UPLOAD_BYTES", default_value_t = 10 * 1024 * 1024)]
    pub max_upload_bytes: usize,

    /// Send permissive CORS headers for browser callers
    #[arg(long, env = "RELAY_ENABLE_CORS", default_value_t = true, action = clap::ArgAction::Set)]
    pub enable_cors: bool,

    /// Number of HTTP workers (defaults to the number of CPUs)
    #[arg(long, env = "RELAY_WORKERS")]
    pub workers: Option<usize>,
}

impl RelayConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_with_required_urls() {
        let config = RelayConfig::try_parse_from([
            "beef-relay",
            "--inference-url",
            "http://models.local/v1/models/saved3_model:predict",
            "--downstream-url",
            "http://api.local/clasificaciones",
        ])
        .unwrap();

        assert_eq!(config.port, 5000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert!(config.enable_cors);
        assert_eq!(config.inference_url.path(), "/v1/models/saved3_model:predict");
    }

    #[test]
    fn test_cors_can_be_disabled() {
        let config = RelayConfig::try_parse_from([
            "beef-relay",
            "--inference-url",
            "http://models.local/predict",
            "--downstream-url",
            "http://api.local:8080/clasificaciones",
            "--enable-cors",
            "false",
        ])
        .unwrap();

        assert!(!config.enable_cors);
        assert_eq!(config.downstream_url.port(), Some(8080));
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let result = RelayConfig::try_parse_from([
            "beef-relay",
            "--inference-url",
            "not a url",
            "--downstream-url",
            "http://api.local/clasificaciones",
        ]);

        assert!(result.is_err());
    }
}
