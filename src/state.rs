use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::upstream::UpstreamClient;

/// Per-process state handed to every worker; immutable after start-up.
#[derive(Debug, Clone)]
pub struct AppState {
    pub upstream: UpstreamClient,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        Ok(Self {
            upstream: UpstreamClient::new(config)?,
            max_upload_bytes: config.max_upload_bytes,
        })
    }
}
