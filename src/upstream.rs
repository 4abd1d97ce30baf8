use reqwest::{header::AUTHORIZATION, Client, StatusCode, Url};
use serde::de::IgnoredAny;
use tracing::{debug, warn};

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::models::{ClassificationResult, InferenceRequest, InferenceResponse, NormalizedTensor};

/// Talks to the model server and the classification API. Cheap to clone.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: Client,
    inference_url: Url,
    downstream_url: Url,
}

impl UpstreamClient {
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        let http = Client::builder().timeout(config.request_timeout()).build()?;

        Ok(Self {
            http,
            inference_url: config.inference_url.clone(),
            downstream_url: config.downstream_url.clone(),
        })
    }

    /// Sends one instance to the model and returns its score vector.
    pub async fn predict(&self, tensor: &NormalizedTensor) -> Result<Vec<f64>, RelayError> {
        debug!("POST {}", self.inference_url);

        let resp = self
            .http
            .post(self.inference_url.clone())
            .json(&InferenceRequest::single(tensor))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if status != StatusCode::OK {
            warn!("Error from inference service ({}): {}", status, body);
            return Err(RelayError::Inference { details: body });
        }

        let parsed: InferenceResponse = serde_json::from_str(&body)
            .map_err(|e| RelayError::internal(format!("Malformed inference response: {}", e)))?;

        parsed
            .predictions
            .into_iter()
            .next()
            .ok_or_else(|| RelayError::internal("Inference response contains no predictions"))
    }

    /// Stores the result on behalf of the caller; `token` is passed through untouched.
    /// Returns the API's JSON body exactly as received.
    pub async fn forward(
        &self,
        result: &ClassificationResult,
        token: &str,
    ) -> Result<String, RelayError> {
        debug!("POST {}", self.downstream_url);

        let resp = self
            .http
            .post(self.downstream_url.clone())
            .header(AUTHORIZATION, token)
            .json(result)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if status != StatusCode::OK {
            warn!("Error from classification API ({}): {}", status, body);
            return Err(RelayError::Downstream { details: body });
        }

        serde_json::from_str::<IgnoredAny>(&body).map_err(|e| {
            RelayError::internal(format!("Malformed classification API response: {}", e))
        })?;

        Ok(body)
    }
}
