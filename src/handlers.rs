use actix_multipart::{Multipart, MultipartError};
use actix_web::{http::header::AUTHORIZATION, web, HttpRequest, HttpResponse, ResponseError};
use futures_util::StreamExt;
use std::fmt;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::classify::classify;
use crate::error::RelayError;
use crate::models::ClassificationResult;
use crate::preprocess;
use crate::state::AppState;

/// Where a `/predict` request is; a failure in any stage ends the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Normalizing,
    Inferring,
    Classifying,
    Forwarding,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validating => "validating",
            Stage::Normalizing => "normalizing",
            Stage::Inferring => "inferring",
            Stage::Classifying => "classifying",
            Stage::Forwarding => "forwarding",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/predict").route(web::post().to(predict)));
}

pub async fn predict(
    req: HttpRequest,
    payload: Multipart,
    state: web::Data<AppState>,
) -> Result<HttpResponse, RelayError> {
    let span = info_span!("predict", request_id = %Uuid::new_v4());
    let mut stage = Stage::Validating;

    let outcome = relay(&req, payload, &state, &mut stage)
        .instrument(span.clone())
        .await;

    match outcome {
        Ok(body) => Ok(HttpResponse::Ok()
            .content_type("application/json")
            .body(body)),
        Err(err) => {
            let _guard = span.enter();
            if err.status_code().is_client_error() {
                info!(%stage, "Rejected request: {}", err);
            } else {
                error!(%stage, "Request failed: {}", err);
            }
            Err(err)
        }
    }
}

async fn relay(
    req: &HttpRequest,
    payload: Multipart,
    state: &AppState,
    stage: &mut Stage,
) -> Result<String, RelayError> {
    let upload = read_upload(payload, state.max_upload_bytes).await?;

    let upload = match upload {
        Some(upload) => upload,
        None => return Err(RelayError::bad_request("No file part")),
    };
    if upload.filename.is_empty() {
        return Err(RelayError::bad_request("No selected file"));
    }

    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| RelayError::unauthorized("Missing JWT token"))?
        .to_owned();

    if upload.oversized {
        return Err(RelayError::bad_request("File too large"));
    }

    info!(filename = %upload.filename, bytes = upload.bytes.len(), "Received upload");

    *stage = Stage::Normalizing;
    let bytes = upload.bytes;
    let tensor = web::block(move || preprocess::normalize_image(&bytes))
        .await
        .map_err(|e| RelayError::internal(e.to_string()))??;

    *stage = Stage::Inferring;
    let scores = state.upstream.predict(&tensor).await?;

    *stage = Stage::Classifying;
    let prediction = classify(&scores)
        .ok_or_else(|| RelayError::internal("Inference response contains an empty score vector"))?;
    info!(
        class_index = prediction.class_index,
        confidence = prediction.confidence,
        category = %prediction.category,
        "Classified image"
    );

    *stage = Stage::Forwarding;
    let result = ClassificationResult {
        categoria: prediction.category,
        precision: prediction.confidence,
    };
    let body = state.upstream.forward(&result, &token).await?;

    *stage = Stage::Done;
    Ok(body)
}

struct Upload {
    filename: String,
    bytes: Vec<u8>,
    oversized: bool,
}

/// Buffers the first `file` part; other parts are drained and dropped.
async fn read_upload(
    mut payload: Multipart,
    max_bytes: usize,
) -> Result<Option<Upload>, RelayError> {
    let mut upload: Option<Upload> = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(multipart_error)?;

        let filename = {
            let cd = field.content_disposition();
            match (cd.get_name(), cd.get_filename()) {
                (Some("file"), Some(filename)) if upload.is_none() => Some(filename.to_owned()),
                _ => None,
            }
        };

        let filename = match filename {
            Some(filename) => filename,
            None => {
                while let Some(chunk) = field.next().await {
                    chunk.map_err(multipart_error)?;
                }
                continue;
            }
        };

        let mut bytes = Vec::new();
        let mut oversized = false;
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(multipart_error)?;
            if oversized || bytes.len() + chunk.len() > max_bytes {
                oversized = true;
                continue;
            }
            bytes.extend_from_slice(&chunk);
        }

        if oversized {
            bytes = Vec::new();
        }
        upload = Some(Upload {
            filename,
            bytes,
            oversized,
        });
    }

    Ok(upload)
}

fn multipart_error(err: MultipartError) -> RelayError {
    match err {
        // Not a usable multipart body, so there is no file part either.
        MultipartError::NoContentType
        | MultipartError::ParseContentType
        | MultipartError::Boundary
        | MultipartError::NoContentDisposition => RelayError::bad_request("No file part"),
        other => RelayError::internal(other.to_string()),
    }
}
