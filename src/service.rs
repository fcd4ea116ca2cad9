use crate::app::AppState;
use crate::convert;
use crate::format::TargetFormat;
use axum::http::StatusCode;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Function-as-a-service style invocation envelope carrying the raw HTTP
/// method and the request body as a JSON string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationEvent {
    #[serde(default = "default_method")]
    pub http_method: String,
    #[serde(default = "default_body")]
    pub body: String,
}

fn default_method() -> String {
    "POST".to_string()
}

// An absent body behaves as an empty JSON object, so it falls through to
// the missing-field validation rather than a parse error.
fn default_body() -> String {
    "{}".to_string()
}

/// Response envelope mirroring the invocation contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

#[derive(Debug, Deserialize)]
struct ConvertBody {
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    filename: Option<String>,
}

#[derive(Debug)]
pub struct HandlerError {
    status: StatusCode,
    message: String,
}

impl HandlerError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for HandlerError {}

struct Conversion {
    bytes: Vec<u8>,
    format: TargetFormat,
    filename: String,
}

/// Handles one invocation: method dispatch, validation, conversion and
/// response assembly. Every response carries the CORS allow-origin header.
pub async fn handle(state: Arc<AppState>, event: InvocationEvent) -> InvocationResponse {
    match event.http_method.as_str() {
        "OPTIONS" => preflight_response(),
        "POST" => match convert_event(state, &event).await {
            Ok(conversion) => success_response(&conversion),
            Err(err) => {
                error!("Convert request failed: {} {}", err.status(), err.message());
                error_response(&err)
            }
        },
        method => {
            error!("Method not allowed: {}", method);
            error_response(&HandlerError::method_not_allowed())
        }
    }
}

async fn convert_event(state: Arc<AppState>, event: &InvocationEvent) -> Result<Conversion, HandlerError> {
    info!("Convert request received body_bytes={}", event.body.len());

    let body: ConvertBody =
        serde_json::from_str(&event.body).map_err(|e| HandlerError::internal(e.to_string()))?;

    let file = body.file.unwrap_or_default();
    let token = body.format.unwrap_or_default().to_uppercase();
    let filename = body.filename.unwrap_or_else(|| "converted".to_string());

    if file.is_empty() || token.is_empty() {
        return Err(HandlerError::validation("Missing file or format"));
    }

    let format = TargetFormat::from_token(&token)
        .ok_or_else(|| HandlerError::validation(format!("Unsupported format: {}", token)))?;

    let payload = convert::decode_payload(&file).map_err(|e| HandlerError::internal(e.to_string()))?;
    debug!("Decoded payload: {} bytes", payload.len());

    if let Some(max_size) = state.config.max_payload_size {
        if payload.len() > max_size {
            return Err(HandlerError::validation("File payload is too large"));
        }
    }

    let _permit = state
        .semaphore
        .acquire()
        .await
        .map_err(|_| HandlerError::internal("Semaphore closed"))?;

    let bytes = convert::convert_image(&payload, format)
        .map_err(|e| HandlerError::internal(e.to_string()))?;

    info!(
        "Converted image format={} input_bytes={} output_bytes={}",
        format.token(),
        payload.len(),
        bytes.len()
    );

    Ok(Conversion {
        bytes,
        format,
        filename,
    })
}

/// Replaces the last extension segment of the input filename with the
/// target format's lowercase extension.
fn derive_filename(filename: &str, format: TargetFormat) -> String {
    let stem = match filename.rfind('.') {
        Some(idx) => &filename[..idx],
        None => filename,
    };
    format!("{}.{}", stem, format.extension())
}

fn cors_headers() -> HashMap<String, String> {
    HashMap::from([("Access-Control-Allow-Origin".to_string(), "*".to_string())])
}

fn json_headers() -> HashMap<String, String> {
    let mut headers = cors_headers();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    headers
}

fn preflight_response() -> InvocationResponse {
    let mut headers = cors_headers();
    headers.insert(
        "Access-Control-Allow-Methods".to_string(),
        "POST, OPTIONS".to_string(),
    );
    headers.insert(
        "Access-Control-Allow-Headers".to_string(),
        "Content-Type".to_string(),
    );

    InvocationResponse {
        status_code: StatusCode::OK.as_u16(),
        headers,
        body: String::new(),
        is_base64_encoded: false,
    }
}

fn success_response(conversion: &Conversion) -> InvocationResponse {
    let encoded = general_purpose::STANDARD.encode(&conversion.bytes);
    let body = json!({
        "file": format!("data:{};base64,{}", conversion.format.content_type(), encoded),
        "filename": derive_filename(&conversion.filename, conversion.format),
        "format": conversion.format.token(),
    });

    InvocationResponse {
        status_code: StatusCode::OK.as_u16(),
        headers: json_headers(),
        body: body.to_string(),
        is_base64_encoded: false,
    }
}

fn error_response(err: &HandlerError) -> InvocationResponse {
    InvocationResponse {
        status_code: err.status().as_u16(),
        headers: json_headers(),
        body: json!({ "error": err.message() }).to_string(),
        is_base64_encoded: false,
    }
}
