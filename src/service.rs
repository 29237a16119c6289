//! Request/response interface for exif_trail
//!
//! The daemon exposes the inspector as named operations carried in JSON
//! envelopes. Each request is handled synchronously end to end; the only
//! shared state is the metrics counters.
//!
//! ## Available Operations
//!
//! 1. `exif.inspect` - Full report for one JPEG on disk
//! 2. `gps.convert` - Degree/minute/second triple to decimal degrees
//! 3. `inspector.capabilities` - Capability card query
//! 4. `metrics` - Counter snapshot
//!
//! ## Example
//!
//! ```rust,no_run
//! use exif_trail::service::{InspectorService, Request, Service};
//! use serde_json::json;
//! use std::collections::HashMap;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = InspectorService::default();
//!
//! let response = service.call(Request {
//!     op: "exif.inspect".to_string(),
//!     input: json!({"input_path": "photo.jpg"}),
//!     context: HashMap::new(),
//! }).await?;
//! println!("GPS state: {}", response.output["gps"]["state"]);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::config::InspectorConfig;
use crate::error::InspectError;
use crate::gps::{dms_to_decimal, Hemisphere};
use crate::inspector::Inspector;
use crate::metrics::{Metrics, Timer};
use crate::validation::validate_input;

pub const OPERATIONS: &[&str] = &[
    "exif.inspect",
    "gps.convert",
    "inspector.capabilities",
    "metrics",
];

/// Request envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub op: String,
    #[serde(default)]
    pub input: Value,
    #[serde(default)]
    pub context: HashMap<String, String>,
}

/// Response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub ok: bool,
    pub output: Value,
    pub latency_ms: u64,
}

impl Response {
    pub fn failure(error: impl Into<String>, latency_ms: u64) -> Self {
        Self {
            ok: false,
            output: json!({ "error": error.into() }),
            latency_ms,
        }
    }
}

#[async_trait]
pub trait Service: Send + Sync {
    async fn call(&self, request: Request) -> Result<Response, ServiceError>;
    fn describe(&self) -> ServiceCard;
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Inspect(#[from] InspectError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Service capability card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceCard {
    pub name: String,
    pub version: String,
    pub description: String,
    pub tags: Vec<String>,
    pub functions: Vec<FunctionCard>,
}

/// Function capability card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCard {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub examples: Vec<String>,
    pub idempotent: bool,
    pub side_effects: Vec<String>,
    pub input_schema: Option<Value>,
    pub output_schema: Value,
}

fn inspect_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "input_path": { "type": "string", "description": "Path to a .jpg/.jpeg file" },
            "raw_limit": { "type": "integer", "minimum": 0, "description": "Omit raw values this long or longer (default: 500)" }
        },
        "required": ["input_path"]
    })
}

fn convert_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "dms": {
                "type": "array",
                "items": { "type": "number" },
                "minItems": 3,
                "maxItems": 3,
                "description": "Degrees, minutes, seconds"
            },
            "reference": { "type": "string", "enum": ["N", "S", "E", "W"] }
        },
        "required": ["dms", "reference"]
    })
}

/// Inspector exposed as a request/response service
pub struct InspectorService {
    inspector: Inspector,
    metrics: Arc<Metrics>,
}

impl InspectorService {
    pub fn new(inspector: Inspector) -> Self {
        Self {
            inspector,
            metrics: Metrics::new(),
        }
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    /// Handle exif.inspect operation
    fn handle_inspect(&self, input: &Value) -> Result<Value, ServiceError> {
        validate_input(input, &inspect_schema())?;

        let input_path = input["input_path"]
            .as_str()
            .ok_or_else(|| ServiceError::InvalidInput("Missing input_path".to_string()))?;

        let report = match input["raw_limit"].as_u64() {
            Some(limit) => {
                let config = InspectorConfig {
                    raw_value_limit: limit as usize,
                    ..self.inspector.config().clone()
                };
                self.inspector.reconfigured(config).inspect_path(Path::new(input_path))?
            }
            None => self.inspector.inspect_path(Path::new(input_path))?,
        };

        self.metrics.record_report(&report);
        Ok(serde_json::to_value(&report)?)
    }

    /// Handle gps.convert operation
    fn handle_convert(&self, input: &Value) -> Result<Value, ServiceError> {
        validate_input(input, &convert_schema())?;

        let dms: Vec<f64> = input["dms"]
            .as_array()
            .map(|a| a.iter().filter_map(|v| v.as_f64()).collect())
            .unwrap_or_default();
        let dms: [f64; 3] = dms.try_into()
            .map_err(|_| ServiceError::InvalidInput("dms must hold three numbers".to_string()))?;

        let reference: Hemisphere = input["reference"]
            .as_str()
            .unwrap_or_default()
            .parse()
            .map_err(ServiceError::InvalidInput)?;

        Ok(json!({
            "decimal": dms_to_decimal(dms, reference),
            "reference": reference,
        }))
    }

    fn dispatch(&self, op: &str, input: &Value) -> Result<Value, ServiceError> {
        match op {
            "exif.inspect" => self.handle_inspect(input),
            "gps.convert" => self.handle_convert(input),
            "inspector.capabilities" => Ok(serde_json::to_value(self.describe())?),
            "metrics" => Ok(json!(self.metrics.snapshot())),
            other => Err(ServiceError::UnsupportedOperation(other.to_string())),
        }
    }
}

impl Default for InspectorService {
    fn default() -> Self {
        Self::new(Inspector::default())
    }
}

#[async_trait]
impl Service for InspectorService {
    async fn call(&self, request: Request) -> Result<Response, ServiceError> {
        let timer = Timer::new();
        debug!("Dispatching op={}", request.op);

        let result = self.dispatch(&request.op, &request.input);
        let latency = timer.elapsed_ms();
        self.metrics.record_request(&request.op, result.is_ok(), latency);

        Ok(match result {
            Ok(output) => Response { ok: true, output, latency_ms: latency },
            Err(ServiceError::UnsupportedOperation(op)) => Response {
                ok: false,
                output: json!({
                    "error": "UnsupportedOperation",
                    "op": op,
                    "available_operations": OPERATIONS,
                }),
                latency_ms: latency,
            },
            Err(e) => Response::failure(e.to_string(), latency),
        })
    }

    fn describe(&self) -> ServiceCard {
        ServiceCard {
            name: "exif_trail".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "EXIF metadata inspector: camera summary, raw tags and GPS location for one JPEG".to_string(),
            tags: vec![
                "exif".to_string(),
                "gps".to_string(),
                "metadata".to_string(),
                "jpeg".to_string(),
                "forensics".to_string(),
            ],
            functions: vec![
                FunctionCard {
                    name: "exif.inspect".to_string(),
                    description: "Read the EXIF block of a JPEG and report summary fields, raw tags and GPS state".to_string(),
                    tags: vec!["exif".to_string(), "gps".to_string(), "report".to_string()],
                    examples: vec![
                        "Find where a photo was taken".to_string(),
                        "Check whether an image was stripped of metadata".to_string(),
                    ],
                    idempotent: true,
                    side_effects: vec!["reads image file".to_string()],
                    input_schema: Some(inspect_schema()),
                    output_schema: json!({
                        "type": "object",
                        "properties": {
                            "file_name": { "type": "string" },
                            "exif": { "type": "object" },
                            "gps": { "type": "object" }
                        }
                    }),
                },
                FunctionCard {
                    name: "gps.convert".to_string(),
                    description: "Convert a degree/minute/second triple and hemisphere letter to signed decimal degrees".to_string(),
                    tags: vec!["gps".to_string(), "conversion".to_string()],
                    examples: vec![
                        "40 26 46 N -> 40.446111".to_string(),
                        "79 58 56 W -> -79.982222".to_string(),
                    ],
                    idempotent: true,
                    side_effects: vec![],
                    input_schema: Some(convert_schema()),
                    output_schema: json!({
                        "type": "object",
                        "properties": {
                            "decimal": { "type": "number" },
                            "reference": { "type": "string" }
                        }
                    }),
                },
                FunctionCard {
                    name: "inspector.capabilities".to_string(),
                    description: "Return the capability card with all available functions".to_string(),
                    tags: vec!["discovery".to_string()],
                    examples: vec!["Discover available inspector operations".to_string()],
                    idempotent: true,
                    side_effects: vec![],
                    input_schema: None,
                    output_schema: json!({
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "version": { "type": "string" },
                            "functions": { "type": "array" }
                        }
                    }),
                },
                FunctionCard {
                    name: "metrics".to_string(),
                    description: "Return request counters and inspection outcome counts".to_string(),
                    tags: vec!["observability".to_string()],
                    examples: vec!["Count how many inspected photos carried coordinates".to_string()],
                    idempotent: true,
                    side_effects: vec![],
                    input_schema: None,
                    output_schema: json!({
                        "type": "object",
                        "properties": {
                            "total_requests": { "type": "integer" },
                            "outcomes": { "type": "object" }
                        }
                    }),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(op: &str, input: Value) -> Request {
        Request {
            op: op.to_string(),
            input,
            context: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn test_capabilities() {
        let service = InspectorService::default();
        let response = service.call(request("inspector.capabilities", json!({}))).await.unwrap();
        assert!(response.ok);
        assert_eq!(response.output["name"], "exif_trail");
    }

    #[tokio::test]
    async fn test_unsupported_operation() {
        let service = InspectorService::default();
        let response = service.call(request("invalid.operation", json!({}))).await.unwrap();
        assert!(!response.ok);
        assert_eq!(response.output["error"], "UnsupportedOperation");
    }

    #[tokio::test]
    async fn test_convert() {
        let service = InspectorService::default();
        let response = service
            .call(request("gps.convert", json!({ "dms": [79, 58, 56], "reference": "W" })))
            .await
            .unwrap();
        assert!(response.ok);
        let decimal = response.output["decimal"].as_f64().unwrap();
        assert!((decimal + 79.982222).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_convert_bad_reference() {
        let service = InspectorService::default();
        let response = service
            .call(request("gps.convert", json!({ "dms": [1, 2, 3], "reference": "Q" })))
            .await
            .unwrap();
        assert!(!response.ok);
        assert!(response.output["error"].as_str().unwrap().contains("hemisphere"));
    }

    #[test]
    fn test_card_lists_operations() {
        let card = InspectorService::default().describe();
        let names: Vec<_> = card.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, OPERATIONS);
    }
}
