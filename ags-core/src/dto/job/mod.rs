//! Wire shapes for GP job endpoints
//!
//! The server is known to emit heterogeneous message and result records,
//! so the `messages`/`results` fields stay untyped here and go through
//! [`collect_messages`]/[`collect_results`], which skip any record that is
//! not the expected shape instead of failing the whole response.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::domain::job::{JobMessage, MessageKind, TaskResult};

/// Response body of `POST {base}/submitJob`
///
/// `jobId` is optional at the serde level so that a well-formed JSON body
/// without it can be reported as a missing field rather than a parse error.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitJobResponse {
    #[serde(rename = "jobId")]
    pub job_id: Option<String>,
}

/// Response body of `GET {base}/jobs/{id}?f=json`
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusResponse {
    #[serde(rename = "jobStatus")]
    pub job_status: Option<String>,
    #[serde(default)]
    pub messages: Option<Value>,
    #[serde(default)]
    pub results: Option<Value>,
}

/// Response body of `POST {base}/execute`
///
/// A non-null `error` marks a reported failure; there is no job id on this
/// path.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteResponse {
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub messages: Option<Value>,
    #[serde(default)]
    pub results: Option<Value>,
}

impl ExecuteResponse {
    /// Whether the body carries a reported failure
    pub fn is_error(&self) -> bool {
        matches!(&self.error, Some(v) if !v.is_null())
    }
}

/// Collect job messages from a raw `messages` field
///
/// Anything that is not an array yields an empty list. Records that are
/// not objects, lack `type` or `description`, or carry an unrecognized
/// message-type token are dropped.
pub fn collect_messages(raw: Option<&Value>) -> Vec<JobMessage> {
    let Some(Value::Array(records)) = raw else {
        return Vec::new();
    };

    records
        .iter()
        .filter_map(|record| {
            let kind = MessageKind::from_token(record.get("type")?.as_str()?)?;
            let text = record.get("description")?.as_str()?;
            Some(JobMessage::new(kind, text))
        })
        .collect()
}

/// Collect task results from a raw `results` field, keyed by parameter name
///
/// Same skip-on-malformed policy as [`collect_messages`]. A record missing
/// `value` contributes a JSON null, matching what the server means by an
/// empty output.
pub fn collect_results(raw: Option<&Value>) -> HashMap<String, TaskResult> {
    let Some(Value::Array(records)) = raw else {
        return HashMap::new();
    };

    records
        .iter()
        .filter_map(|record| {
            let name = record.get("paramName")?.as_str()?;
            let data_type = record.get("dataType")?.as_str()?;
            let value = record.get("value").cloned().unwrap_or(Value::Null);
            Some((
                name.to_string(),
                TaskResult {
                    name: name.to_string(),
                    data_type: data_type.to_string(),
                    value,
                },
            ))
        })
        .collect()
}
