//! Geoprocessing job domain types
//!
//! Status and message-type vocabularies are fixed lookup tables over the
//! exact token strings the server emits. The client never computes a
//! transition itself; it only translates server tokens into these enums.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a geoprocessing job
///
/// `NotSubmitted` is client-only; every other variant maps 1:1 from a
/// server status token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    NotSubmitted,
    Waiting,
    Submitted,
    Running,
    Succeeded,
    Failed,
    Cancelling,
    Cancelled,
}

impl JobStatus {
    /// Translate a server status token into a status
    ///
    /// Returns `None` for tokens outside the known vocabulary; callers
    /// treat that as a hard error rather than guessing.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "esriJobWaiting" => Some(Self::Waiting),
            "esriJobSubmitted" => Some(Self::Submitted),
            "esriJobExecuting" => Some(Self::Running),
            "esriJobSucceeded" => Some(Self::Succeeded),
            "esriJobFailed" => Some(Self::Failed),
            "esriJobCancelling" => Some(Self::Cancelling),
            "esriJobCancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether the job has finished and will not change state again
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotSubmitted => "not submitted",
            Self::Waiting => "waiting",
            Self::Submitted => "submitted",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelling => "cancelling",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Severity of a job log message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    Informative,
    Warning,
    Error,
    Empty,
    Abort,
}

impl MessageKind {
    /// Translate a message-type token into a kind
    ///
    /// Two historical token families map to the same five kinds. Unknown
    /// tokens yield `None`; the record is then skipped, never escalated.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "esriJobMessageTypeInformative" | "esriGPMessageTypeInformative" => {
                Some(Self::Informative)
            }
            "esriJobMessageTypeWarning" | "esriGPMessageTypeWarning" => Some(Self::Warning),
            "esriJobMessageTypeError" | "esriGPMessageTypeError" => Some(Self::Error),
            "esriJobMessageTypeEmpty" | "esriGPMessageTypeEmpty" => Some(Self::Empty),
            "esriJobMessageTypeAbort" | "esriGPMessageTypeAbort" => Some(Self::Abort),
            _ => None,
        }
    }
}

/// One log line emitted by a job during or after execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl JobMessage {
    pub fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

impl fmt::Display for JobMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// One named output value produced by a completed job
///
/// `data_type` is the server-reported type tag (e.g. "GPString") and is
/// kept opaque; `value` is passed through untyped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub name: String,
    pub data_type: String,
    pub value: serde_json::Value,
}
