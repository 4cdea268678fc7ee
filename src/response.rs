// src/response.rs

use serde::Serialize;

use crate::error::FailureKind;
use crate::pipeline::Outcome;

pub const SUCCESS_MESSAGE: &str = "Successfully saved file in blob storage from given url.";
pub const MISSING_DATA_MESSAGE: &str = "No 'data' argument received. Pass 'data' argument with url";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Failed,
    Error,
}

/// What a trigger reports back to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    pub message: String,
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_file_name: Option<String>,
}

impl InvocationResponse {
    fn new(status: ResponseStatus, message: impl Into<String>, error: Option<String>) -> Self {
        Self {
            api_url: None,
            message: message.into(),
            status,
            error,
            new_file_name: None,
        }
    }

    pub fn from_outcome(outcome: &Outcome) -> Self {
        let (kind, detail) = match outcome {
            Outcome::Succeeded { blob_name } => {
                let mut resp = Self::new(ResponseStatus::Success, SUCCESS_MESSAGE, None);
                resp.new_file_name = Some(blob_name.clone());
                return resp;
            }
            Outcome::Failed { kind, detail } => (*kind, detail.clone()),
        };

        match kind {
            // the fault text is the message
            FailureKind::SourceAddress => Self::new(ResponseStatus::Failed, detail, None),
            FailureKind::SourceConnection => {
                Self::new(ResponseStatus::Failed, "Connection error", Some(detail))
            }
            FailureKind::SourceTimeout => {
                Self::new(ResponseStatus::Failed, "Connection timeout", None)
            }
            FailureKind::MalformedResponse | FailureKind::SchemaMismatch => {
                Self::new(ResponseStatus::Failed, "Malformed response", Some(detail))
            }
            FailureKind::Store => Self::new(ResponseStatus::Failed, "Storage error", Some(detail)),
            FailureKind::NoData => Self::new(ResponseStatus::Error, "unknown error", None),
            FailureKind::WriteRejected => {
                Self::new(ResponseStatus::Error, "unknown error", Some(detail))
            }
        }
    }

    /// The vehicle trigger was called without a source URL.
    pub fn missing_data_argument() -> Self {
        Self::new(ResponseStatus::Failed, MISSING_DATA_MESSAGE, None)
    }

    /// The invocation could not be set up (configuration, store connection).
    pub fn setup_failed(detail: impl Into<String>) -> Self {
        Self::new(ResponseStatus::Failed, "Configuration error", Some(detail.into()))
    }

    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        self.api_url = api_url;
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }

    /// 200 on success, 400 otherwise.
    pub fn status_code(&self) -> u16 {
        if self.is_success() {
            200
        } else {
            400
        }
    }
}
