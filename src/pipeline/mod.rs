// src/pipeline/mod.rs

use chrono::{DateTime, Local};

use crate::error::{Error, FailureKind};

pub mod vehicle;
pub mod weather;

/// `dd-mm-yy_HH-MM-SS`, local time.
pub const REQUEST_TIME_FORMAT: &str = "%d-%m-%y_%H-%M-%S";

/// One invocation's input. The request time is captured once, here, and
/// every blob name of the run derives from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    source_url: String,
    request_time: DateTime<Local>,
}

impl FeedRequest {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self::at(source_url, Local::now())
    }

    pub fn at(source_url: impl Into<String>, request_time: DateTime<Local>) -> Self {
        Self {
            source_url: source_url.into(),
            request_time,
        }
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn request_time(&self) -> DateTime<Local> {
        self.request_time
    }

    /// `<prefix>_<dd-mm-yy_HH-MM-SS>.csv`
    pub fn blob_name(&self, prefix: &str) -> String {
        format!(
            "{}_{}.csv",
            prefix,
            self.request_time.format(REQUEST_TIME_FORMAT)
        )
    }
}

/// How one pipeline run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded { blob_name: String },
    Failed { kind: FailureKind, detail: String },
}

impl Outcome {
    pub fn failed(kind: FailureKind, detail: impl Into<String>) -> Self {
        Outcome::Failed {
            kind,
            detail: detail.into(),
        }
    }

    pub fn no_data() -> Self {
        Outcome::failed(FailureKind::NoData, "no data")
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded { .. })
    }

    pub fn blob_name(&self) -> Option<&str> {
        match self {
            Outcome::Succeeded { blob_name } => Some(blob_name),
            Outcome::Failed { .. } => None,
        }
    }
}

impl From<&Error> for Outcome {
    fn from(err: &Error) -> Self {
        Outcome::failed(err.kind(), err.detail())
    }
}
