// src/error.rs

use std::fmt;

/// Every fault a pipeline stage can raise.
///
/// "No data" and "write rejected" are not in here: those are ordinary
/// outcomes the orchestrators report as values.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{url} is not a valid source address: {reason}")]
    SourceAddress { url: String, reason: String },
    #[error("connection error while requesting {url}")]
    SourceConnection {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("connection timeout while requesting {url}")]
    SourceTimeout {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("malformed response from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },
    #[error("record {index} has columns [{found}], expected [{expected}]")]
    SchemaMismatch {
        index: usize,
        expected: String,
        found: String,
    },
    #[error("blob {name} not found")]
    BlobNotFound { name: String },
    #[error("blob {name} is not valid UTF-8 text")]
    BlobNotText {
        name: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
    #[error("object store error")]
    Store(#[from] object_store::Error),
    #[error("could not write table")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Classify the fault for the outbound response.
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::SourceAddress { .. } => FailureKind::SourceAddress,
            Error::SourceConnection { .. } => FailureKind::SourceConnection,
            Error::SourceTimeout { .. } => FailureKind::SourceTimeout,
            Error::MalformedResponse { .. } => FailureKind::MalformedResponse,
            Error::SchemaMismatch { .. } => FailureKind::SchemaMismatch,
            Error::BlobNotFound { .. }
            | Error::BlobNotText { .. }
            | Error::Store(_)
            | Error::Csv(_) => FailureKind::Store,
        }
    }

    /// Report a source fault against `shown` instead of the requested address.
    /// Used to keep credentials carried in a query string out of messages.
    pub fn with_url(self, shown: &str) -> Self {
        let url = shown.to_string();
        // reasons may quote the requested address
        let scrub = |old: &str, reason: String| reason.replace(old, shown);
        match self {
            Error::SourceAddress { url: old, reason } => Error::SourceAddress {
                reason: scrub(&old, reason),
                url,
            },
            Error::SourceConnection { source, .. } => Error::SourceConnection {
                url,
                source: source.without_url(),
            },
            Error::SourceTimeout { source, .. } => Error::SourceTimeout {
                url,
                source: source.without_url(),
            },
            Error::MalformedResponse { url: old, reason } => Error::MalformedResponse {
                reason: scrub(&old, reason),
                url,
            },
            other => other,
        }
    }

    /// Full error chain on one line.
    pub fn detail(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            out.push_str(": ");
            out.push_str(&err.to_string());
            source = err.source();
        }
        out
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
    SourceAddress,
    SourceConnection,
    SourceTimeout,
    MalformedResponse,
    SchemaMismatch,
    NoData,
    WriteRejected,
    Store,
}

impl FailureKind {
    pub fn as_str(&self) -> &str {
        match self {
            FailureKind::SourceAddress => "source_address",
            FailureKind::SourceConnection => "source_connection",
            FailureKind::SourceTimeout => "source_timeout",
            FailureKind::MalformedResponse => "malformed_response",
            FailureKind::SchemaMismatch => "schema_mismatch",
            FailureKind::NoData => "no_data",
            FailureKind::WriteRejected => "write_rejected",
            FailureKind::Store => "store",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let err = Error::SourceAddress {
            url: "not a url".to_string(),
            reason: "relative URL without a base".to_string(),
        };
        assert_eq!(err.kind(), FailureKind::SourceAddress);

        let err = Error::BlobNotFound {
            name: "weather_latest.csv".to_string(),
        };
        assert_eq!(err.kind(), FailureKind::Store);
    }

    #[test]
    fn test_with_url_hides_requested_address() {
        let keyed = "http://api.example.com/weather?lat=1&lon=2&appid=s3cret";
        let err = Error::SourceAddress {
            url: keyed.to_string(),
            reason: format!("builder error for url ({})", keyed),
        }
        .with_url("http://api.example.com/weather");

        let detail = err.detail();
        assert!(!detail.contains("s3cret"), "{}", detail);
        assert!(detail.contains("http://api.example.com/weather"));
        assert_eq!(err.kind(), FailureKind::SourceAddress);
    }

    #[test]
    fn test_detail_includes_source_chain() {
        let inner = object_store::Error::Generic {
            store: "memory",
            source: "disk on fire".into(),
        };
        let err = Error::from(inner);
        let detail = err.detail();
        assert!(detail.starts_with("object store error"));
        assert!(detail.contains("disk on fire"));
    }
}
