// src/error.rs

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("malformed landmark set: expected {expected} points, found {found}")]
    MalformedLandmarkSet { expected: usize, found: usize },

    #[error("landmark stream terminated: {reason}")]
    StreamTerminated { reason: String },

    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("YAML error while {context}: {source}")]
    Yaml {
        context: &'static str,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("CSV error while {context}: {source}")]
    Csv {
        context: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("invalid event log (record {record}): {message}")]
    InvalidEventLog { record: usize, message: String },

    #[error("invalid file name {name:?}: {reason}")]
    InvalidFileName { name: String, reason: String },

    #[error("invalid config: {message}")]
    InvalidConfig { message: String },
}

impl ScoringError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn yaml(context: &'static str, source: serde_yaml::Error) -> Self {
        Self::Yaml { context, source }
    }

    pub(crate) fn csv(context: &'static str, source: csv::Error) -> Self {
        Self::Csv { context, source }
    }

    pub(crate) fn stream_terminated(reason: impl Into<String>) -> Self {
        Self::StreamTerminated {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_event_log(record: usize, message: impl Into<String>) -> Self {
        Self::InvalidEventLog {
            record,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_file_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFileName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScoringError>;
