//! Error taxonomy for the logger
//!
//! Every variant is fatal. The operator interrupt is not an error and
//! never shows up here.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("invalid configuration: {field}: {reason}")]
    Config { field: String, reason: String },

    #[error("connect failed: could not open {port}: {source}")]
    Connect {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("connection lost on {port}: {reason}")]
    Disconnected { port: String, reason: String },

    #[error("decode failed: line {line_number} is not valid UTF-8: {source}")]
    Decode {
        line_number: u64,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("decode failed: {port} sent more than {limit} bytes without a line terminator")]
    LineTooLong { port: String, limit: usize },

    #[error("write failed: {}: {source}", .path.display())]
    Sink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Broad category a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Connection,
    Decode,
    Io,
}

impl LoggerError {
    pub fn config(field: &str, reason: impl Into<String>) -> Self {
        Self::Config {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config { .. } => ErrorKind::Config,
            Self::Connect { .. } | Self::Disconnected { .. } => ErrorKind::Connection,
            Self::Decode { .. } | Self::LineTooLong { .. } => ErrorKind::Decode,
            Self::Sink { .. } => ErrorKind::Io,
        }
    }

    /// Short name of the stage that failed
    pub fn stage(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Config => "configure",
            ErrorKind::Connection => "connect",
            ErrorKind::Decode => "decode",
            ErrorKind::Io => "write",
        }
    }
}

pub type Result<T> = std::result::Result<T, LoggerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        let err = LoggerError::config("baud_rate", "must be greater than 0");
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(err.stage(), "configure");

        let err = LoggerError::Disconnected {
            port: "/dev/ttyUSB0".to_string(),
            reason: "device closed the stream".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Connection);
        assert_eq!(err.stage(), "connect");

        let err = LoggerError::Sink {
            path: PathBuf::from("out.txt"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        assert_eq!(err.stage(), "write");
        assert!(err.to_string().starts_with("write failed: out.txt"));
    }

    #[test]
    fn test_decode_message_names_line() {
        let source = String::from_utf8(vec![0xff, 0xfe]).unwrap_err();
        let err = LoggerError::Decode {
            line_number: 4,
            source,
        };
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(err.to_string().contains("line 4"));
    }
}
