use std::fmt;

/// Host side vector-index error.
#[derive(Debug)]
pub struct Error {
    pub code: ErrorCode,
    pub data: anyhow::Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    ConnectionFailed,
    EmbedFailed,
    InsertFailed,
    QueryFailed,
    InvalidOption,
    NotEnabled,
    Unknown,
}

// Implement Display for ErrorCode
impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let description = match self {
            ErrorCode::ConnectionFailed => "ConnectionFailed",
            ErrorCode::EmbedFailed => "EmbedFailed",
            ErrorCode::InsertFailed => "InsertFailed",
            ErrorCode::QueryFailed => "QueryFailed",
            ErrorCode::InvalidOption => "InvalidOption",
            ErrorCode::NotEnabled => "NotEnabled",
            ErrorCode::Unknown => "Unknown",
        };
        write!(f, "{}", description)
    }
}
