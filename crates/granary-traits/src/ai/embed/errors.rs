use std::fmt;

/// Host side embedder error.
#[derive(Debug)]
pub struct Error {
    pub code: ErrorCode,
    pub data: anyhow::Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    RequestFailed,
    InvalidResponse,
    NotEnabled,
    Unknown,
}

// Implement Display for ErrorCode
impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let description = match self {
            ErrorCode::RequestFailed => "Embedding request failed",
            ErrorCode::InvalidResponse => "Invalid embedding response",
            ErrorCode::NotEnabled => "NotEnabled",
            ErrorCode::Unknown => "Unknown",
        };
        write!(f, "{}", description)
    }
}
