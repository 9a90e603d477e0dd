use std::fmt;

/// Host side chat-model error.
#[derive(Debug)]
pub struct Error {
    pub code: ErrorCode,
    pub data: anyhow::Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    RequestFailed,
    InvalidResponse,
    Unauthorized,
    NotEnabled,
    Unknown,
}

// Implement Display for ErrorCode
impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let description = match self {
            ErrorCode::RequestFailed => "Model request failed",
            ErrorCode::InvalidResponse => "Invalid model response",
            ErrorCode::Unauthorized => "Unauthorized",
            ErrorCode::NotEnabled => "NotEnabled",
            ErrorCode::Unknown => "Unknown",
        };
        write!(f, "{}", description)
    }
}
