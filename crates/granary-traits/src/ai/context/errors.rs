use std::fmt;

/// Host side checkpointer error.
#[derive(Debug)]
pub struct Error {
    pub code: ErrorCode,
    pub data: anyhow::Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    LoadFailed,
    SaveFailed,
    Unknown,
}

// Implement Display for ErrorCode
impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let description = match self {
            ErrorCode::LoadFailed => "Error loading thread state",
            ErrorCode::SaveFailed => "Error saving thread state",
            ErrorCode::Unknown => "Unknown",
        };
        write!(f, "{}", description)
    }
}
