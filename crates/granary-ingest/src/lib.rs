pub mod loaders;
pub mod processor;
pub mod splitter;

pub use loaders::{from_pdf, from_text, from_url, SourceDocument};
pub use processor::DocumentProcessor;
pub use splitter::TextSplitter;

/// Errors raised while loading or processing documents. Load variants are
/// caller mistakes (bad URL, bad file); `Process` is a backend failure.
#[derive(thiserror::Error, Debug)]
pub enum IngestError {
    #[error("Failed to load URL: {0}")]
    UrlLoad(String),
    #[error("Failed to load PDF: {0}")]
    PdfLoad(String),
    #[error("Failed to load text file: {0}")]
    TextLoad(String),
    #[error("Unsupported file type. Please upload PDF or text files.")]
    UnsupportedType,
    #[error("Error processing documents: {0}")]
    Process(String),
}

impl IngestError {
    /// True when the failure is in the caller's input rather than the service.
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, IngestError::Process(_))
    }
}
