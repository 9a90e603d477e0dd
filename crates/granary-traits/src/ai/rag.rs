pub mod errors;
pub mod mock;
pub mod rag;

pub use errors::{Error, ErrorCode};
pub use rag::{Chunk, ChunkMetadata, DocumentKind, Index, SearchOption, VectorIndexInner};
