pub mod context;
pub mod embed;
pub mod model;
pub mod rag;

pub use model::{Message, Model, ModelInner, Role, ToolCall, ToolSpec};
pub use rag::{Chunk, ChunkMetadata, DocumentKind, Index, SearchOption, VectorIndexInner};
