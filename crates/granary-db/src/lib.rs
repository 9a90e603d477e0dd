pub mod checkpointer;
pub mod mongo;
pub mod records;
pub mod repository;

pub use checkpointer::MongoCheckpointer;
pub use mongo::{connect, init_database, CollectionNames};
pub use records::{ConversationRecord, DocumentRecord, MessageKind, MessageRecord};
pub use repository::{ConversationRepository, DocumentRepository, MessageRepository};
