use bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};

pub const DEFAULT_CONNECTION_STRING: &str = "mongodb://localhost:27017/";
pub const DEFAULT_DB_NAME: &str = "granary";

/// Collection names, overridable through configuration.
#[derive(Debug, Clone)]
pub struct CollectionNames {
    pub documents: String,
    pub vectors: String,
    pub chat_history: String,
    pub conversations: String,
    pub messages: String,
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            documents: "documents".to_string(),
            vectors: "vectors".to_string(),
            chat_history: "chat_history".to_string(),
            conversations: "conversations".to_string(),
            messages: "messages".to_string(),
        }
    }
}

pub async fn connect(connection_string: &str) -> mongodb::error::Result<Client> {
    // The driver validates the scheme; fail early on obvious mistakes
    if !connection_string.starts_with("mongodb://") && !connection_string.starts_with("mongodb+srv://")
    {
        log::warn!("connection string does not look like a MongoDB URI");
    }

    Client::with_uri_str(connection_string).await
}

/// Create missing collections and ensure the indexes the service queries by.
pub async fn init_database(
    client: &Client,
    name: &str,
    collections: &CollectionNames,
) -> mongodb::error::Result<Database> {
    let db = client.database(name);

    let existing = db.list_collection_names().await?;
    let wanted = [
        collections.chat_history.as_str(),
        collections.messages.as_str(),
        collections.documents.as_str(),
        collections.vectors.as_str(),
        collections.conversations.as_str(),
    ];
    for collection in wanted {
        if !existing.iter().any(|c| c == collection) {
            db.create_collection(collection).await?;
        }
    }

    if let Err(e) = create_indexes(&db, collections).await {
        // The service still works unindexed, just slower
        log::warn!("could not create indexes: {}", e);
    }

    Ok(db)
}

async fn create_indexes(
    db: &Database,
    collections: &CollectionNames,
) -> mongodb::error::Result<()> {
    let unique = IndexOptions::builder().unique(true).build();

    let conversations = db.collection::<bson::Document>(&collections.conversations);
    conversations
        .create_index(
            IndexModel::builder()
                .keys(doc! { "conversation_id": 1 })
                .options(unique.clone())
                .build(),
        )
        .await?;
    conversations
        .create_index(
            IndexModel::builder()
                .keys(doc! { "user_id": 1, "updated_at": -1 })
                .build(),
        )
        .await?;

    let messages = db.collection::<bson::Document>(&collections.messages);
    messages
        .create_index(
            IndexModel::builder()
                .keys(doc! { "conversation_id": 1, "timestamp": 1 })
                .build(),
        )
        .await?;
    messages
        .create_index(
            IndexModel::builder()
                .keys(doc! { "message_id": 1 })
                .options(unique)
                .build(),
        )
        .await?;

    let documents = db.collection::<bson::Document>(&collections.documents);
    documents
        .create_index(IndexModel::builder().keys(doc! { "user_id": 1 }).build())
        .await?;

    log::info!("database indexes created");

    Ok(())
}
