mod config;

use config::Config;

use granary_db::repository::{ConversationRepository, DocumentRepository, MessageRepository};
use granary_db::{connect, init_database, MongoCheckpointer};
use granary_engine::EngineBuilder;
use granary_ingest::{DocumentProcessor, TextSplitter};
use granary_openai::OpenAiClient;
use granary_server::{router, AppState};
use granary_store::{MemoryVectorIndex, MongoVectorIndex};
use granary_traits::ai::context::{Checkpointer, CheckpointerInner};
use granary_traits::ai::embed::{Embedder, EmbedderInner};
use granary_traits::ai::model::{Model, ModelInner};
use granary_traits::ai::rag::{Index, VectorIndexInner};

use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; the environment still applies
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    granary_utils::log::init_logger(config.log_level.clone())?;

    if config.openai_api_key.is_empty() {
        log::warn!("OPENAI_API_KEY is not set; model and embedding calls will fail");
    }

    let client = connect(&config.mongodb_connection_string).await?;
    let db = init_database(&client, &config.db_name, &config.collections).await?;
    log::info!("connected to database {}", config.db_name);

    let openai = OpenAiClient::new(config.openai_api_key.clone())
        .base_url(config.openai_base_url.clone())
        .model(config.llm_model.clone())
        .temperature(config.llm_temperature)
        .embedding_model(config.embedding_model.clone());

    let model: Box<dyn ModelInner> = Box::new(openai.clone());
    let embedder: Box<dyn EmbedderInner> = Box::new(openai);
    let embedder: Arc<Embedder> = Arc::new(embedder.into());

    let index: Box<dyn VectorIndexInner> = match config.vector_store.as_str() {
        "memory" => {
            let store = MemoryVectorIndex::new(embedder);
            // Restore whatever a previous run saved
            let dir = granary_utils::paths::default_granary_dir()?.join("index");
            store.load(&dir);
            Box::new(store)
        }
        _ => Box::new(MongoVectorIndex::new(
            &db,
            &config.collections.vectors,
            embedder,
        )),
    };
    let index: Arc<Index> = Arc::new(index.into());

    let checkpointer: Box<dyn CheckpointerInner> = Box::new(MongoCheckpointer::new(
        &db,
        &config.collections.chat_history,
    ));

    let engine = EngineBuilder::new(
        Arc::new(Model::from(model)),
        index.clone(),
        Arc::new(Checkpointer::from(checkpointer)),
    )
    .build();

    let processor = DocumentProcessor::new(
        DocumentRepository::new(&db, &config.collections.documents),
        index,
        TextSplitter::new(config.chunk_size, config.chunk_overlap),
    );

    let state = AppState {
        engine: Arc::new(engine),
        processor: Arc::new(processor),
        conversations: Arc::new(ConversationRepository::new(
            &db,
            &config.collections.conversations,
        )),
        messages: Arc::new(MessageRepository::new(&db, &config.collections.messages)),
        http: reqwest::Client::new(),
        llm_model: config.llm_model.clone(),
        llm_temperature: config.llm_temperature,
    };

    let addr = format!("{}:{}", config.api_host, config.api_port);
    let listener = TcpListener::bind(&addr).await?;
    log::info!("granary API listening on {}", addr);

    axum::serve(listener, router(state)).await?;

    Ok(())
}
