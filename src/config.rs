use granary_db::CollectionNames;

use std::env;
use std::fmt::Display;
use std::str::FromStr;

/// Service configuration, read from the environment with defaults for every
/// setting. A `.env` file is loaded before this runs.
#[derive(Clone, Debug)]
pub struct Config {
    // API settings
    pub api_host: String,
    pub api_port: u16,
    pub log_level: String,

    // MongoDB settings
    pub mongodb_connection_string: String,
    pub db_name: String,
    pub collections: CollectionNames,

    // Vector index backend: "mongo" or "memory"
    pub vector_store: String,

    // OpenAI settings
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub llm_model: String,
    pub llm_temperature: f32,
    pub embedding_model: String,

    // Document processing
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            api_host: env_or("API_HOST", "0.0.0.0"),
            api_port: env_parse("API_PORT", 8000),
            log_level: env_or("LOG_LEVEL", "info"),

            mongodb_connection_string: env_or(
                "MONGODB_CONNECTION_STRING",
                granary_db::mongo::DEFAULT_CONNECTION_STRING,
            ),
            db_name: env_or("DB_NAME", granary_db::mongo::DEFAULT_DB_NAME),
            vector_store: env_or("VECTOR_STORE", "mongo"),
            collections: CollectionNames {
                documents: env_or("DOCUMENTS_COLLECTION", "documents"),
                vectors: env_or("VECTORS_COLLECTION", "vectors"),
                chat_history: env_or("CHAT_HISTORY_COLLECTION", "chat_history"),
                conversations: env_or("CONVERSATIONS_COLLECTION", "conversations"),
                messages: env_or("MESSAGES_COLLECTION", "messages"),
            },

            openai_api_key: env_or("OPENAI_API_KEY", ""),
            openai_base_url: env_or("OPENAI_BASE_URL", granary_openai::DEFAULT_BASE_URL),
            llm_model: env_or("LLM_MODEL", granary_openai::DEFAULT_CHAT_MODEL),
            llm_temperature: env_parse("LLM_TEMPERATURE", granary_openai::DEFAULT_TEMPERATURE),
            embedding_model: env_or("EMBEDDING_MODEL", granary_openai::DEFAULT_EMBEDDING_MODEL),

            chunk_size: env_parse("CHUNK_SIZE", granary_ingest::splitter::DEFAULT_CHUNK_SIZE),
            chunk_overlap: env_parse(
                "CHUNK_OVERLAP",
                granary_ingest::splitter::DEFAULT_CHUNK_OVERLAP,
            ),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr + Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(value) => match value.parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                log::warn!("invalid {} value {:?}, using {}", key, value, default);
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_vars_use_defaults() {
        assert_eq!(env_or("GRANARY_TEST_UNSET_STR", "fallback"), "fallback");
        assert_eq!(env_parse("GRANARY_TEST_UNSET_NUM", 8000u16), 8000);
    }

    #[test]
    fn unparseable_values_fall_back() {
        env::set_var("GRANARY_TEST_BAD_NUM", "not-a-number");
        assert_eq!(env_parse("GRANARY_TEST_BAD_NUM", 42usize), 42);
        env::remove_var("GRANARY_TEST_BAD_NUM");
    }
}
