pub mod memory;
pub mod mongo;

pub use memory::MemoryVectorIndex;
pub use mongo::MongoVectorIndex;

use granary_traits::ai::rag::SearchOption;

pub const DEFAULT_SEARCH_LIMIT: usize = 4;

/// Knobs recognized by both index backends.
pub(crate) struct ParsedOptions {
    pub limit: usize,
    pub user_id: Option<String>,
}

pub(crate) fn parse_options(options: &[SearchOption]) -> ParsedOptions {
    let mut parsed = ParsedOptions {
        limit: DEFAULT_SEARCH_LIMIT,
        user_id: None,
    };

    options.iter().for_each(|option| {
        // Match on lowercase option name
        match option.name.to_lowercase().as_str() {
            "limit" => match option.value.parse::<usize>() {
                Ok(value) => {
                    parsed.limit = value;
                }
                Err(_) => {
                    log::warn!("invalid limit value: {}", option.value);
                }
            },
            "user" => {
                parsed.user_id = Some(option.value.clone());
            }
            _ => {
                log::warn!("unexpected option: {}", option.name);
            }
        }
    });

    parsed
}

/// Cosine similarity; zero vectors compare as wholly dissimilar.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_score_one() {
        let v = vec![0.6, 0.8];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn mismatched_lengths_score_zero() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn options_parse_limit_and_user() {
        let options = vec![
            SearchOption {
                name: "Limit".to_string(),
                value: "3".to_string(),
            },
            SearchOption {
                name: "user".to_string(),
                value: "u1".to_string(),
            },
            SearchOption {
                name: "bogus".to_string(),
                value: "x".to_string(),
            },
        ];

        let parsed = parse_options(&options);
        assert_eq!(parsed.limit, 3);
        assert_eq!(parsed.user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn invalid_limit_keeps_default() {
        let options = vec![SearchOption {
            name: "limit".to_string(),
            value: "many".to_string(),
        }];

        assert_eq!(parse_options(&options).limit, DEFAULT_SEARCH_LIMIT);
    }
}
