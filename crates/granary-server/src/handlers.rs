pub mod chat;
pub mod documents;

use crate::models::SimpleMessageResponse;

use axum::Json;

pub async fn root() -> Json<SimpleMessageResponse> {
    Json(SimpleMessageResponse {
        message: "granary API is running".to_string(),
    })
}

/// Cut a string to `max` characters, marking the cut with an ellipsis.
pub(crate) fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    let truncated: String = text.chars().take(max).collect();
    format!("{}...", truncated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn short_strings_are_untouched() {
        assert_eq!(truncate_with_ellipsis("hello", 50), "hello");
    }

    #[test]
    fn long_strings_get_an_ellipsis() {
        let text = "a".repeat(60);
        let truncated = truncate_with_ellipsis(&text, 50);

        assert_eq!(truncated.chars().count(), 53);
        assert!(truncated.ends_with("..."));
    }
}
