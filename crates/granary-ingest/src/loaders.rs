use crate::IngestError;

use granary_traits::ai::rag::{ChunkMetadata, DocumentKind};

use chrono::Utc;
use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::Html;

/// A loaded document before splitting: full text plus source metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    pub content: String,
    pub metadata: ChunkMetadata,
}

/// Fetch a web page and extract its readable text.
pub async fn from_url(
    client: &reqwest::Client,
    url: &str,
    title: Option<String>,
) -> Result<Vec<SourceDocument>, IngestError> {
    log::debug!("loading document from URL: {}", url);

    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| IngestError::UrlLoad(e.to_string()))?;
    let body = response
        .text()
        .await
        .map_err(|e| IngestError::UrlLoad(e.to_string()))?;

    let content = extract_text(&body);
    if content.is_empty() {
        return Err(IngestError::UrlLoad(format!("no text content at {}", url)));
    }

    // Fall back to the last path segment, like a filename
    let doc_title = title.unwrap_or_else(|| {
        url.rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(url)
            .to_string()
    });

    log::debug!("loaded {} characters from {}", content.chars().count(), url);

    Ok(vec![SourceDocument {
        content,
        metadata: ChunkMetadata {
            source: url.to_string(),
            title: doc_title,
            kind: DocumentKind::Url,
            user_id: None,
            parent_document_id: None,
            page: None,
            date_added: Utc::now(),
        },
    }])
}

/// Extract page text from a PDF, one document per page.
pub fn from_pdf(
    bytes: &[u8],
    filename: &str,
    title: Option<String>,
) -> Result<Vec<SourceDocument>, IngestError> {
    log::debug!("loading PDF: {}", filename);

    let pdf = lopdf::Document::load_mem(bytes).map_err(|e| IngestError::PdfLoad(e.to_string()))?;

    let doc_title = title.unwrap_or_else(|| filename.to_string());

    let mut documents = Vec::new();
    for (page, _) in pdf.get_pages() {
        let text = pdf
            .extract_text(&[page])
            .map_err(|e| IngestError::PdfLoad(format!("page {}: {}", page, e)))?;
        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        documents.push(SourceDocument {
            content: text.to_string(),
            metadata: ChunkMetadata {
                source: filename.to_string(),
                title: doc_title.clone(),
                kind: DocumentKind::Pdf,
                user_id: None,
                parent_document_id: None,
                page: Some(page),
                date_added: Utc::now(),
            },
        });
    }

    if documents.is_empty() {
        return Err(IngestError::PdfLoad(format!(
            "no extractable text in {}",
            filename
        )));
    }

    log::debug!("loaded {} pages from {}", documents.len(), filename);

    Ok(documents)
}

/// Wrap an already-decoded text file as a single document.
pub fn from_text(
    content: String,
    filename: &str,
    title: Option<String>,
) -> Result<Vec<SourceDocument>, IngestError> {
    if content.trim().is_empty() {
        return Err(IngestError::TextLoad(format!("{} is empty", filename)));
    }

    let doc_title = title.unwrap_or_else(|| filename.to_string());

    Ok(vec![SourceDocument {
        content,
        metadata: ChunkMetadata {
            source: filename.to_string(),
            title: doc_title,
            kind: DocumentKind::Text,
            user_id: None,
            parent_document_id: None,
            page: None,
            date_added: Utc::now(),
        },
    }])
}

/// Visible text of an HTML page, one line per text node.
fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut parts: Vec<String> = Vec::new();
    collect_text(document.tree.root(), &mut parts);

    parts.join("\n")
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut Vec<String>) {
    match node.value() {
        Node::Element(element) => {
            // Markup that never renders as page text
            if matches!(element.name(), "script" | "style" | "noscript") {
                return;
            }
        }
        Node::Text(text) => {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
            return;
        }
        _ => {}
    }

    for child in node.children() {
        collect_text(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn html_extraction_drops_scripts_and_styles() {
        let html = r#"
            <html>
              <head><style>body { color: red; }</style></head>
              <body>
                <h1>Harvest notes</h1>
                <script>console.log("hidden");</script>
                <p>Wheat stores well.</p>
              </body>
            </html>
        "#;

        let text = extract_text(html);
        assert_eq!(text, "Harvest notes\nWheat stores well.");
    }

    #[test]
    fn text_loader_sets_metadata() {
        let documents = from_text("hello".to_string(), "notes.txt", None).unwrap();

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].metadata.source, "notes.txt");
        assert_eq!(documents[0].metadata.title, "notes.txt");
        assert_eq!(documents[0].metadata.kind, DocumentKind::Text);
    }

    #[test]
    fn text_loader_prefers_explicit_title() {
        let documents =
            from_text("hello".to_string(), "notes.txt", Some("Field Notes".to_string())).unwrap();

        assert_eq!(documents[0].metadata.title, "Field Notes");
    }

    #[test]
    fn empty_text_is_rejected() {
        let result = from_text("   \n".to_string(), "notes.txt", None);
        assert!(matches!(result, Err(IngestError::TextLoad(_))));
    }

    #[test]
    fn garbage_pdf_is_rejected() {
        let result = from_pdf(b"not a pdf", "broken.pdf", None);
        assert!(matches!(result, Err(IngestError::PdfLoad(_))));
    }
}
