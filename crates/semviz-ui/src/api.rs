//! HTTP client for fetching the semantic-model document

use semviz_types::SemanticNode;

use crate::loader::LoadError;

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URLs pass through; paths are joined to the base URL
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, LoadError> {
        let url = self.url_for(path);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LoadError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LoadError::Http {
                status: response.status().as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| LoadError::Transport(e.to_string()))?;
        tracing::info!(url = %url, bytes = bytes.len(), "Fetched semantic model");
        Ok(bytes.to_vec())
    }

    pub async fn get_document(&self, path: &str) -> Result<SemanticNode, LoadError> {
        let bytes = self.get_bytes(path).await?;
        parse_document(&bytes)
    }
}

/// Parse a document body; any serde failure is a load failure
pub fn parse_document(bytes: &[u8]) -> Result<SemanticNode, LoadError> {
    serde_json::from_slice(bytes).map_err(|e| LoadError::InvalidJson(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_url_for() {
        let api = ApiClient::new("http://localhost:3000/");
        assert_eq!(api.url_for("/model.json"), "http://localhost:3000/model.json");
        assert_eq!(api.url_for("model.json"), "http://localhost:3000/model.json");
        assert_eq!(api.url_for("https://cdn.example/m.json"), "https://cdn.example/m.json");
    }

    #[test]
    fn test_parse_document_rejects_unknown_field_type() {
        let err = parse_document(br#"{"name": "x", "field_type": "metric"}"#).unwrap_err();
        assert!(matches!(err, LoadError::InvalidJson(_)));
        assert!(parse_document(b"not json").is_err());
    }

    #[test]
    fn test_parse_document_accepts_camel_case() {
        let doc = parse_document(br#"{"name": "orders", "tableName": "ORDERS", "children": null}"#)
            .unwrap();
        assert_eq!(doc.table_name.as_deref(), Some("ORDERS"));
        assert!(doc.children.is_empty());
    }
}
