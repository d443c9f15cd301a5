//! Configuration for index building and retrieval.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Chunking and retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RagConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Separators tried in order, coarsest first.
    pub separators: Vec<String>,
    /// Number of top results to return from vector search.
    pub top_k: usize,
    /// Minimum similarity score for results (results below this are filtered out).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_threshold: Option<f32>,
    /// Maximum number of embedding calls in flight while building an index.
    pub embed_concurrency: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 700,
            chunk_overlap: 100,
            separators: vec!["\n\n".to_string(), ".".to_string()],
            top_k: 4,
            similarity_threshold: None,
            embed_concurrency: 5,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Parse and validate a JSON configuration. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RagConfig = serde_json::from_str(json)
            .map_err(|e| RagError::ConfigError(format!("invalid config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| RagError::LoadError { path: path.to_path_buf(), source })?;
        Self::from_json_str(&json)
    }

    /// Check that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0` or `embed_concurrency == 0`
    /// - any separator is the empty string
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RagError::ConfigError("chunk_size must be greater than zero".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::ConfigError(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }
        if self.embed_concurrency == 0 {
            return Err(RagError::ConfigError(
                "embed_concurrency must be greater than zero".to_string(),
            ));
        }
        if self.separators.iter().any(String::is_empty) {
            return Err(RagError::ConfigError("separators must not be empty strings".to_string()));
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the separator hierarchy, coarsest first.
    pub fn separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.separators = separators.into_iter().map(Into::into).collect();
        self
    }

    /// Set the number of top results to return from vector search.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the minimum similarity threshold for filtering results.
    pub fn similarity_threshold(mut self, threshold: f32) -> Self {
        self.config.similarity_threshold = Some(threshold);
        self
    }

    /// Set the bound on concurrent embedding calls during index build.
    pub fn embed_concurrency(mut self, limit: usize) -> Self {
        self.config.embed_concurrency = limit;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// See [`RagConfig::validate`].
    pub fn build(self) -> Result<RagConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RagConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.separators, vec!["\n\n", "."]);
        assert_eq!(config.embed_concurrency, 5);
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk() {
        let err = RagConfig::builder().chunk_size(50).chunk_overlap(50).build().unwrap_err();
        assert!(matches!(err, RagError::ConfigError(_)));
    }

    #[test]
    fn zero_values_rejected() {
        assert!(RagConfig::builder().top_k(0).build().is_err());
        assert!(RagConfig::builder().embed_concurrency(0).build().is_err());
        assert!(RagConfig::builder().chunk_size(0).chunk_overlap(0).build().is_err());
    }

    #[test]
    fn empty_separator_rejected() {
        let err = RagConfig::builder().separators(["\n\n", ""]).build().unwrap_err();
        assert!(err.to_string().contains("separators"));
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config = RagConfig::from_json_str(r#"{"chunk_size": 40, "chunk_overlap": 10}"#).unwrap();
        assert_eq!(config.chunk_size, 40);
        assert_eq!(config.chunk_overlap, 10);
        assert_eq!(config.top_k, 4);
        assert_eq!(config.similarity_threshold, None);
    }

    #[test]
    fn json_is_validated() {
        let err = RagConfig::from_json_str(r#"{"chunk_size": 10, "chunk_overlap": 20}"#).unwrap_err();
        assert!(matches!(err, RagError::ConfigError(_)));
        assert!(RagConfig::from_json_str("not json").is_err());
    }
}
