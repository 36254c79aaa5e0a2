//! PDF indexing pipeline: parse, chunk, embed, build the flat index

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tracing::{info, instrument};

use crate::domain::models::{CacheKeyStrategy, Config, DocumentIndex, ParsedDocument};
use crate::domain::ports::EmbeddingService;
use crate::infrastructure::pdf::PdfParser;
use crate::infrastructure::vector::{
    create_embedding_service, Chunker, Embedder, EmbeddingCache, FlatL2Index,
};

/// Builds searchable [`DocumentIndex`] values from PDF files
pub struct DocumentIndexer {
    parser: PdfParser,
    chunker: Chunker,
    embedder: Embedder,
    cache_key: CacheKeyStrategy,
}

impl DocumentIndexer {
    pub const fn new(chunker: Chunker, embedder: Embedder, cache_key: CacheKeyStrategy) -> Self {
        Self {
            parser: PdfParser::new(),
            chunker,
            embedder,
            cache_key,
        }
    }

    /// Wire the pipeline from configuration, loading the embedding model
    pub fn from_config(config: &Config) -> Result<Self> {
        let chunker = Chunker::with_config(config.chunking.clone())?;
        let model = create_embedding_service(&config.embedding)
            .context("Failed to initialize embedding model")?;
        let embedder = Embedder::new(model, config.embedding.batch_size)?
            .with_cache(EmbeddingCache::new(config.embedding.cache_dir.clone()));

        Ok(Self::new(chunker, embedder, config.embedding.cache_key))
    }

    pub const fn embedder(&self) -> &Embedder {
        &self.embedder
    }

    /// Index the PDF at `path`
    ///
    /// The document identity is derived from `display_name`, or the file stem
    /// when none is given. Parse failures produce a placeholder document;
    /// embedding failures are returned as errors.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn index_pdf(&self, path: impl AsRef<Path>, display_name: Option<&str>) -> Result<DocumentIndex> {
        let path: PathBuf = path.as_ref().to_path_buf();
        let name = display_name.map_or_else(
            || {
                path.file_stem()
                    .map_or_else(|| "document".to_string(), |stem| stem.to_string_lossy().into_owned())
            },
            str::to_string,
        );

        let parser = self.parser;
        let document = tokio::task::spawn_blocking(move || parser.parse(&path))
            .await
            .context("PDF parsing task failed")?;

        self.index_document(&name, document).await
    }

    /// Index an already parsed document under `name`
    pub async fn index_document(&self, name: &str, document: ParsedDocument) -> Result<DocumentIndex> {
        let name = safe_name(name);

        let chunks = self.chunker.chunk_document(&document);
        info!(document = %name, pages = document.pages.len(), chunks = chunks.len(), "chunked document");

        let cache_key = match self.cache_key {
            CacheKeyStrategy::DocumentName => name.clone(),
            CacheKeyStrategy::ContentHash => content_hash(&document),
        };

        let vectors = self
            .embedder
            .embed_chunks(&chunks, Some(&cache_key))
            .await
            .with_context(|| format!("Failed to embed chunks of '{name}'"))?;

        let index = FlatL2Index::from_vectors(self.embedder.model().dimensions(), &vectors)
            .with_context(|| format!("Failed to build index for '{name}'"))?;
        info!(document = %name, vectors = index.len(), "built vector index");

        Ok(DocumentIndex {
            name,
            index,
            chunks,
            metadata: document.metadata,
            model_id: self.embedder.model_id().to_string(),
        })
    }
}

/// Filesystem-safe document identity: alphanumerics, `-` and `_` are kept,
/// everything else becomes `_`
pub fn safe_name(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();

    if safe.is_empty() {
        "document".to_string()
    } else {
        safe
    }
}

/// Hex SHA-256 of the document's extracted text
pub fn content_hash(document: &ParsedDocument) -> String {
    let digest = Sha256::digest(document.full_text().as_bytes());
    format!("{digest:x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ChunkingConfig, DocumentMetadata, PageText};
    use crate::infrastructure::vector::HashEmbeddingModel;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn document(pages: &[&str]) -> ParsedDocument {
        let pages = pages
            .iter()
            .zip(1..)
            .map(|(text, page)| PageText::new(page, *text, ""));
        ParsedDocument::new(DocumentMetadata::default(), pages)
    }

    fn indexer(cache_dir: &Path, cache_key: CacheKeyStrategy) -> DocumentIndexer {
        let model = Arc::new(HashEmbeddingModel::new(32).unwrap());
        let embedder = Embedder::new(model, 4)
            .unwrap()
            .with_cache(EmbeddingCache::new(cache_dir.to_path_buf()));
        let chunker = Chunker::with_config(ChunkingConfig::new(8, 1)).unwrap();
        DocumentIndexer::new(chunker, embedder, cache_key)
    }

    #[test]
    fn test_safe_name() {
        assert_eq!(safe_name("annual report (2024)"), "annual_report__2024_");
        assert_eq!(safe_name("my-doc_v2"), "my-doc_v2");
        assert_eq!(safe_name("a/b\\c.pdf"), "a_b_c_pdf");
        assert_eq!(safe_name(""), "document");
    }

    #[test]
    fn test_content_hash_tracks_text() {
        let a = content_hash(&document(&["Alpha text."]));
        let b = content_hash(&document(&["Alpha text."]));
        let c = content_hash(&document(&["Beta text."]));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[tokio::test]
    async fn test_index_document_aligns_vectors_with_chunks() {
        let dir = TempDir::new().unwrap();
        let indexer = indexer(dir.path(), CacheKeyStrategy::DocumentName);

        let doc = document(&[
            "The cell is small. It has a membrane. It holds the nucleus inside.",
            "Energy comes from mitochondria. They are organelles.",
        ]);
        let index = indexer.index_document("bio notes", doc).await.unwrap();

        assert_eq!(index.name, "bio_notes");
        assert_eq!(index.index.len(), index.chunks.len());
        assert!(index.chunks.len() >= 2);
        assert!(dir.path().join("bio_notes_embeddings.json").exists());
    }

    #[tokio::test]
    async fn test_content_hash_cache_key() {
        let dir = TempDir::new().unwrap();
        let indexer = indexer(dir.path(), CacheKeyStrategy::ContentHash);

        let doc = document(&["Some text to hash."]);
        let key = content_hash(&doc);
        indexer.index_document("notes", doc).await.unwrap();

        assert!(dir.path().join(format!("{key}_embeddings.json")).exists());
        assert!(!dir.path().join("notes_embeddings.json").exists());
    }

    #[tokio::test]
    async fn test_missing_pdf_indexes_placeholder() {
        let dir = TempDir::new().unwrap();
        let indexer = indexer(dir.path(), CacheKeyStrategy::DocumentName);

        let index = indexer
            .index_pdf(dir.path().join("missing.pdf"), None)
            .await
            .unwrap();

        assert_eq!(index.name, "missing");
        assert_eq!(index.metadata.title, "Error");
        assert!(!index.chunks.is_empty());
        assert!(index.chunks[0].content.starts_with("Failed to process PDF:"));
    }
}
