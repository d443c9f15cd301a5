//! Document chunking.
//!
//! This module provides the [`Chunker`] trait and [`RecursiveChunker`], which
//! splits text on a hierarchy of separators (coarsest first), falls back to a
//! hard character cut, and then merges the resulting units into overlapping
//! chunks.
//!
//! Chunks are contiguous spans of the source text. Consecutive chunks from the
//! same document may share a prefix/suffix of at most `chunk_overlap`
//! characters, so dropping each chunk's overlap with its predecessor and
//! concatenating the rest reproduces the document exactly.

use std::ops::Range;

use crate::config::RagConfig;
use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};

/// A strategy for splitting documents into chunks.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ChunkingError`] if the chunker parameters are invalid.
    fn chunk(&self, document: &Document) -> Result<Vec<Chunk>>;
}

/// Splits text hierarchically by a list of separators, e.g. paragraphs then sentences.
///
/// Each separator stays attached to the segment it terminates. A segment that
/// is still longer than `chunk_size` after all separators have been tried is
/// cut every `chunk_size - chunk_overlap` characters.
///
/// Chunk IDs are generated as `{document_id}_{chunk_index}`. Each chunk inherits
/// the parent document's metadata plus `chunk_index`, `lines_from` and `lines_to`.
///
/// # Example
///
/// ```rust,ignore
/// use docchat_core::RecursiveChunker;
///
/// let chunker = RecursiveChunker::new(700, 100).with_separators(["\n\n", "."]);
/// let chunks = chunker.chunk(&document)?;
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker` splitting on blank lines, then periods.
    ///
    /// # Arguments
    ///
    /// * `chunk_size`: maximum number of characters per chunk
    /// * `chunk_overlap`: maximum number of characters shared by consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            separators: vec!["\n\n".to_string(), ".".to_string()],
        }
    }

    /// Create a chunker from the chunking fields of a [`RagConfig`].
    pub fn from_config(config: &RagConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
            separators: config.separators.clone(),
        }
    }

    /// Replace the separator hierarchy, coarsest first.
    pub fn with_separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.separators = separators.into_iter().map(Into::into).collect();
        self
    }

    /// Split `text` into byte ranges, one per chunk.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ChunkingError`] if `chunk_size` is zero, the overlap
    /// is not smaller than the chunk size, or a separator is empty.
    pub fn split_text(&self, text: &str) -> Result<Vec<Range<usize>>> {
        self.validate()?;
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let mut units = Vec::new();
        split_units(
            text,
            0..text.len(),
            &self.separators,
            self.chunk_size,
            self.chunk_size - self.chunk_overlap,
            &mut units,
        );
        Ok(merge_units(text, units, self.chunk_size, self.chunk_overlap))
    }

    fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RagError::ChunkingError("chunk_size must be greater than zero".into()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::ChunkingError(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.separators.iter().any(String::is_empty) {
            return Err(RagError::ChunkingError("separators must not be empty".into()));
        }
        Ok(())
    }
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, document: &Document) -> Result<Vec<Chunk>> {
        let spans = self.split_text(&document.text)?;

        Ok(spans
            .into_iter()
            .enumerate()
            .map(|(i, span)| {
                let text = &document.text;
                let lines_from = 1 + text[..span.start].matches('\n').count();
                let chunk_text = &text[span.clone()];
                let lines_to = lines_from + chunk_text.trim_end_matches('\n').matches('\n').count();

                let mut metadata = document.metadata.clone();
                metadata.insert("chunk_index".to_string(), i.to_string());
                metadata.insert("lines_from".to_string(), lines_from.to_string());
                metadata.insert("lines_to".to_string(), lines_to.to_string());

                Chunk {
                    id: format!("{}_{i}", document.id),
                    document_id: document.id.clone(),
                    index: i,
                    text: chunk_text.to_string(),
                    start: span.start,
                    end: span.end,
                    metadata,
                }
            })
            .collect())
    }
}

/// Break `span` into units of at most `chunk_size` characters, trying each
/// separator in turn and cutting every `hard_cut` characters as a last resort.
fn split_units(
    text: &str,
    span: Range<usize>,
    separators: &[String],
    chunk_size: usize,
    hard_cut: usize,
    units: &mut Vec<Range<usize>>,
) {
    if char_count(&text[span.clone()]) <= chunk_size {
        units.push(span);
        return;
    }

    let Some((separator, finer)) = separators.split_first() else {
        let mut start = span.start;
        while start < span.end {
            let end = advance_chars(text, start, hard_cut).min(span.end);
            units.push(start..end);
            start = end;
        }
        return;
    };

    for piece in split_keeping_separator(&text[span.clone()], separator) {
        let piece = span.start + piece.start..span.start + piece.end;
        split_units(text, piece, finer, chunk_size, hard_cut, units);
    }
}

/// Greedily join adjacent units into chunks of at most `chunk_size` characters.
///
/// Each new chunk is extended backwards by up to `overlap` characters of the
/// previous chunk, shrinking the overlap when the chunk would otherwise be too long.
fn merge_units(
    text: &str,
    units: Vec<Range<usize>>,
    chunk_size: usize,
    overlap: usize,
) -> Vec<Range<usize>> {
    let mut chunks = Vec::new();
    let mut current: Option<Range<usize>> = None;

    for unit in units {
        current = Some(match current.take() {
            None => unit,
            Some(cur) if char_count(&text[cur.start..unit.end]) <= chunk_size => {
                cur.start..unit.end
            }
            Some(cur) => {
                let mut start = retreat_chars(text, cur.end, overlap).max(cur.start);
                let excess = char_count(&text[start..unit.end]).saturating_sub(chunk_size);
                if excess > 0 {
                    start = advance_chars(text, start, excess).min(unit.start);
                }
                chunks.push(cur);
                start..unit.end
            }
        });
    }

    chunks.extend(current);
    chunks
}

/// Split text at a separator while keeping the separator attached to the preceding segment.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<Range<usize>> {
    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(start..end);
        start = end;
    }

    if start < text.len() {
        result.push(start..text.len());
    }

    result
}

fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Byte offset `n` characters after `from`, clamped to the end of `text`.
fn advance_chars(text: &str, from: usize, n: usize) -> usize {
    text[from..].char_indices().nth(n).map_or(text.len(), |(i, _)| from + i)
}

/// Byte offset `n` characters before `to`, clamped to the start of `text`.
fn retreat_chars(text: &str, to: usize, n: usize) -> usize {
    text[..to].char_indices().rev().take(n).last().map_or(to, |(i, _)| i)
}
