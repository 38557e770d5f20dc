//! Recursive character splitter.
//!
//! Text is split on the first separator that occurs in it (`"\n\n"`, then
//! `"\n"`, then `" "`, then individual characters). Pieces are greedily merged
//! back into chunks of at most `chunk_size` characters, and consecutive chunks
//! share up to `chunk_overlap` characters of trailing context.
//!
//! Pieces that are still too long are split again with the next separator.

use std::collections::VecDeque;

use serde::Serialize;

use crate::{document::PageText, errors::PdfError};

pub const DEFAULT_CHUNK_SIZE: usize = 2000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 80;

const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// A retrievable unit of text, tagged with the page it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// 0-based page number.
    pub page: usize,
    /// Position of the chunk in the whole document.
    pub ordinal: usize,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl Default for RecursiveSplitter {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RecursiveSplitter {
    /// # Errors
    /// [`PdfError::InvalidChunking`] if `chunk_size` is zero or the overlap is
    /// not smaller than the chunk size.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, PdfError> {
        if chunk_size == 0 {
            return Err(PdfError::InvalidChunking("chunk size must be positive".into()));
        }
        if chunk_overlap >= chunk_size {
            return Err(PdfError::InvalidChunking(format!(
                "overlap {chunk_overlap} must be smaller than chunk size {chunk_size}"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            ..Self::default()
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Splits every page and numbers the resulting chunks across the document.
    /// Pages without text produce no chunks.
    pub fn split_pages(&self, pages: &[PageText]) -> Vec<Chunk> {
        let mut ordinal = 0;
        let mut out = Vec::new();
        for page in pages {
            for text in self.split_text(&page.text) {
                out.push(Chunk {
                    page: page.number,
                    ordinal,
                    text,
                });
                ordinal += 1;
            }
        }
        out
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_with(text, &self.separators)
    }

    fn split_with(&self, text: &str, separators: &[String]) -> Vec<String> {
        let idx = separators
            .iter()
            .position(|s| s.is_empty() || text.contains(s.as_str()))
            .unwrap_or(separators.len().saturating_sub(1));
        let separator = separators.get(idx).map(String::as_str).unwrap_or("");
        let rest = separators.get(idx + 1..).unwrap_or(&[]);

        let pieces: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(separator).filter(|s| !s.is_empty()).collect()
        };

        let mut out = Vec::new();
        let mut fitting: Vec<&str> = Vec::new();
        for piece in pieces {
            if char_len(piece) < self.chunk_size {
                fitting.push(piece);
                continue;
            }
            if !fitting.is_empty() {
                out.extend(self.merge(&fitting, separator));
                fitting.clear();
            }
            if rest.is_empty() {
                push_trimmed(&mut out, piece.to_string());
            } else {
                out.extend(self.split_with(piece, rest));
            }
        }
        if !fitting.is_empty() {
            out.extend(self.merge(&fitting, separator));
        }
        out
    }

    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut out = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            if total + len + joiner_for(&current, sep_len) > self.chunk_size && !current.is_empty() {
                push_trimmed(&mut out, join(&current, separator));
                // Keep a tail of at most `chunk_overlap` chars that still leaves room for `piece`.
                while total > self.chunk_overlap
                    || (total > 0 && total + len + joiner_for(&current, sep_len) > self.chunk_size)
                {
                    let Some(first) = current.pop_front() else {
                        break;
                    };
                    total -= char_len(first) + joiner_for(&current, sep_len);
                }
            }
            total += len + joiner_for(&current, sep_len);
            current.push_back(piece);
        }
        push_trimmed(&mut out, join(&current, separator));
        out
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn joiner_for(current: &VecDeque<&str>, sep_len: usize) -> usize {
    if current.is_empty() { 0 } else { sep_len }
}

fn join(pieces: &VecDeque<&str>, separator: &str) -> String {
    pieces.iter().copied().collect::<Vec<_>>().join(separator)
}

fn push_trimmed(out: &mut Vec<String>, text: String) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}
