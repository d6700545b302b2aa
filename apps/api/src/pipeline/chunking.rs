//! Recursive character splitter.
//!
//! Splits on the coarsest separator present ("\n\n", "\n", " ", then single
//! characters), recurses into pieces that are still too long, and greedily merges
//! small pieces back into chunks of at most `chunk_size` characters. Consecutive
//! chunks share up to `overlap` characters of trailing context. Lengths are counted
//! in chars, never bytes.

use std::collections::VecDeque;

pub const CHUNK_SIZE: usize = 512;
pub const CHUNK_OVERLAP: usize = 50;

const SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

#[derive(Debug, Clone, Copy)]
pub struct TextSplitter {
    chunk_size: usize,
    overlap: usize,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self::new(CHUNK_SIZE, CHUNK_OVERLAP)
    }
}

impl TextSplitter {
    /// `overlap` is capped below `chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size - 1),
        }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, SEPARATORS)
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let (separator, rest) = pick_separator(text, separators);

        let pieces: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(separator).filter(|p| !p.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();

        for piece in pieces {
            if char_len(piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                chunks.extend(self.merge(&pending, separator));
                pending.clear();
            }
            if rest.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_with(piece, rest));
            }
        }
        if !pending.is_empty() {
            chunks.extend(self.merge(&pending, separator));
        }

        chunks
    }

    /// Greedy merge of short pieces, keeping an overlap window between chunks.
    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            let joint = if window.is_empty() { 0 } else { sep_len };

            if total + len + joint > self.chunk_size && !window.is_empty() {
                push_chunk(&mut chunks, &window, separator);

                // Shrink from the front until the window fits the overlap budget and
                // leaves room for the incoming piece.
                loop {
                    let joint = if window.is_empty() { 0 } else { sep_len };
                    let too_long = total > 0 && total + len + joint > self.chunk_size;
                    if total <= self.overlap && !too_long {
                        break;
                    }
                    let Some(front) = window.pop_front() else {
                        break;
                    };
                    total -= char_len(front);
                    if !window.is_empty() {
                        total -= sep_len;
                    }
                }
            }

            if !window.is_empty() {
                total += sep_len;
            }
            window.push_back(piece);
            total += len;
        }

        if !window.is_empty() {
            push_chunk(&mut chunks, &window, separator);
        }
        chunks
    }
}

fn push_chunk(chunks: &mut Vec<String>, window: &VecDeque<&str>, separator: &str) {
    let joined = window.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

fn pick_separator<'a>(text: &str, separators: &'a [&'a str]) -> (&'a str, &'a [&'a str]) {
    for (i, sep) in separators.iter().enumerate() {
        if sep.is_empty() || text.contains(sep) {
            return (sep, &separators[i + 1..]);
        }
    }
    ("", &[])
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
