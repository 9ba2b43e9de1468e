//! Word-window document chunker.
//!
//! Deterministic and stateless: the same input always yields the same
//! chunks. Windows are `chunk_size` words wide and consecutive windows
//! share exactly `chunk_overlap` words.

use crate::core::errors::RagError;

/// Split `content` into overlapping word windows.
///
/// The window start advances by `chunk_size - chunk_overlap` words and the
/// sequence ends with the window that reaches the final word, so a
/// document of `W` words yields `ceil(max(W - O, 1) / (C - O))` chunks.
/// A document shorter than `chunk_size` yields exactly one chunk; empty
/// input yields none. `chunk_overlap >= chunk_size` would make the
/// advance step non-positive and is rejected.
pub fn chunk_words(
    content: &str,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Result<Vec<String>, RagError> {
    if chunk_size == 0 {
        return Err(RagError::InvalidInput(
            "chunk_size must be positive".to_string(),
        ));
    }
    if chunk_overlap >= chunk_size {
        return Err(RagError::InvalidInput(format!(
            "chunk_overlap ({}) must be smaller than chunk_size ({})",
            chunk_overlap, chunk_size
        )));
    }

    let words: Vec<&str> = content.split_whitespace().collect();
    if words.is_empty() {
        return Ok(Vec::new());
    }

    let step = chunk_size - chunk_overlap;
    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + chunk_size).min(words.len());
        let chunk = words[start..end].join(" ");
        if !chunk.trim().is_empty() {
            chunks.push(chunk.trim().to_string());
        }
        if end >= words.len() {
            break;
        }
        start += step;
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn short_document_is_one_chunk() {
        let chunks = chunk_words("only three words", 10, 2).unwrap();
        assert_eq!(chunks, vec!["only three words".to_string()]);
    }

    #[test]
    fn chunk_count_matches_window_arithmetic() {
        // W words, window C, overlap O => ceil(max(W - O, 1) / (C - O))
        for (w, c, o) in [(10usize, 4usize, 2usize), (8, 4, 2), (20, 5, 0), (100, 30, 10)] {
            let chunks = chunk_words(&words(w), c, o).unwrap();
            let expected = ((w - o).max(1) + (c - o) - 1) / (c - o);
            assert_eq!(chunks.len(), expected, "W={} C={} O={}", w, c, o);
        }
    }

    #[test]
    fn consecutive_chunks_share_overlap_words() {
        let chunks = chunk_words(&words(10), 4, 2).unwrap();
        for pair in chunks.windows(2) {
            let prev: Vec<&str> = pair[0].split(' ').collect();
            let next: Vec<&str> = pair[1].split(' ').collect();
            assert_eq!(&prev[prev.len() - 2..], &next[..2]);
        }
    }

    #[test]
    fn whitespace_is_collapsed() {
        let chunks = chunk_words("a\tb\n  c   d", 10, 0).unwrap();
        assert_eq!(chunks, vec!["a b c d".to_string()]);
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk_words("   \n\t ", 5, 1).unwrap().is_empty());
    }

    #[test]
    fn overlap_at_least_chunk_size_is_rejected() {
        assert!(chunk_words("a b c", 3, 3).is_err());
        assert!(chunk_words("a b c", 3, 5).is_err());
        assert!(chunk_words("a b c", 0, 0).is_err());
    }
}
