// SPDX-FileCopyrightText: 2026 MultiSense Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-window text chunking for RAG ingestion.
//!
//! Documents are split into chunks of `chunk_size` characters with `overlap`
//! characters shared between consecutive chunks. The overlap exists so a fact
//! spanning a chunk boundary is still retrievable from at least one chunk.
//! Window boundaries are deterministic: the same text and parameters always
//! produce the same chunks, which keeps chunk ids stable across re-ingestion.

/// Split text into overlapping fixed-size chunks.
///
/// Sizes are measured in characters (not bytes), so multi-byte UTF-8 input is
/// split safely. Leading/trailing whitespace of the document is trimmed before
/// splitting. Guarantees:
///
/// - never produces an empty chunk; whitespace-only input yields no chunks
/// - a document of at most `chunk_size` characters becomes a single chunk
/// - consecutive chunks share exactly `overlap` characters, except the final
///   chunk, which simply runs to the end of the text
///
/// Callers must ensure `overlap < chunk_size` and `chunk_size > 0`
/// (config validation enforces this); the stride between windows is
/// `chunk_size - overlap`.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    debug_assert!(chunk_size > 0, "chunk_size must be positive");
    debug_assert!(overlap < chunk_size, "overlap must be smaller than chunk_size");

    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    // Byte offset of every char boundary, plus the end sentinel, so windows
    // measured in characters map onto valid byte ranges.
    let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    boundaries.push(text.len());
    let char_count = boundaries.len() - 1;

    if char_count <= chunk_size {
        return vec![text.to_string()];
    }

    let stride = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < char_count {
        let end = (start + chunk_size).min(char_count);
        chunks.push(text[boundaries[start]..boundaries[end]].to_string());
        if end == char_count {
            break;
        }
        start += stride;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_single_chunk() {
        let chunks = split_text("Hello world", 1000, 100);
        assert_eq!(chunks, vec!["Hello world"]);
    }

    #[test]
    fn exact_size_text_is_single_chunk() {
        let text = "a".repeat(100);
        let chunks = split_text(&text, 100, 20);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(split_text("", 100, 20).is_empty());
        assert!(split_text("   \n\t  ", 100, 20).is_empty());
    }

    #[test]
    fn three_thousand_chars_at_1000_200_gives_four_chunks() {
        let text: String = (0..3000).map(|i| (b'a' + (i % 26) as u8) as char).collect();
        let chunks = split_text(&text, 1000, 200);

        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].chars().count(), 1000);
        assert_eq!(chunks[1].chars().count(), 1000);
        assert_eq!(chunks[2].chars().count(), 1000);
        assert_eq!(chunks[3].chars().count(), 600);
    }

    #[test]
    fn consecutive_chunks_share_overlap() {
        let text: String = (0..3000).map(|i| (b'a' + (i % 26) as u8) as char).collect();
        let chunks = split_text(&text, 1000, 200);

        for pair in chunks.windows(2) {
            let tail: String = pair[0].chars().skip(800).collect();
            let head: String = pair[1].chars().take(200).collect();
            assert_eq!(tail, head, "boundary text must appear in both chunks");
        }
    }

    #[test]
    fn chunks_reconstruct_the_document() {
        let text: String = (0..2500).map(|i| (b'a' + (i % 26) as u8) as char).collect();
        let chunks = split_text(&text, 1000, 200);

        // Dropping each chunk's leading overlap re-assembles the original.
        let mut rebuilt = chunks[0].clone();
        for chunk in &chunks[1..] {
            rebuilt.extend(chunk.chars().skip(200));
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn never_produces_empty_chunks() {
        let text = "word ".repeat(500);
        for (size, overlap) in [(50, 10), (100, 99), (7, 3)] {
            for chunk in split_text(&text, size, overlap) {
                assert!(!chunk.is_empty());
            }
        }
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let text = "héllo wörld ünïcode ".repeat(100);
        let chunks = split_text(&text, 50, 10);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 50);
        }
    }

    #[test]
    fn deterministic_for_same_input() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(60);
        let first = split_text(&text, 300, 50);
        let second = split_text(&text, 300, 50);
        assert_eq!(first, second);
    }
}
