use crate::error::IngestError;

/// Lazy sequence of fixed-width chunks over borrowed content.
///
/// Iteration is single-pass; cloning restarts from the beginning.
/// Allocation happens per yielded chunk only.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    rest: &'a str,
    chunk_size: usize,
    granular: bool,
    done: bool,
}

impl Iterator for Chunks<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }

        if self.granular {
            self.done = true;
            return Some(self.rest.to_string());
        }

        if self.rest.is_empty() {
            self.done = true;
            return None;
        }

        let split_at = self
            .rest
            .char_indices()
            .nth(self.chunk_size)
            .map(|(index, _)| index)
            .unwrap_or(self.rest.len());

        let (chunk, rest) = self.rest.split_at(split_at);
        self.rest = rest;
        Some(chunk.to_string())
    }
}

/// Splits `content` into consecutive non-overlapping chunks of exactly
/// `chunk_size` characters, the final chunk holding the remainder.
/// Content flagged `already_granular` (CSV rows, which are row-granular
/// at load time) comes back as a single element unchanged.
///
/// Width is counted in characters, not bytes or tokens, so boundaries
/// may fall mid-word; multi-byte content is never split inside a
/// character.
pub fn split_chunks(
    content: &str,
    chunk_size: usize,
    already_granular: bool,
) -> Result<Chunks<'_>, IngestError> {
    if chunk_size == 0 {
        return Err(IngestError::InvalidConfiguration(
            "chunk_size must be a positive number of characters".to_string(),
        ));
    }

    Ok(Chunks {
        rest: content,
        chunk_size,
        granular: already_granular,
        done: false,
    })
}

#[cfg(test)]
mod tests {
    use super::split_chunks;
    use crate::error::IngestError;

    #[test]
    fn concatenated_chunks_reproduce_the_input() {
        let content = "abcdefghij".repeat(73);
        let chunks: Vec<String> = split_chunks(&content, 97, false)
            .expect("chunk size is positive")
            .collect();

        assert_eq!(chunks.concat(), content);
        for chunk in &chunks[..chunks.len() - 1] {
            assert_eq!(chunk.chars().count(), 97);
        }
        assert!(chunks.last().map(|last| last.chars().count() <= 97).unwrap_or(false));
    }

    #[test]
    fn exact_multiple_has_no_short_tail() {
        let content = "x".repeat(1000);
        let chunks: Vec<String> = split_chunks(&content, 500, false)
            .expect("chunk size is positive")
            .collect();

        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|chunk| chunk.len() == 500));
    }

    #[test]
    fn multibyte_content_splits_on_characters() {
        let content = "한국어 무역 문서 내용".repeat(40);
        let chunks: Vec<String> = split_chunks(&content, 100, false)
            .expect("chunk size is positive")
            .collect();

        assert_eq!(chunks.concat(), content);
        for chunk in &chunks[..chunks.len() - 1] {
            assert_eq!(chunk.chars().count(), 100);
        }
    }

    #[test]
    fn granular_content_is_returned_unchanged() {
        let row = "country: KR\nvalue: 1,204";
        let chunks: Vec<String> = split_chunks(row, 5, true)
            .expect("chunk size is positive")
            .collect();

        assert_eq!(chunks, vec![row.to_string()]);
    }

    #[test]
    fn empty_content_yields_no_chunks() {
        let chunks: Vec<String> = split_chunks("", 500, false)
            .expect("chunk size is positive")
            .collect();
        assert!(chunks.is_empty());
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let result = split_chunks("content", 0, false);
        assert!(matches!(result, Err(IngestError::InvalidConfiguration(_))));
    }

    #[test]
    fn cloning_restarts_iteration() {
        let chunks = split_chunks("abcdef", 4, false).expect("chunk size is positive");
        let first: Vec<String> = chunks.clone().collect();
        let second: Vec<String> = chunks.collect();
        assert_eq!(first, second);
        assert_eq!(first, vec!["abcd".to_string(), "ef".to_string()]);
    }
}
