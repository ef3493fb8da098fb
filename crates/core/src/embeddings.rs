/// Width of vectors produced by the default embedder configuration.
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 128;

/// Turns content into a fixed-width vector for the similarity index.
pub trait Embedder {
    fn dimensions(&self) -> usize;
    fn embed(&self, text: &str) -> Vec<f32>;
}

/// Deterministic local embedder: character ngrams FNV-hashed into a
/// bucketed count vector, L2-normalized. Stable across runs and
/// processes, which is all the near-duplicate distance check needs.
#[derive(Debug, Clone, Copy)]
pub struct HashedNgramEmbedder {
    pub dimensions: usize,
    pub ngram: usize,
}

impl Default for HashedNgramEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
            ngram: 3,
        }
    }
}

impl Embedder for HashedNgramEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions.max(1)];
        let width = self.ngram.max(1);
        let chars: Vec<char> = text.to_lowercase().chars().collect();

        if chars.len() < width {
            return vector;
        }

        for window in chars.windows(width) {
            let mut hash = 0xcbf29ce484222325u64;
            let mut buffer = [0u8; 4];
            for ch in window {
                for byte in ch.encode_utf8(&mut buffer).bytes() {
                    hash ^= u64::from(byte);
                    hash = hash.wrapping_mul(0x100000001b3);
                }
            }
            let bucket = (hash % vector.len() as u64) as usize;
            vector[bucket] += 1.0;
        }

        let magnitude = vector
            .iter()
            .map(|value| value * value)
            .sum::<f32>()
            .sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        vector
    }
}

#[cfg(test)]
mod tests {
    use super::{Embedder, HashedNgramEmbedder};

    #[test]
    fn same_text_embeds_identically() {
        let embedder = HashedNgramEmbedder::default();
        assert_eq!(
            embedder.embed("무역 규제 변경 사항"),
            embedder.embed("무역 규제 변경 사항")
        );
    }

    #[test]
    fn output_width_follows_configuration() {
        let embedder = HashedNgramEmbedder {
            dimensions: 32,
            ngram: 2,
        };
        assert_eq!(embedder.embed("abc").len(), 32);
        assert_eq!(embedder.dimensions(), 32);
    }

    #[test]
    fn text_shorter_than_the_ngram_is_a_zero_vector() {
        let embedder = HashedNgramEmbedder::default();
        let vector = embedder.embed("ab");
        assert!(vector.iter().all(|value| *value == 0.0));
    }

    #[test]
    fn distinct_texts_produce_distinct_vectors() {
        let embedder = HashedNgramEmbedder::default();
        assert_ne!(embedder.embed("legal bulletin"), embedder.embed("market report"));
    }
}
