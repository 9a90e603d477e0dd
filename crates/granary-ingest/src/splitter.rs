use std::collections::VecDeque;

/// Separators tried in order; the empty string means a hard character cut.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Recursive character splitter: break on the coarsest separator that keeps
/// pieces under the chunk size, merge small pieces back together, and carry
/// a tail of the previous chunk forward as overlap. Sizes are in characters.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
    }
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        let chunk_overlap = if chunk_overlap >= chunk_size {
            log::warn!(
                "chunk overlap {} does not fit chunk size {}, clamping",
                chunk_overlap,
                chunk_size
            );
            chunk_size - 1
        } else {
            chunk_overlap
        };

        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, &SEPARATORS)
            .into_iter()
            .map(|chunk| chunk.trim().to_string())
            .filter(|chunk| !chunk.is_empty())
            .collect()
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let (separator, rest) = pick_separator(text, separators);

        if separator.is_empty() {
            return self.hard_cut(text);
        }

        let mut chunks = Vec::new();
        let mut small: Vec<&str> = Vec::new();
        for piece in text.split(separator) {
            if char_len(piece) <= self.chunk_size {
                small.push(piece);
            } else {
                // Flush what fits, then retry the oversized piece one
                // separator down
                if !small.is_empty() {
                    chunks.extend(self.merge(&small, separator));
                    small.clear();
                }
                chunks.extend(self.split_with(piece, rest));
            }
        }
        if !small.is_empty() {
            chunks.extend(self.merge(&small, separator));
        }

        chunks
    }

    /// Greedily pack splits into chunks, keeping an overlap-sized tail of
    /// each chunk as the start of the next.
    fn merge(&self, splits: &[&str], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);

        let mut chunks: Vec<String> = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for split in splits {
            let len = char_len(split);

            if !current.is_empty() && total + len + sep_len > self.chunk_size {
                push_joined(&mut chunks, &current, separator);

                // Drop leading pieces until the tail fits the overlap and
                // leaves room for the incoming split
                while total > self.chunk_overlap
                    || (total + len + if current.is_empty() { 0 } else { sep_len }
                        > self.chunk_size
                        && total > 0)
                {
                    if current.is_empty() {
                        break;
                    }
                    let front_len = char_len(current[0]);
                    total -= front_len + if current.len() > 1 { sep_len } else { 0 };
                    current.pop_front();
                }
            }

            if !current.is_empty() {
                total += sep_len;
            }
            total += len;
            current.push_back(split);
        }

        push_joined(&mut chunks, &current, separator);

        chunks
    }

    /// Last resort: no separator fits, cut the text at chunk-size boundaries
    /// stepping by size minus overlap.
    fn hard_cut(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return Vec::new();
        }

        let step = (self.chunk_size - self.chunk_overlap).max(1);

        let mut chunks = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            chunks.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start += step;
        }

        chunks
    }
}

fn pick_separator<'a>(text: &str, separators: &'a [&'a str]) -> (&'a str, &'a [&'a str]) {
    for (i, separator) in separators.iter().enumerate() {
        if separator.is_empty() || text.contains(separator) {
            return (separator, &separators[i + 1..]);
        }
    }

    ("", &[])
}

fn push_joined(chunks: &mut Vec<String>, pieces: &VecDeque<&str>, separator: &str) {
    let joined = pieces
        .iter()
        .copied()
        .collect::<Vec<_>>()
        .join(separator)
        .trim()
        .to_string();
    if !joined.is_empty() {
        chunks.push(joined);
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn short_text_is_one_chunk() {
        let splitter = TextSplitter::default();
        assert_eq!(splitter.split("just a note"), vec!["just a note"]);
    }

    #[test]
    fn whitespace_only_produces_no_chunks() {
        let splitter = TextSplitter::default();
        assert!(splitter.split("  \n\n   ").is_empty());
    }

    #[test]
    fn paragraph_boundaries_win_over_word_boundaries() {
        let splitter = TextSplitter::new(30, 0);
        let text = "first paragraph here\n\nsecond paragraph here";

        let chunks = splitter.split(text);

        assert_eq!(chunks, vec!["first paragraph here", "second paragraph here"]);
    }

    #[test]
    fn chunks_never_exceed_the_size() {
        let splitter = TextSplitter::new(20, 5);
        let text = "one two three four five six seven eight nine ten eleven twelve";

        for chunk in splitter.split(text) {
            assert!(
                chunk.chars().count() <= 20,
                "chunk too long: {:?}",
                chunk
            );
        }
    }

    #[test]
    fn merged_chunks_carry_overlap() {
        let splitter = TextSplitter::new(10, 4);
        let chunks = splitter.split("aaaa bbbb cccc dddd");

        assert_eq!(chunks, vec!["aaaa bbbb", "bbbb cccc", "cccc dddd"]);
    }

    #[test]
    fn unbroken_text_is_hard_cut_with_overlap() {
        let splitter = TextSplitter::new(10, 2);
        let chunks = splitter.split(&"x".repeat(25));

        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
        // Steps of size - overlap cover the whole input
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn oversized_overlap_is_clamped() {
        let splitter = TextSplitter::new(10, 50);
        // Must terminate and still respect the chunk size
        for chunk in splitter.split("aa bb cc dd ee ff gg hh ii jj kk") {
            assert!(chunk.chars().count() <= 10);
        }
    }
}
