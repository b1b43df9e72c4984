//! Recursive text splitter with a priority-ordered separator list.
//!
//! Separators are tried most-structural-first: the first one present in
//! the text wins at that level, and pieces still over the size limit
//! recurse with the remaining separators. Produced chunks share an
//! overlap window of trailing/leading context. All lengths are counted
//! in characters, not bytes.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct SplitterConfig {
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Characters of context shared by adjacent chunks.
    pub chunk_overlap: usize,
    /// Boundary patterns in priority order; the empty string means
    /// "split anywhere" and guarantees the size bound.
    pub separators: Vec<String>,
}

impl SplitterConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            separators: default_separators(),
        }
    }
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self::new(500, 100)
    }
}

/// Markdown-flavoured fallback chain: structure headers first, then
/// paragraphs, lines, words, characters.
pub fn default_separators() -> Vec<String> {
    ["\n## ", "\n\n", "\n", " ", ""]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub struct TextSplitter {
    config: SplitterConfig,
}

impl TextSplitter {
    pub fn new(config: SplitterConfig) -> Self {
        Self { config }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        self.split_recursive(text, &self.config.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let (separator, remaining) = choose_separator(text, separators);
        let pieces = split_keep_separator(text, &separator);

        let mut chunks = Vec::new();
        let mut mergeable: Vec<String> = Vec::new();

        for piece in pieces {
            if char_len(&piece) < self.config.chunk_size {
                mergeable.push(piece);
                continue;
            }

            if !mergeable.is_empty() {
                chunks.extend(self.merge_pieces(&mergeable));
                mergeable.clear();
            }

            if remaining.is_empty() {
                // An indivisible unit longer than the limit is kept whole.
                push_trimmed(&mut chunks, &piece);
            } else {
                chunks.extend(self.split_recursive(&piece, remaining));
            }
        }

        if !mergeable.is_empty() {
            chunks.extend(self.merge_pieces(&mergeable));
        }

        chunks
    }

    /// Greedily pack pieces into chunks of at most `chunk_size` chars,
    /// retaining up to `chunk_overlap` trailing chars as the start of
    /// the next chunk.
    fn merge_pieces(&self, pieces: &[String]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<&String> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);

            if total + len > self.config.chunk_size && !window.is_empty() {
                push_trimmed(&mut chunks, &join_window(&window));

                while total > self.config.chunk_overlap
                    || (total + len > self.config.chunk_size && total > 0)
                {
                    if let Some(dropped) = window.pop_front() {
                        total -= char_len(dropped);
                    } else {
                        break;
                    }
                }
            }

            window.push_back(piece);
            total += len;
        }

        if !window.is_empty() {
            push_trimmed(&mut chunks, &join_window(&window));
        }

        chunks
    }
}

/// First separator occurring in the text wins; the empty string means
/// per-character splitting. When nothing matches, the text is treated
/// as one indivisible piece.
fn choose_separator<'a>(text: &str, separators: &'a [String]) -> (String, &'a [String]) {
    for (idx, sep) in separators.iter().enumerate() {
        if sep.is_empty() {
            return (String::new(), &[]);
        }
        if text.contains(sep.as_str()) {
            return (sep.clone(), &separators[idx + 1..]);
        }
    }
    (separators.last().cloned().unwrap_or_default(), &[])
}

/// Split on a separator, keeping each separator attached to the start
/// of the piece that follows it, so joins lose nothing.
fn split_keep_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(|c| c.to_string()).collect();
    }

    let mut pieces = Vec::new();
    let mut prev = 0usize;

    for (idx, _) in text.match_indices(separator) {
        if idx > prev {
            pieces.push(text[prev..idx].to_string());
            prev = idx;
        }
    }

    if prev < text.len() {
        pieces.push(text[prev..].to_string());
    }

    pieces
}

fn join_window(window: &VecDeque<&String>) -> String {
    window.iter().map(|s| s.as_str()).collect()
}

fn push_trimmed(chunks: &mut Vec<String>, chunk: &str) {
    let trimmed = chunk.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splitter(chunk_size: usize, chunk_overlap: usize) -> TextSplitter {
        TextSplitter::new(SplitterConfig::new(chunk_size, chunk_overlap))
    }

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = splitter(500, 100).split("Статья 1. Короткий текст.");
        assert_eq!(chunks, vec!["Статья 1. Короткий текст.".to_string()]);
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(splitter(500, 100).split("   \n\n ").is_empty());
    }

    #[test]
    fn every_chunk_respects_the_size_bound() {
        let text = "Право собственности охраняется законом. "
            .repeat(40);
        let chunks = splitter(120, 30).split(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(
                chunk.chars().count() <= 120,
                "chunk of {} chars exceeds the limit",
                chunk.chars().count()
            );
        }
    }

    #[test]
    fn header_boundaries_win_over_paragraphs() {
        let text = format!(
            "## Статья 1\n{}\n\n## Статья 2\n{}",
            "а".repeat(80),
            "б".repeat(80)
        );
        let chunks = splitter(120, 0).split(&text);

        // Each article lands in its own chunk because the header
        // separator is tried before the paragraph separator.
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].starts_with("## Статья 1"));
        assert!(chunks[1].starts_with("## Статья 2"));
    }

    #[test]
    fn adjacent_chunks_share_overlap() {
        let text = (1..=30)
            .map(|i| format!("слово{i}"))
            .collect::<Vec<_>>()
            .join(" ");
        let chunks = splitter(60, 20).split(&text);
        assert!(chunks.len() > 1);

        for pair in chunks.windows(2) {
            let (left, right) = (&pair[0], &pair[1]);
            let shared = (1..=left.chars().count().min(right.chars().count()))
                .rev()
                .map(|n| {
                    let tail: String = left
                        .chars()
                        .skip(left.chars().count() - n)
                        .collect();
                    tail
                })
                .find(|tail| right.starts_with(tail.as_str()));
            assert!(
                shared.is_some(),
                "no shared context between {left:?} and {right:?}"
            );
        }
    }

    #[test]
    fn indivisible_unit_may_exceed_the_limit() {
        let word = "я".repeat(50);
        let config = SplitterConfig {
            chunk_size: 20,
            chunk_overlap: 0,
            // No empty-string fallback: a single word cannot be cut.
            separators: vec!["\n\n".to_string(), " ".to_string()],
        };
        let chunks = TextSplitter::new(config).split(&word);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chars().count(), 50);
    }

    #[test]
    fn char_fallback_enforces_bound_on_long_words() {
        let word = "я".repeat(50);
        let chunks = splitter(20, 0).split(&word);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 20));
    }
}
