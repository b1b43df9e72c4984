//! Legal-structure markers and text hygiene for Russian legal corpora.
//!
//! Documents carry "РАЗДЕЛ <roman>", "Глава <n>" and "Статья <n>"
//! markers. Chunks are stamped with the nearest preceding marker of
//! each kind, and the deduplication hash is computed over a normalized
//! form of the text.

use std::sync::OnceLock;

use regex::Regex;
use sha2::{Digest, Sha256};

fn section_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"РАЗДЕЛ [IVXLCDM]+").expect("section marker pattern"))
}

fn chapter_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:ГЛАВА|Глава) \d+").expect("chapter marker pattern"))
}

fn article_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Статья \d+(?:\.\d+)*").expect("article marker pattern"))
}

fn any_marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(РАЗДЕЛ [IVXLCDM]+|(?:ГЛАВА|Глава) \d+|Статья \d+(?:\.\d+)*)")
            .expect("structure marker pattern")
    })
}

/// Structural labels attached to a chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuralLabels {
    pub section: Option<String>,
    pub chapter: Option<String>,
    pub article: Option<String>,
}

impl StructuralLabels {
    /// Last marker of each kind inside `text`, if present.
    pub fn detect(text: &str) -> Self {
        Self {
            section: last_match(section_regex(), text),
            chapter: last_match(chapter_regex(), text),
            article: last_match(article_regex(), text),
        }
    }

    /// Inherit the previous chunk's labels for every kind this chunk
    /// has no marker of its own for.
    pub fn carried_from(mut self, previous: &StructuralLabels) -> Self {
        if self.section.is_none() {
            self.section = previous.section.clone();
        }
        if self.chapter.is_none() {
            self.chapter = previous.chapter.clone();
        }
        if self.article.is_none() {
            self.article = previous.article.clone();
        }
        self
    }
}

fn last_match(re: &Regex, text: &str) -> Option<String> {
    re.find_iter(text).last().map(|m| m.as_str().to_string())
}

/// Dedup identity: whitespace-collapsed, case-folded,
/// punctuation-stripped text, hashed with SHA-256.
pub fn content_hash(text: &str) -> String {
    let normalized = normalize_for_hash(text);
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn normalize_for_hash(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped: String = lowered
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove legal-gazette boilerplate: amendment annotations,
/// cross-reference notices, and publication footers.
pub fn clean_gazette_boilerplate(text: &str) -> String {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    let patterns = PATTERNS.get_or_init(|| {
        [
            r"\(в ред\.[^)]*\)",
            r"(?m)^\s*Информация об изменениях:.*$",
            r"(?m)^\s*См\. .*$",
            r"(?m)^\s*© .*$",
            r"(?m)^\s*Дата (?:опубликования|обновления): .*$",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("gazette boilerplate pattern"))
        .collect()
    });

    let mut cleaned = text.to_string();
    for pattern in patterns {
        cleaned = pattern.replace_all(&cleaned, "").into_owned();
    }
    cleaned
}

/// Put a paragraph break in front of every structural marker so the
/// splitter prefers legal-structure boundaries. Header lines produced
/// by the scraper are left as they are.
pub fn reinject_structure_breaks(text: &str) -> String {
    let broken: String = text
        .lines()
        .map(|line| {
            if line.trim_start().starts_with('#') {
                line.to_string()
            } else {
                any_marker_regex().replace_all(line, "\n\n$1").into_owned()
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    collapse_blank_runs(&broken)
}

/// Turn every structural marker into a markdown header line, the
/// canonical markup the scraper writes and the splitter keys on.
pub fn insert_markdown_headers(text: &str) -> String {
    any_marker_regex().replace_all(text, "\n## $1\n").into_owned()
}

/// Collapse runs of three or more newlines into one blank line.
pub fn collapse_blank_runs(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\n{3,}").expect("blank run pattern"));
    re.replace_all(text, "\n\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_last_marker_of_each_kind() {
        let text = "ГЛАВА 1\nСтатья 1. Общие положения.\nСтатья 2. Термины.";
        let labels = StructuralLabels::detect(text);
        assert_eq!(labels.chapter.as_deref(), Some("ГЛАВА 1"));
        assert_eq!(labels.article.as_deref(), Some("Статья 2"));
        assert_eq!(labels.section, None);
    }

    #[test]
    fn detects_sections_with_roman_numerals_and_dotted_articles() {
        let labels = StructuralLabels::detect("РАЗДЕЛ IV\nСтатья 15.1. Особый порядок.");
        assert_eq!(labels.section.as_deref(), Some("РАЗДЕЛ IV"));
        assert_eq!(labels.article.as_deref(), Some("Статья 15.1"));
    }

    #[test]
    fn carry_forward_fills_only_missing_labels() {
        let previous = StructuralLabels {
            section: Some("РАЗДЕЛ I".to_string()),
            chapter: Some("Глава 2".to_string()),
            article: Some("Статья 8".to_string()),
        };
        let current = StructuralLabels::detect("Статья 9. Продолжение.").carried_from(&previous);

        assert_eq!(current.article.as_deref(), Some("Статья 9"));
        assert_eq!(current.chapter.as_deref(), Some("Глава 2"));
        assert_eq!(current.section.as_deref(), Some("РАЗДЕЛ I"));
    }

    #[test]
    fn normalization_ignores_case_punctuation_and_spacing() {
        let a = normalize_for_hash("Статья 15.  Конституция — имеет высшую силу!");
        let b = normalize_for_hash("статья 15 конституция имеет высшую силу");
        assert_eq!(a, b);
        assert_eq!(content_hash("Текст,  один."), content_hash("текст один"));
        assert_ne!(content_hash("текст один"), content_hash("текст два"));
    }

    #[test]
    fn gazette_boilerplate_is_removed() {
        let text = "Статья 5. Права потребителя (в ред. Федерального закона от 01.05.2017 N 88-ФЗ) сохраняются.\nИнформация об изменениях: статья дополнена пунктом 3.\nСм. комментарии к статье 5.\n© Официальный интернет-портал правовой информации\nДата опубликования: 01.06.2017\nОстальной текст.";
        let cleaned = clean_gazette_boilerplate(text);

        assert!(cleaned.contains("Статья 5. Права потребителя"));
        assert!(cleaned.contains("сохраняются."));
        assert!(cleaned.contains("Остальной текст."));
        assert!(!cleaned.contains("в ред."));
        assert!(!cleaned.contains("Информация об изменениях"));
        assert!(!cleaned.contains("См. комментарии"));
        assert!(!cleaned.contains("©"));
        assert!(!cleaned.contains("Дата опубликования"));
    }

    #[test]
    fn structure_breaks_are_injected_inline() {
        let text = "вводный текст. Статья 3. Новая норма.";
        let broken = reinject_structure_breaks(text);
        assert!(broken.contains("вводный текст. \n\nСтатья 3. Новая норма.")
            || broken.contains("вводный текст.\n\nСтатья 3. Новая норма."));
    }

    #[test]
    fn header_lines_are_left_alone() {
        let text = "## Статья 3\nтекст статьи";
        assert_eq!(reinject_structure_breaks(text), text);
    }
}
