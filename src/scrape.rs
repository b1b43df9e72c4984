//! Corpus scraper: fetch a list of pages, strip boilerplate, normalize
//! legal structure markers into markdown headers, and write one text
//! file per page.
//!
//! Fetches go out in one concurrent batch; a failed page is logged and
//! the run continues with the rest. The destination directory is
//! overwritten, there is no cross-run deduplication.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use futures_util::future;
use ego_tree::{NodeId, NodeRef};
use scraper::{Html, Node, Selector};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::ingest::markers;

/// Desktop browser identity for the fetch layer; some legal portals
/// reject unadorned clients.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Regions that never carry document text.
const BOILERPLATE_SELECTORS: [&str; 7] = [
    "header",
    "footer",
    "nav",
    "script",
    "style",
    ".side-menu",
    ".breadcrumbs",
];

#[derive(Debug, Clone, Copy)]
pub struct ScrapeReport {
    pub saved: usize,
    pub failed: usize,
}

pub struct Scraper {
    links_file: PathBuf,
    output_dir: PathBuf,
    client: reqwest::Client,
}

impl Scraper {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(true)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(AppError::backend)?;

        Ok(Self {
            links_file: config.paths.links_file.clone(),
            output_dir: config.paths.docs_dir.clone(),
            client,
        })
    }

    /// Newline-delimited URL list; blank lines are skipped.
    pub fn load_links(&self) -> Result<Vec<String>, AppError> {
        let raw = fs::read_to_string(&self.links_file)?;
        Ok(raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    pub async fn run(&self) -> Result<ScrapeReport, AppError> {
        let links = self.load_links()?;
        if links.is_empty() {
            warn!("no links found in {}", self.links_file.display());
            return Ok(ScrapeReport { saved: 0, failed: 0 });
        }

        let pages = future::join_all(links.iter().map(|url| self.fetch(url))).await;

        fs::create_dir_all(&self.output_dir)?;

        let mut saved = 0usize;
        let mut failed = 0usize;
        for (url, page) in links.iter().zip(pages) {
            match page {
                Ok(html) => {
                    let text = extract_page_text(&html);
                    let path = self.output_dir.join(format!("document_{saved}.md"));
                    fs::write(&path, text)?;
                    info!("saved {} from {url}", path.display());
                    saved += 1;
                }
                Err(err) => {
                    warn!("failed to fetch {url}: {err}");
                    failed += 1;
                }
            }
        }

        Ok(ScrapeReport { saved, failed })
    }

    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(AppError::backend)?;

        if !response.status().is_success() {
            return Err(AppError::Backend(format!(
                "{url} returned {}",
                response.status()
            )));
        }

        response.text().await.map_err(AppError::backend)
    }
}

/// Strip boilerplate regions, pull the text of `<main>` (or the whole
/// body), collapse blank runs, and promote structure markers to
/// markdown headers.
pub fn extract_page_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut denied: HashSet<NodeId> = HashSet::new();
    for selector in BOILERPLATE_SELECTORS {
        if let Ok(parsed) = Selector::parse(selector) {
            for element in document.select(&parsed) {
                denied.insert(element.id());
            }
        }
    }

    let main_selector = Selector::parse("main").expect("main selector");
    let body_selector = Selector::parse("body").expect("body selector");
    let root = document
        .select(&main_selector)
        .next()
        .or_else(|| document.select(&body_selector).next());

    let mut text = String::new();
    if let Some(root) = root {
        collect_text(*root, &denied, &mut text);
    }

    let collapsed = markers::collapse_blank_runs(text.trim());
    let headed = markers::insert_markdown_headers(&collapsed);
    markers::collapse_blank_runs(headed.trim())
}

fn collect_text(node: NodeRef<'_, Node>, denied: &HashSet<NodeId>, out: &mut String) {
    if denied.contains(&node.id()) {
        return;
    }

    match node.value() {
        Node::Text(text) => {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                out.push_str(trimmed);
                out.push('\n');
            }
        }
        _ => {
            for child in node.children() {
                collect_text(child, denied, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html>
          <head><title>Закон</title><style>body { color: red }</style></head>
          <body>
            <header>Шапка сайта</header>
            <nav>Навигация</nav>
            <div class="breadcrumbs">Главная / Документы</div>
            <main>
              <div class="side-menu">Меню раздела</div>
              <p>ГЛАВА 1</p>
              <p>Статья 1. Общие положения.</p>
              <p>Нормы настоящего закона обязательны.</p>
            </main>
            <footer>Подвал</footer>
            <script>console.log("x")</script>
          </body>
        </html>
    "#;

    #[test]
    fn boilerplate_regions_are_stripped() {
        let text = extract_page_text(PAGE);

        assert!(!text.contains("Шапка"));
        assert!(!text.contains("Навигация"));
        assert!(!text.contains("Главная / Документы"));
        assert!(!text.contains("Меню раздела"));
        assert!(!text.contains("Подвал"));
        assert!(!text.contains("console.log"));
        assert!(!text.contains("color: red"));
        assert!(text.contains("Нормы настоящего закона обязательны."));
    }

    #[test]
    fn structure_markers_become_markdown_headers() {
        let text = extract_page_text(PAGE);

        assert!(text.contains("## ГЛАВА 1"));
        assert!(text.contains("## Статья 1"));
    }

    #[test]
    fn body_is_the_fallback_without_main() {
        let html = "<html><body><p>Статья 2. Текст без main.</p></body></html>";
        let text = extract_page_text(html);
        assert!(text.contains("Текст без main."));
        assert!(text.contains("## Статья 2"));
    }

    #[test]
    fn empty_document_yields_empty_text() {
        assert_eq!(extract_page_text("<html><body></body></html>"), "");
    }
}
