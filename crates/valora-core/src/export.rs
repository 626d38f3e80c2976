//! Document export: block assembly, text wrapping and pagination.
//!
//! The exporter turns a finished session into an ordered list of content
//! blocks (title, static map, one section per evaluated image, the report
//! text), wraps text to the page width, and paginates with a running
//! vertical cursor. The byte-level rendering stays behind the
//! [`DocumentRenderer`] seam; [`PlainPageRenderer`] is the renderer the
//! CLI ships with.

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use crate::capability::AssetFetcher;
use crate::error::{Result, ValuationError};
use crate::session::Session;

/// Page geometry in text units: characters per line, lines per page.
#[derive(Debug, Clone, Copy)]
pub struct PageLayout {
    pub width: usize,
    pub height: usize,
    /// Vertical space one embedded image occupies.
    pub image_height: usize,
}

impl Default for PageLayout {
    fn default() -> Self {
        PageLayout {
            width: 80,
            height: 48,
            image_height: 12,
        }
    }
}

/// One laid-out content block.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading(String),
    /// A single pre-wrapped line of text.
    Line(String),
    Image { caption: String, data: Vec<u8> },
    /// Stand-in line for an asset that could not be fetched.
    Placeholder(String),
    Blank,
}

impl Block {
    fn height(&self, layout: &PageLayout) -> usize {
        match self {
            Block::Heading(_) => 2,
            Block::Line(_) | Block::Placeholder(_) | Block::Blank => 1,
            Block::Image { .. } => layout.image_height,
        }
    }
}

/// One page of blocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub blocks: Vec<Block>,
}

/// A fully paginated document ready for rendering.
#[derive(Debug, Clone)]
pub struct LaidOutDocument {
    /// Address-derived base name, without extension.
    pub file_stem: String,
    pub pages: Vec<Page>,
}

/// Byte-level document rendering. The pixel-exact layout engine is an
/// external collaborator; implementations only serialize already
/// paginated blocks.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, document: &LaidOutDocument) -> Result<Vec<u8>>;
    fn file_extension(&self) -> &'static str;
}

/// Assembles and paginates the export document for a session.
pub struct DocumentExporter {
    assets: Arc<dyn AssetFetcher>,
    layout: PageLayout,
}

impl DocumentExporter {
    pub fn new(assets: Arc<dyn AssetFetcher>) -> Self {
        DocumentExporter {
            assets,
            layout: PageLayout::default(),
        }
    }

    pub fn with_layout(mut self, layout: PageLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Lay out the document: requires a drafted report and a location.
    ///
    /// Individual asset failures (map tile or property photo) degrade to
    /// a placeholder line in that section; they never abort the export.
    pub async fn lay_out(&self, session: &Session) -> Result<LaidOutDocument> {
        let report = session
            .report
            .as_ref()
            .ok_or_else(|| ValuationError::input("a drafted report is required for export"))?;
        let location = session
            .location
            .as_ref()
            .ok_or_else(|| ValuationError::input("a location is required for export"))?;

        let mut blocks = Vec::new();

        blocks.push(Block::Heading("Valuation Report".to_string()));
        for line in wrap_text(&location.address, self.layout.width) {
            blocks.push(Block::Line(line));
        }
        blocks.push(Block::Line(format!(
            "Generated {}",
            Utc::now().format("%Y-%m-%d")
        )));
        blocks.push(Block::Blank);

        let map_url = self.assets.static_map_url(location.lat, location.lng);
        blocks.push(self.fetch_block("Location map", &map_url).await);
        blocks.push(Block::Blank);

        for (index, image) in session.evaluated_images.iter().enumerate() {
            blocks.push(Block::Heading(format!("Image {}", index + 1)));
            blocks.push(self.fetch_block(&format!("Image {}", index + 1), &image.url).await);
            blocks.push(Block::Line(format!("Score: {:.1} / 10", image.score)));
            for line in wrap_text(&image.description, self.layout.width) {
                blocks.push(Block::Line(line));
            }
            blocks.push(Block::Blank);
        }

        blocks.push(Block::Heading("Report".to_string()));
        for line in wrap_text(report, self.layout.width) {
            blocks.push(Block::Line(line));
        }

        Ok(LaidOutDocument {
            file_stem: sanitize_file_stem(&location.address),
            pages: paginate(blocks, &self.layout),
        })
    }

    /// Lay out and render in one go. Returns the deterministic file name
    /// and the rendered bytes.
    pub async fn export(
        &self,
        session: &Session,
        renderer: &dyn DocumentRenderer,
    ) -> Result<(String, Vec<u8>)> {
        let document = self.lay_out(session).await?;
        let name = format!("{}.{}", document.file_stem, renderer.file_extension());
        let bytes = renderer.render(&document)?;
        Ok((name, bytes))
    }

    async fn fetch_block(&self, caption: &str, url: &str) -> Block {
        match self.assets.fetch(url).await {
            Ok(data) => Block::Image {
                caption: caption.to_string(),
                data,
            },
            Err(e) => {
                warn!(url = %url, error = %e, "asset fetch failed, using placeholder");
                Block::Placeholder(format!("[{caption} unavailable]"))
            }
        }
    }
}

/// Deterministic file stem from an address: every non-alphanumeric
/// character becomes an underscore.
pub fn sanitize_file_stem(address: &str) -> String {
    address
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Greedy word wrap. Blank source lines are preserved; words longer than
/// the width are hard-split.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in text.lines() {
        if raw.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut current = String::new();
        let mut current_len = 0usize;
        for word in raw.split_whitespace() {
            let mut word: String = word.to_string();
            let mut word_len = word.chars().count();
            while word_len > width {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                lines.push(word.chars().take(width).collect());
                word = word.chars().skip(width).collect();
                word_len = word.chars().count();
            }
            if word_len == 0 {
                continue;
            }
            if current_len == 0 {
                current = word;
                current_len = word_len;
            } else if current_len + 1 + word_len <= width {
                current.push(' ');
                current.push_str(&word);
                current_len += 1 + word_len;
            } else {
                lines.push(std::mem::take(&mut current));
                current = word;
                current_len = word_len;
            }
        }
        if current_len > 0 {
            lines.push(current);
        }
    }
    lines
}

/// Pack blocks into pages with a running vertical cursor: whenever the
/// next block does not fit in the remaining space, start a new page.
/// A block taller than a whole page still gets a page of its own.
fn paginate(blocks: Vec<Block>, layout: &PageLayout) -> Vec<Page> {
    let mut pages = Vec::new();
    let mut page = Page::default();
    let mut cursor = 0usize;

    for block in blocks {
        let height = block.height(layout);
        if cursor > 0 && cursor + height > layout.height {
            pages.push(std::mem::take(&mut page));
            cursor = 0;
        }
        cursor += height;
        page.blocks.push(block);
    }
    if !page.blocks.is_empty() {
        pages.push(page);
    }
    pages
}

/// Renderer emitting form-feed-separated text pages. Images become a
/// caption line noting the byte size.
#[derive(Debug, Default)]
pub struct PlainPageRenderer;

impl PlainPageRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentRenderer for PlainPageRenderer {
    fn render(&self, document: &LaidOutDocument) -> Result<Vec<u8>> {
        let mut out = String::new();
        for (index, page) in document.pages.iter().enumerate() {
            if index > 0 {
                out.push('\u{0C}');
                out.push('\n');
            }
            for block in &page.blocks {
                match block {
                    Block::Heading(text) => {
                        out.push_str(text);
                        out.push('\n');
                        out.push_str(&"-".repeat(text.chars().count()));
                        out.push('\n');
                    }
                    Block::Line(text) | Block::Placeholder(text) => {
                        out.push_str(text);
                        out.push('\n');
                    }
                    Block::Image { caption, data } => {
                        out.push_str(&format!("[image: {} ({} bytes)]\n", caption, data.len()));
                    }
                    Block::Blank => out.push('\n'),
                }
            }
        }
        Ok(out.into_bytes())
    }

    fn file_extension(&self) -> &'static str {
        "txt"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(
            sanitize_file_stem("12 Main St, Kingston"),
            "12_Main_St__Kingston"
        );
        assert_eq!(sanitize_file_stem("Ocho-Rios #4"), "Ocho_Rios__4");
    }

    #[test]
    fn test_wrap_text_respects_width() {
        let lines = wrap_text("a spacious and airy living room with sea views", 16);
        assert!(lines.iter().all(|l| l.chars().count() <= 16));
        assert_eq!(lines.join(" "), "a spacious and airy living room with sea views");
    }

    #[test]
    fn test_wrap_text_hard_splits_long_words() {
        let lines = wrap_text("xxxxxxxxxxxxxxxxxxxx", 8);
        assert_eq!(lines, vec!["xxxxxxxx", "xxxxxxxx", "xxxx"]);
    }

    #[test]
    fn test_wrap_text_preserves_blank_lines() {
        let lines = wrap_text("first\n\nsecond", 80);
        assert_eq!(lines, vec!["first", "", "second"]);
    }

    #[test]
    fn test_paginate_breaks_on_overflow() {
        let layout = PageLayout {
            width: 80,
            height: 4,
            image_height: 3,
        };
        let blocks = vec![
            Block::Line("one".to_string()),
            Block::Line("two".to_string()),
            Block::Image {
                caption: "map".to_string(),
                data: vec![0u8; 4],
            },
            Block::Line("three".to_string()),
        ];
        let pages = paginate(blocks, &layout);
        // Two lines fit on page 1, the 3-high image forces a break,
        // then the image plus one more line fill page 2.
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].blocks.len(), 2);
        assert_eq!(pages[1].blocks.len(), 2);
    }

    #[test]
    fn test_paginate_oversized_block_gets_own_page() {
        let layout = PageLayout {
            width: 80,
            height: 4,
            image_height: 10,
        };
        let blocks = vec![
            Block::Line("lead".to_string()),
            Block::Image {
                caption: "huge".to_string(),
                data: vec![],
            },
        ];
        let pages = paginate(blocks, &layout);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].blocks.len(), 1);
    }

    #[test]
    fn test_plain_renderer_output() {
        let document = LaidOutDocument {
            file_stem: "x".to_string(),
            pages: vec![
                Page {
                    blocks: vec![
                        Block::Heading("Valuation Report".to_string()),
                        Block::Line("12 Main St".to_string()),
                    ],
                },
                Page {
                    blocks: vec![Block::Placeholder("[map unavailable]".to_string())],
                },
            ],
        };
        let bytes = PlainPageRenderer::new().render(&document).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("Valuation Report\n----------------\n"));
        assert!(text.contains('\u{0C}'));
        assert!(text.contains("[map unavailable]"));
    }
}
