//! Markdown-like text to Notion block translation.
//!
//! Two independent steps:
//! - [`line_to_block`] classifies one line into a [`Block`]
//! - [`text_to_runs`] splits inline text into plain and hyperlinked [`TextRun`]s
//!
//! # Line rules
//!
//! | Line | Block |
//! |------|-------|
//! | `---` exactly | divider, no payload |
//! | `# `, `## `, `### ` prefix | heading level 1-3, prefix stripped |
//! | `- `, `* ` prefix | bulleted list item, prefix stripped |
//! | anything else, including empty | paragraph |
//!
//! Every run is cut into pieces of at most [`RICH_TEXT_LIMIT`] characters,
//! because the pages API rejects longer single runs.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value, json};

/// Maximum characters in one rich-text run.
pub const RICH_TEXT_LIMIT: usize = 2000;

/// Maximum blocks the pages API accepts per append request.
pub const MAX_BLOCKS_PER_REQUEST: usize = 100;

/// `[label](url)` or a bare `http(s)://` URL.
static INLINE_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([^\]]+)\]\((https?://[^\s)]+)\)|(https?://[^\s)\]]+)").unwrap()
});

/// One contiguous span of text, optionally hyperlinked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub content: String,
    pub link: Option<String>,
}

impl TextRun {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            link: None,
        }
    }

    pub fn linked(content: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            link: Some(url.into()),
        }
    }

    /// The run as a pages API rich-text object.
    pub fn to_json(&self) -> Value {
        match &self.link {
            Some(url) => json!({
                "type": "text",
                "text": { "content": self.content, "link": { "url": url } }
            }),
            None => json!({
                "type": "text",
                "text": { "content": self.content }
            }),
        }
    }
}

/// One unit of page content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, runs: Vec<TextRun> },
    Paragraph(Vec<TextRun>),
    BulletItem(Vec<TextRun>),
    Divider,
}

impl Block {
    /// The block's text runs; empty for dividers.
    pub fn runs(&self) -> &[TextRun] {
        match self {
            Block::Heading { runs, .. } | Block::Paragraph(runs) | Block::BulletItem(runs) => runs,
            Block::Divider => &[],
        }
    }

    /// The pages API block type name.
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Heading { level: 1, .. } => "heading_1",
            Block::Heading { level: 2, .. } => "heading_2",
            Block::Heading { .. } => "heading_3",
            Block::Paragraph(_) => "paragraph",
            Block::BulletItem(_) => "bulleted_list_item",
            Block::Divider => "divider",
        }
    }

    /// The block as the pages API expects it in a `children` array.
    pub fn to_json(&self) -> Value {
        let kind = self.kind();
        let payload = match self {
            Block::Divider => json!({}),
            _ => json!({
                "rich_text": self.runs().iter().map(TextRun::to_json).collect::<Vec<_>>()
            }),
        };
        let mut block = Map::new();
        block.insert("object".to_string(), json!("block"));
        block.insert("type".to_string(), json!(kind));
        block.insert(kind.to_string(), payload);
        Value::Object(block)
    }
}

/// A rendered page: blocks in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedDocument {
    pub blocks: Vec<Block>,
}

impl RenderedDocument {
    /// Blocks grouped into append requests, order preserved.
    pub fn batches(&self) -> std::slice::Chunks<'_, Block> {
        self.blocks.chunks(MAX_BLOCKS_PER_REQUEST)
    }
}

/// Classify a single line.
pub fn line_to_block(line: &str) -> Block {
    if line == "---" {
        return Block::Divider;
    }
    for (prefix, level) in [("# ", 1u8), ("## ", 2), ("### ", 3)] {
        if let Some(rest) = line.strip_prefix(prefix) {
            return Block::Heading {
                level,
                runs: text_to_runs(rest),
            };
        }
    }
    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return Block::BulletItem(text_to_runs(rest));
    }
    Block::Paragraph(text_to_runs(line))
}

/// Split inline text into plain and hyperlinked runs, each within
/// [`RICH_TEXT_LIMIT`] characters.
pub fn text_to_runs(text: &str) -> Vec<TextRun> {
    let mut runs = Vec::new();
    let mut last = 0;

    for caps in INLINE_LINK.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        push_chunked(&mut runs, &text[last..whole.start()], None);

        match (caps.get(1), caps.get(2)) {
            (Some(label), Some(url)) => {
                push_chunked(&mut runs, label.as_str(), Some(url.as_str()))
            }
            _ => push_chunked(&mut runs, whole.as_str(), Some(whole.as_str())),
        }
        last = whole.end();
    }
    push_chunked(&mut runs, &text[last..], None);
    runs
}

/// Plain runs for text that carries no inline links, such as a page title.
pub fn plain_runs(text: &str) -> Vec<TextRun> {
    let mut runs = Vec::new();
    push_chunked(&mut runs, text, None);
    runs
}

/// Translate a whole document, one block per line.
pub fn content_to_blocks(content: &str) -> Vec<Block> {
    content.split('\n').map(line_to_block).collect()
}

fn push_chunked(runs: &mut Vec<TextRun>, text: &str, link: Option<&str>) {
    let mut rest = text;
    while !rest.is_empty() {
        let cut = rest
            .char_indices()
            .nth(RICH_TEXT_LIMIT)
            .map_or(rest.len(), |(i, _)| i);
        let (chunk, tail) = rest.split_at(cut);
        runs.push(match link {
            Some(url) => TextRun::linked(chunk, url),
            None => TextRun::plain(chunk),
        });
        rest = tail;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(block: &Block) -> String {
        block.runs().iter().map(|r| r.content.as_str()).collect()
    }

    #[test]
    fn test_divider() {
        let block = line_to_block("---");
        assert_eq!(block, Block::Divider);
        assert_eq!(
            block.to_json(),
            json!({ "object": "block", "type": "divider", "divider": {} })
        );
        // Only the exact line is a divider.
        assert!(matches!(line_to_block("----"), Block::Paragraph(_)));
    }

    #[test]
    fn test_headings() {
        let block = line_to_block("# Title");
        assert_eq!(
            block,
            Block::Heading {
                level: 1,
                runs: vec![TextRun::plain("Title")]
            }
        );
        assert_eq!(block.kind(), "heading_1");
        assert_eq!(line_to_block("## AI").kind(), "heading_2");
        assert_eq!(text(&line_to_block("### 뉴스")), "뉴스");
        assert_eq!(line_to_block("#### deep").kind(), "paragraph");
        assert_eq!(line_to_block("#nospace").kind(), "paragraph");
    }

    #[test]
    fn test_bullets() {
        assert_eq!(
            line_to_block("- 출처: plain"),
            Block::BulletItem(vec![TextRun::plain("출처: plain")])
        );
        assert_eq!(text(&line_to_block("* star")), "star");
    }

    #[test]
    fn test_empty_line_is_empty_paragraph() {
        let block = line_to_block("");
        assert_eq!(block, Block::Paragraph(vec![]));
        assert_eq!(
            block.to_json(),
            json!({ "object": "block", "type": "paragraph", "paragraph": { "rich_text": [] } })
        );
    }

    #[test]
    fn test_markdown_link_becomes_linked_run() {
        let runs = text_to_runs("see [기사 제목](https://n.news.naver.com/1) now");
        assert_eq!(
            runs,
            vec![
                TextRun::plain("see "),
                TextRun::linked("기사 제목", "https://n.news.naver.com/1"),
                TextRun::plain(" now"),
            ]
        );
    }

    #[test]
    fn test_bare_url_becomes_linked_run() {
        let runs = text_to_runs("출처: https://example.com/a?b=1");
        assert_eq!(
            runs,
            vec![
                TextRun::plain("출처: "),
                TextRun::linked("https://example.com/a?b=1", "https://example.com/a?b=1"),
            ]
        );
    }

    #[test]
    fn test_linked_run_json() {
        let json = TextRun::linked("label", "https://x.com").to_json();
        assert_eq!(json["text"]["link"]["url"], "https://x.com");
        assert_eq!(TextRun::plain("p").to_json()["text"].get("link"), None);
    }

    #[test]
    fn test_long_text_is_chunked() {
        let long = "가".repeat(4500);
        let runs = text_to_runs(&long);
        let sizes: Vec<_> = runs.iter().map(|r| r.content.chars().count()).collect();
        assert_eq!(sizes, [2000, 2000, 500]);

        let url = format!("https://example.com/{}", "a".repeat(2100));
        let runs = text_to_runs(&format!("[{}]({url})", "b".repeat(2500)));
        assert_eq!(runs.len(), 2);
        assert!(runs.iter().all(|r| r.link.as_deref() == Some(url.as_str())));
    }

    #[test]
    fn test_plain_runs_ignore_links_and_chunk() {
        assert_eq!(
            plain_runs("see https://x.com"),
            vec![TextRun::plain("see https://x.com")]
        );
        let sizes: Vec<_> = plain_runs(&"가".repeat(2500))
            .iter()
            .map(|r| r.content.chars().count())
            .collect();
        assert_eq!(sizes, [2000, 500]);
        assert!(plain_runs("").is_empty());
    }

    #[test]
    fn test_content_to_blocks_one_per_line() {
        let blocks = content_to_blocks("# T\n\n- a\n---\ntext");
        let kinds: Vec<_> = blocks.iter().map(Block::kind).collect();
        assert_eq!(
            kinds,
            ["heading_1", "paragraph", "bulleted_list_item", "divider", "paragraph"]
        );
    }

    #[test]
    fn test_batches_of_100() {
        let content = vec!["line"; 150].join("\n");
        let doc = RenderedDocument {
            blocks: content_to_blocks(&content),
        };
        let sizes: Vec<_> = doc.batches().map(<[Block]>::len).collect();
        assert_eq!(sizes, [100, 50]);
    }
}
