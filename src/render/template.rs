//! Page templates: aggregated categories to markdown-like text.
//!
//! The text produced here only uses the line forms understood by
//! [`super::blocks::line_to_block`].

use super::blocks::{Block, line_to_block};
use crate::models::{Article, CategoryResult};
use chrono::DateTime;
use itertools::Itertools;
use std::str::FromStr;

/// Prepended to free text that would otherwise read as block syntax.
const ZERO_WIDTH_SPACE: char = '\u{200B}';

/// Icon used when no keyword matches a category.
pub const DEFAULT_ICON: &str = "📰";

/// Lowercase keyword → icon. First match wins, so short keywords go last.
const TOPIC_ICONS: &[(&str, &str)] = &[
    ("인공지능", "🤖"),
    ("반도체", "💾"),
    ("tech", "💻"),
    ("기술", "💻"),
    ("주식", "📈"),
    ("증시", "📈"),
    ("stock", "📈"),
    ("경제", "💰"),
    ("econom", "💰"),
    ("금융", "💰"),
    ("부동산", "🏠"),
    ("정치", "🏛️"),
    ("politic", "🏛️"),
    ("국제", "🌍"),
    ("world", "🌍"),
    ("사회", "👥"),
    ("스포츠", "⚽"),
    ("sport", "⚽"),
    ("과학", "🔬"),
    ("science", "🔬"),
    ("건강", "🏥"),
    ("health", "🏥"),
    ("문화", "🎭"),
    ("culture", "🎭"),
    ("연예", "🎬"),
    ("entertain", "🎬"),
    ("게임", "🎮"),
    ("game", "🎮"),
    ("날씨", "🌤️"),
    ("weather", "🌤️"),
    ("ai", "🤖"),
];

/// Page layouts. Unknown names fall back to [`Template::Default`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Template {
    /// Full entries: linked title, date, description, source links.
    #[default]
    Default,
    /// One bullet per article with its linked title and date.
    Compact,
}

impl FromStr for Template {
    type Err = std::convert::Infallible;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Ok(match name.trim().to_lowercase().as_str() {
            "compact" => Template::Compact,
            _ => Template::Default,
        })
    }
}

impl Template {
    pub fn from_name(name: Option<&str>) -> Self {
        name.map(|n| n.parse::<Template>().unwrap_or_default()).unwrap_or_default()
    }
}

/// Pick the icon for a category by case-insensitive keyword match.
pub fn topic_icon(category: &str) -> &'static str {
    let lowered = category.to_lowercase();
    TOPIC_ICONS
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map_or(DEFAULT_ICON, |(_, icon)| *icon)
}

/// Render categories with the given template.
pub fn apply_template(categories: &[CategoryResult], template: Template) -> String {
    let mut lines: Vec<String> = Vec::new();

    for CategoryResult { category, articles } in categories {
        lines.push(format!("## {} {}", topic_icon(category), category));
        lines.push(String::new());

        for article in articles {
            match template {
                Template::Default => push_full_entry(&mut lines, article),
                Template::Compact => push_compact_entry(&mut lines, article),
            }
        }
        if template == Template::Compact {
            lines.push(String::new());
        }
    }

    lines.iter().join("\n").trim().to_string()
}

fn push_full_entry(lines: &mut Vec<String>, article: &Article) {
    lines.push(format!("### {}", title_link(article)));
    lines.push(String::new());
    if let Some(date) = display_date(&article.pub_date) {
        lines.push(format!("📅 {date}"));
    }
    if !article.description.is_empty() {
        lines.push(paragraph_line(&article.description));
    }
    lines.push(String::new());
    lines.push(format!("- 출처: {}", article.link));
    if let Some(original) = article
        .originallink
        .as_deref()
        .filter(|o| !o.is_empty() && *o != article.link)
    {
        lines.push(format!("- 원본: {original}"));
    }
    lines.push(String::new());
    lines.push("---".to_string());
    lines.push(String::new());
}

fn push_compact_entry(lines: &mut Vec<String>, article: &Article) {
    match display_date(&article.pub_date) {
        Some(date) => lines.push(format!("- {} ({date})", title_link(article))),
        None => lines.push(format!("- {}", title_link(article))),
    }
}

/// `[title](link)`, with brackets in the title replaced so the link parses.
fn title_link(article: &Article) -> String {
    let title = single_line(&article.title).replace('[', "(").replace(']', ")");
    format!("[{}]({})", title.trim(), article.link)
}

/// Line breaks folded into spaces so the text stays on one line.
fn single_line(text: &str) -> String {
    text.split(['\r', '\n'])
        .filter(|part| !part.is_empty())
        .join(" ")
}

/// Free text as a line that always renders as a paragraph.
fn paragraph_line(text: &str) -> String {
    let line = single_line(text);
    match line_to_block(&line) {
        Block::Paragraph(_) => line,
        _ => format!("{ZERO_WIDTH_SPACE}{line}"),
    }
}

/// A readable publish date, or `None` when there is nothing to show.
fn display_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Some(
        DateTime::parse_from_rfc2822(raw)
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|_| raw.to_string()),
    )
}
