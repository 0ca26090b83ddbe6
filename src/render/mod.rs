//! Page content rendering.
//!
//! # Submodules
//!
//! - [`template`]: Turns aggregated categories into markdown-like text
//! - [`blocks`]: Turns markdown-like text into pages API blocks
//!
//! ```text
//! CategoryResult[] ──template──▶ "## 🤖 AI\n\n### [title](link)…" ──blocks──▶ Block[]
//! ```

pub mod blocks;
pub mod template;

use crate::models::CategoryResult;
use blocks::{RenderedDocument, content_to_blocks};
use template::{Template, apply_template};

/// Render aggregated categories into a block document.
pub fn render(categories: &[CategoryResult], template: Template) -> RenderedDocument {
    render_markdown(&apply_template(categories, template))
}

/// Translate markdown-like text into a block document.
pub fn render_markdown(content: &str) -> RenderedDocument {
    RenderedDocument {
        blocks: content_to_blocks(content),
    }
}
