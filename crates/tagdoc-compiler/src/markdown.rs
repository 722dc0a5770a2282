//! Pluggable markdown-to-HTML rendering.

use pulldown_cmark::{Options, Parser, html};

/// Renders one prose segment to HTML.
///
/// Implementations must be stateless from the caller's point of view: the
/// compiler renders segments of many blocks in parallel through a shared
/// instance.
pub trait MarkdownRenderer: Send + Sync {
    /// Render markdown text to an HTML fragment.
    fn render(&self, markdown: &str) -> String;
}

/// Parser options for [`HtmlRenderer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// GitHub Flavored Markdown: tables, strikethrough, task lists.
    pub gfm: bool,
    /// Typographic quotes and dashes.
    pub smart_punctuation: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            smart_punctuation: false,
        }
    }
}

/// `CommonMark` renderer backed by `pulldown-cmark`.
#[derive(Clone, Debug, Default)]
pub struct HtmlRenderer {
    options: MarkdownOptions,
}

impl HtmlRenderer {
    /// Create a renderer with the given options.
    #[must_use]
    pub fn new(options: MarkdownOptions) -> Self {
        Self { options }
    }

    /// Get parser options based on configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        if self.options.gfm {
            options |= Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM;
        }
        if self.options.smart_punctuation {
            options |= Options::ENABLE_SMART_PUNCTUATION;
        }
        options
    }
}

impl MarkdownRenderer for HtmlRenderer {
    fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.parser_options());
        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut output, parser);
        output
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_render_paragraph() {
        let renderer = HtmlRenderer::default();
        assert_eq!(renderer.render("simple string"), "<p>simple string</p>\n");
    }

    #[test]
    fn test_render_blank_is_empty() {
        let renderer = HtmlRenderer::default();
        assert_eq!(renderer.render("\n\n  \n"), "");
    }

    #[test]
    fn test_gfm_table_enabled_by_default() {
        let renderer = HtmlRenderer::default();
        let html = renderer.render("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_gfm_disabled() {
        let renderer = HtmlRenderer::new(MarkdownOptions {
            gfm: false,
            smart_punctuation: false,
        });
        let html = renderer.render("~~gone~~");
        assert!(!html.contains("<del>"));
    }

    #[test]
    fn test_smart_punctuation() {
        let renderer = HtmlRenderer::new(MarkdownOptions {
            gfm: true,
            smart_punctuation: true,
        });
        assert!(renderer.render("a -- b").contains('\u{2013}'));
    }

    #[test]
    fn test_fenced_code_block() {
        let renderer = HtmlRenderer::default();
        let html = renderer.render("```css\n.btn {}\n```");
        assert_eq!(
            html,
            "<pre><code class=\"language-css\">.btn {}\n</code></pre>\n"
        );
    }
}
