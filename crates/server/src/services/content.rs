//! Markdown rendering and derived post metadata.

use comrak::{Options, markdown_to_html};

/// Words read per minute when estimating reading time.
const WORDS_PER_MINUTE: usize = 200;

/// Render markdown to HTML with GitHub Flavored Markdown support.
///
/// Raw HTML in the source is escaped: post bodies are authored in the admin
/// panel and served to the public site as-is.
#[must_use]
pub fn render_markdown(content: &str) -> String {
    let mut options = Options::default();

    // Enable GFM extensions
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.header_ids = Some(String::new());
    options.extension.footnotes = true;

    options.render.r#unsafe = false;

    markdown_to_html(content, &options)
}

/// Plain text of a markdown document, whitespace collapsed.
#[must_use]
pub fn plain_text(markdown: &str) -> String {
    let html = render_markdown(markdown);

    let mut text = String::with_capacity(html.len());
    let mut tag: Option<String> = None;
    for c in html.chars() {
        if let Some(name) = tag.as_mut() {
            if c == '>' {
                if is_block_tag(name) {
                    text.push(' ');
                }
                tag = None;
            } else {
                name.push(c);
            }
        } else if c == '<' {
            tag = Some(String::new());
        } else {
            text.push(c);
        }
    }

    let text = text
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Tags whose boundaries separate words in the plain-text rendering.
fn is_block_tag(raw: &str) -> bool {
    let name = raw
        .trim_start_matches('/')
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    matches!(
        name.as_str(),
        "p" | "br"
            | "hr"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "li"
            | "ul"
            | "ol"
            | "div"
            | "pre"
            | "blockquote"
            | "table"
            | "tr"
            | "td"
            | "th"
            | "section"
    )
}

/// Derive a teaser from markdown: plain text cut on a word boundary.
///
/// Text longer than `max_chars` is shortened and ends with `…`.
#[must_use]
pub fn derive_excerpt(markdown: &str, max_chars: usize) -> String {
    let text = plain_text(markdown);
    if text.chars().count() <= max_chars {
        return text;
    }

    let end = text
        .char_indices()
        .nth(max_chars.saturating_sub(1))
        .map_or(text.len(), |(i, _)| i);
    let cut = if text[end..].starts_with(' ') {
        &text[..end]
    } else {
        match text[..end].rfind(' ') {
            Some(pos) if pos > 0 => &text[..pos],
            _ => &text[..end],
        }
    };
    let cut = cut.trim_end_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace());

    format!("{cut}…")
}

/// Estimated reading time in whole minutes, at least one.
#[must_use]
pub fn reading_time_minutes(markdown: &str) -> usize {
    let words = plain_text(markdown).split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_gfm() {
        let html = render_markdown("# Title\n\n~~old~~ | a |\n");
        assert!(html.contains("<h1>"));
        assert!(html.contains("<del>old</del>"));
    }

    #[test]
    fn test_raw_html_is_not_passed_through() {
        let html = render_markdown("hello <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(
            plain_text("## Intro\n\nLearn **AI** & [ML](https://x.io) fast."),
            "Intro Learn AI & ML fast."
        );
    }

    #[test]
    fn test_excerpt_short_text_unchanged() {
        assert_eq!(derive_excerpt("Short *post*.", 50), "Short post.");
    }

    #[test]
    fn test_excerpt_cuts_on_word_boundary() {
        let excerpt = derive_excerpt("The quick brown fox jumps over the lazy dog", 20);
        assert_eq!(excerpt, "The quick brown fox…");
        assert!(excerpt.chars().count() <= 20);
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(reading_time_minutes(""), 1);
        assert_eq!(reading_time_minutes(&"word ".repeat(450)), 3);
    }
}
