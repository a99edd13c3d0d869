//! HTML product descriptions to compact Markdown-like text for prompting.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node};

static INLINE_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\r\x0C]+").unwrap());
static H4_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#### ").unwrap());
static IMAGE_MARKUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[.*?\]\(.*?\)").unwrap());
static NEWLINE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());
static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").unwrap());

/// Converts `html` to Markdown-like text, drops image references, turns
/// `####` headings into `##`, collapses blank lines and trims the result.
/// Never fails: unparseable markup is rendered on a best-effort basis.
pub fn normalize(html: &str) -> String {
    let markdown = html_to_markdown(html);
    let markdown = H4_HEADING.replace_all(&markdown, "## ");
    let markdown = IMAGE_MARKUP.replace_all(&markdown, "");
    let markdown = SPACE_RUN.replace_all(&markdown, " ");
    let markdown = trim_lines(&markdown);
    let markdown = NEWLINE_RUN.replace_all(&markdown, "\n");
    markdown.trim().to_string()
}

fn html_to_markdown(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::with_capacity(html.len());
    render_children(fragment.root_element(), &mut out);
    out
}

fn trim_lines(text: &str) -> String {
    text.lines().map(str::trim).collect::<Vec<_>>().join("\n")
}

fn render_children(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&INLINE_SPACE.replace_all(text, " ")),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    render_element(child, out);
                }
            }
            _ => {}
        }
    }
}

fn render_inline(element: ElementRef<'_>) -> String {
    let mut inner = String::new();
    render_children(element, &mut inner);
    inner.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn render_element(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();
    match name {
        "script" | "style" | "head" | "noscript" | "template" => {}
        "br" => out.push('\n'),
        "hr" => out.push_str("\n\n---\n\n"),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = name[1..].parse::<usize>().unwrap_or(1);
            let text = render_inline(element);
            if !text.is_empty() {
                out.push_str("\n\n");
                out.push_str(&"#".repeat(level));
                out.push(' ');
                out.push_str(&text);
                out.push_str("\n\n");
            }
        }
        "ul" | "ol" => {
            out.push_str("\n\n");
            let ordered = name == "ol";
            let mut index = 0;
            for item in element.child_elements() {
                if item.value().name() == "li" {
                    index += 1;
                    out.push('\n');
                    if ordered {
                        out.push_str(&format!("{index}. "));
                    } else {
                        out.push_str("- ");
                    }
                    out.push_str(&render_inline(item));
                } else {
                    render_element(item, out);
                }
            }
            out.push_str("\n\n");
        }
        "li" => {
            out.push_str("\n- ");
            out.push_str(&render_inline(element));
            out.push('\n');
        }
        "strong" | "b" => wrap_inline(element, "**", out),
        "em" | "i" => wrap_inline(element, "*", out),
        "code" => wrap_inline(element, "`", out),
        "a" => {
            let text = render_inline(element);
            match element.value().attr("href") {
                Some(href) if !text.is_empty() => {
                    out.push_str(&format!("[{text}]({href})"));
                }
                _ => out.push_str(&text),
            }
        }
        "img" => {
            if let Some(src) = element.value().attr("src") {
                let alt = element.value().attr("alt").unwrap_or_default();
                out.push_str(&format!("![{alt}]({src})"));
            }
        }
        "td" | "th" => {
            render_children(element, out);
            out.push(' ');
        }
        "p" | "div" | "section" | "article" | "blockquote" | "pre" | "table" | "tr" | "figure"
        | "header" | "footer" => {
            out.push_str("\n\n");
            render_children(element, out);
            out.push_str("\n\n");
        }
        _ => render_children(element, out),
    }
}

fn wrap_inline(element: ElementRef<'_>, marker: &str, out: &mut String) {
    let text = render_inline(element);
    if !text.is_empty() {
        out.push_str(marker);
        out.push_str(&text);
        out.push_str(marker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_common_markup() {
        let html = "<h2>Oak Plank</h2><p>A <strong>rigid</strong> core with <em>acoustic</em> underlay.</p>\
                    <ul><li>Waterproof</li><li>Click-lock</li></ul>\
                    <p>See <a href=\"https://shop.example/care\">care guide</a>.</p>";
        assert_eq!(
            normalize(html),
            "## Oak Plank\nA **rigid** core with *acoustic* underlay.\n- Waterproof\n- Click-lock\nSee [care guide](https://shop.example/care)."
        );
    }

    #[test]
    fn fourth_level_headings_become_second_level() {
        let out = normalize("<h4>Specifications</h4><p>8mm</p><h5>Small print</h5>");
        assert_eq!(out, "## Specifications\n8mm\n##### Small print");
    }

    #[test]
    fn images_are_removed() {
        let html = "<p>Before<img src=\"/a.jpg\" alt=\"oak\">After</p><img src=\"/b.png\">";
        let out = normalize(html);
        assert_eq!(out, "BeforeAfter");
        assert!(!IMAGE_MARKUP.is_match(&out));
    }

    #[test]
    fn markdown_image_text_is_removed_too() {
        let out = normalize("Look ![floor](https://x/y.jpg) here");
        assert_eq!(out, "Look here");
    }

    #[test]
    fn blank_lines_collapse_and_output_is_trimmed() {
        let out = normalize("\n\n<p>One</p>\n\n\n<p>Two</p>   <br><br><br><p>Three</p>\n");
        assert_eq!(out, "One\nTwo\nThree");
    }

    #[test]
    fn ordered_lists_are_numbered() {
        let out = normalize("<ol><li>Clean</li><li>Lay underlay</li></ol>");
        assert_eq!(out, "1. Clean\n2. Lay underlay");
    }

    #[test]
    fn scripts_and_styles_are_dropped() {
        let out = normalize("<style>p{color:red}</style><p>Visible</p><script>alert(1)</script>");
        assert_eq!(out, "Visible");
    }

    #[test]
    fn malformed_markup_degrades_gracefully() {
        let out = normalize("<p>Unclosed <b>bold<div>nested</p></span>tail");
        assert!(out.contains("Unclosed"));
        assert!(out.contains("nested"));
        assert!(out.contains("tail"));
    }

    #[test]
    fn normalize_is_idempotent_on_plain_text() {
        let inputs = [
            "<h4>Specs</h4><p>8mm thick</p><ul><li>Waterproof</li></ul><img src=\"x.jpg\">",
            "## Title\n- item\nSome **bold** text [link](https://x.test)",
            "plain words only",
            "Look ![floor](https://x/y.jpg) here",
            "<p>Before <img src=\"a.png\" alt=\"a\"> after</p>",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {input}");
        }
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\n "), "");
    }
}
