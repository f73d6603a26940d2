//! HTML rendering for the single research page.
//!
//! Collaborator output is markdown. It is rendered with `pulldown-cmark` and
//! any raw HTML in it is shown as text, never interpreted. Link and image
//! targets outside http, https and mailto are replaced with `#`.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, html};
use sleuth_core::memory::format_recalled;
use sleuth_core::pipeline::ResearchRun;

pub const TITLE: &str = "AI Research Assistant";
const SUBTITLE: &str = "A research agent using a hosted language model, SerpAPI and GitHub";

const ALLOWED_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Escape text for use in HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Whether a link target may be emitted as-is. Relative targets carry no
/// scheme and are allowed.
pub fn is_safe_url(url: &str) -> bool {
    // Browsers drop whitespace and control characters inside a scheme.
    let compact: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect();
    let scheme_end = compact.find(':');
    let path_start = compact.find(['/', '?', '#']);
    match (scheme_end, path_start) {
        (Some(colon), Some(path)) if path < colon => true,
        (Some(colon), _) => {
            let scheme = compact[..colon].to_ascii_lowercase();
            ALLOWED_SCHEMES.contains(&scheme.as_str())
        }
        (None, _) => true,
    }
}

fn safe_dest(dest_url: CowStr<'_>) -> CowStr<'_> {
    if is_safe_url(&dest_url) {
        dest_url
    } else {
        CowStr::Borrowed("#")
    }
}

/// Render markdown to HTML with raw HTML demoted to text and unsafe link
/// targets neutralized.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES)
        .map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => Event::Start(Tag::Link {
                link_type,
                dest_url: safe_dest(dest_url),
                title,
                id,
            }),
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => Event::Start(Tag::Image {
                link_type,
                dest_url: safe_dest(dest_url),
                title,
                id,
            }),
            other => other,
        });
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

fn layout(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ max-width: 760px; margin: 2rem auto; font-family: sans-serif; line-height: 1.5; }}
h1, .subtitle, footer {{ text-align: center; }}
.subtitle, footer {{ color: gray; }}
.notice {{ color: #a15c00; }}
.error {{ color: #b00020; }}
</style>
</head>
<body>
<h1>{title}</h1>
<p class="subtitle">{subtitle}</p>
<hr>
{body}
<hr>
<footer><small>{title}</small></footer>
</body>
</html>
"#,
        title = TITLE,
        subtitle = SUBTITLE,
        body = body
    )
}

fn form(topic: &str) -> String {
    format!(
        r#"<form method="post" action="/run">
<label for="topic">Enter your research topic:</label>
<input id="topic" name="topic" type="text" value="{}" autofocus>
<button type="submit">Run AI Agent</button>
</form>"#,
        escape_html(topic)
    )
}

/// The empty page: title, input and trigger. `notice` is shown above the form.
pub fn form_page(notice: Option<&str>) -> String {
    let notice = notice
        .map(|n| format!("<p class=\"notice\">{}</p>\n", escape_html(n)))
        .unwrap_or_default();
    layout(&format!("{}{}", notice, form("")))
}

fn section(heading: &str, markdown: &str) -> String {
    format!(
        "<section>\n<h3>{}</h3>\n{}</section>\n",
        escape_html(heading),
        markdown_to_html(markdown)
    )
}

/// The page after a successful run.
pub fn result_page(topic: &str, run: &ResearchRun) -> String {
    let report = &run.report;
    let mut body = form(topic);
    body.push('\n');
    body.push_str(&section(
        "Recalled Memory (for context only)",
        &format_recalled(&run.recalled_memory),
    ));
    body.push_str(&section("Detailed Explanation", &report.explanation));
    body.push_str(&section("Key Summary Points", &report.summary));
    body.push_str(&section("GitHub Projects", &report.repositories));
    body.push_str(&section("Final Report", &report.render()));
    body.push_str("<p><a href=\"/report.pdf\" download>Download PDF</a></p>\n");
    layout(&body)
}

/// A failure page carrying the error message.
pub fn error_page(message: &str) -> String {
    layout(&format!(
        "<p class=\"error\">Research failed: {}</p>\n{}",
        escape_html(message),
        form("")
    ))
}
