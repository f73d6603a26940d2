//! Page layout: turns report text into positioned text runs.
//!
//! Pure and deterministic. Rendering to bytes happens in [`super::render`].

use serde::{Deserialize, Serialize};
use sleuth_core::config::PageLayout;
use textwrap::{Options, WrapAlgorithm};

/// Font face of a text run. All three are base-14 Helvetica variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontStyle {
    Regular,
    Bold,
    Oblique,
}

impl FontStyle {
    /// Resource name used in page content streams.
    pub fn resource_name(self) -> &'static str {
        match self {
            FontStyle::Regular => "F1",
            FontStyle::Bold => "F2",
            FontStyle::Oblique => "F3",
        }
    }

    pub fn base_font(self) -> &'static str {
        match self {
            FontStyle::Regular => "Helvetica",
            FontStyle::Bold => "Helvetica-Bold",
            FontStyle::Oblique => "Helvetica-Oblique",
        }
    }

    pub const ALL: [FontStyle; 3] = [FontStyle::Regular, FontStyle::Bold, FontStyle::Oblique];
}

/// One string drawn at a fixed baseline position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    pub x: i64,
    pub y: i64,
    pub font: FontStyle,
    pub size: i64,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    pub runs: Vec<TextRun>,
}

/// A laid-out document: pages of positioned runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLayout {
    pub pages: Vec<PageContent>,
}

impl DocumentLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Every run in drawing order.
    pub fn runs(&self) -> impl Iterator<Item = &TextRun> {
        self.pages.iter().flat_map(|p| p.runs.iter())
    }

    /// Body runs only (regular face at body size), in drawing order.
    pub fn body_lines(&self, layout: &PageLayout) -> Vec<&str> {
        self.runs()
            .filter(|r| r.font == FontStyle::Regular && r.size == layout.body_font_size)
            .map(|r| r.text.as_str())
            .collect()
    }
}

/// Map a character onto the WinAnsi repertoire of the base-14 fonts.
///
/// Returns `None` for characters the fonts cannot draw.
pub fn win_ansi_byte(c: char) -> Option<u8> {
    match c {
        ' '..='~' => Some(c as u8),
        '\u{A0}'..='\u{FF}' if c != '\u{AD}' => Some(c as u32 as u8),
        '\u{20AC}' => Some(0x80),
        '\u{201A}' => Some(0x82),
        '\u{201E}' => Some(0x84),
        '\u{2026}' => Some(0x85),
        '\u{2018}' => Some(0x91),
        '\u{2019}' => Some(0x92),
        '\u{201C}' => Some(0x93),
        '\u{201D}' => Some(0x94),
        '\u{2022}' => Some(0x95),
        '\u{2013}' => Some(0x96),
        '\u{2014}' => Some(0x97),
        '\u{2122}' => Some(0x99),
        _ => None,
    }
}

/// Keep only characters the fonts can draw. Tabs become spaces.
pub fn sanitize(line: &str) -> String {
    line.chars()
        .map(|c| if c == '\t' { ' ' } else { c })
        .filter(|c| win_ansi_byte(*c).is_some())
        .collect()
}

/// A header or footer caption: sanitized, with the gaps left by dropped
/// characters at either end removed.
pub fn caption(text: &str) -> String {
    sanitize(text).trim().to_string()
}

/// Encode already-sanitized text as WinAnsi bytes.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().filter_map(win_ansi_byte).collect()
}

/// Greedy first-fit word wrap at `width` characters.
///
/// Leading indentation stays on the first wrapped line, capped at half the
/// width, and counts toward it. Continuation lines start flush. Trailing
/// whitespace is dropped, words longer than the line are broken, and a blank
/// line wraps to nothing.
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let content = line.trim();
    if content.is_empty() {
        return Vec::new();
    }
    let indent_len = line
        .chars()
        .take_while(|c| c.is_whitespace())
        .count()
        .min(width / 2);
    let indent = " ".repeat(indent_len);
    let options = Options::new(width)
        .initial_indent(&indent)
        .break_words(true)
        .wrap_algorithm(WrapAlgorithm::FirstFit);
    textwrap::wrap(content, options)
        .into_iter()
        .map(|cow| cow.into_owned())
        .filter(|l| !l.is_empty())
        .collect()
}

/// Lay out `text` on fixed-size pages.
///
/// Page one carries the header and, when the text has a line starting with
/// the topic marker, a topic line. Every line of `text` then becomes wrapped
/// body lines. A page break happens only when a line is about to be drawn
/// below the bottom margin, so no page is ever empty. The footer goes once,
/// on the last page.
pub fn layout_document(text: &str, layout: &PageLayout) -> DocumentLayout {
    let top = layout.top();
    let mut pages = vec![PageContent::default()];
    let mut y = top;

    pages[0].runs.push(TextRun {
        x: layout.left_margin,
        y,
        font: FontStyle::Bold,
        size: layout.header_font_size,
        text: caption(&layout.header_text),
    });
    y -= layout.header_advance;

    if let Some(topic) = find_topic_line(text, &layout.topic_marker) {
        let label = topic.replacen(layout.topic_marker.as_str(), &layout.topic_label, 1);
        pages[0].runs.push(TextRun {
            x: layout.left_margin,
            y,
            font: FontStyle::Regular,
            size: layout.topic_font_size,
            text: sanitize(&label),
        });
        y -= layout.topic_advance;
    }

    for line in text.lines() {
        for wrapped in wrap_line(&body_line(line), layout.wrap_width) {
            if y < layout.bottom_margin {
                pages.push(PageContent::default());
                y = top;
            }
            if let Some(page) = pages.last_mut() {
                page.runs.push(TextRun {
                    x: layout.left_margin,
                    y,
                    font: FontStyle::Regular,
                    size: layout.body_font_size,
                    text: wrapped,
                });
            }
            y -= layout.line_height.max(1);
        }
    }

    if let Some(page) = pages.last_mut() {
        page.runs.push(TextRun {
            x: layout.left_margin,
            y: layout.footer_y,
            font: FontStyle::Oblique,
            size: layout.footer_font_size,
            text: caption(&layout.footer_text),
        });
    }

    DocumentLayout { pages }
}

/// A report line ready for wrapping. The raw line's own indentation is kept;
/// a gap left by a dropped leading character is not.
fn body_line(line: &str) -> String {
    let indent = line.chars().take_while(|c| *c == ' ' || *c == '\t').count();
    format!("{}{}", " ".repeat(indent), sanitize(line).trim_start())
}

fn find_topic_line<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    if marker.is_empty() {
        return None;
    }
    text.lines().find(|l| l.starts_with(marker))
}

/// Number of wrapped body lines `text` produces.
pub fn wrapped_line_count(text: &str, layout: &PageLayout) -> usize {
    text.lines()
        .map(|l| wrap_line(&body_line(l), layout.wrap_width).len())
        .sum()
}

/// Whether `text` contains a topic line for `layout`.
pub fn has_topic_line(text: &str, layout: &PageLayout) -> bool {
    find_topic_line(text, &layout.topic_marker).is_some()
}
