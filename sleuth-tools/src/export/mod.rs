//! Document export: report text to a paginated, fixed-layout PDF.
//!
//! [`layout`] positions every line; [`render`] turns the positions into bytes.

pub mod layout;
pub mod render;

pub use layout::{
    DocumentLayout, FontStyle, PageContent, TextRun, caption, layout_document, sanitize,
    wrap_line,
};
pub use render::{export_pdf, render_pdf};
