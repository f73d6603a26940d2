//! PDF rendering with `lopdf`.
//!
//! Output is uncompressed and carries no timestamps or document IDs, so the
//! same layout always renders to the same bytes.

use super::layout::{DocumentLayout, FontStyle, caption, encode_win_ansi, layout_document};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};
use sleuth_core::config::PageLayout;
use sleuth_core::error::ExportError;
use std::path::Path;
use tracing::debug;

fn render_error(e: impl std::fmt::Display) -> ExportError {
    ExportError::Render {
        message: e.to_string(),
    }
}

fn page_operations(runs: &[super::layout::TextRun]) -> Vec<Operation> {
    let mut ops = Vec::with_capacity(runs.len() * 5);
    for run in runs {
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![run.font.resource_name().into(), run.size.into()],
        ));
        ops.push(Operation::new("Td", vec![run.x.into(), run.y.into()]));
        ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode_win_ansi(&run.text))],
        ));
        ops.push(Operation::new("ET", vec![]));
    }
    ops
}

/// Render a laid-out document to PDF bytes.
pub fn render_pdf(document: &DocumentLayout, page: &PageLayout) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for style in FontStyle::ALL {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => style.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(style.resource_name(), font_id);
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => fonts,
    });

    let mut kids: Vec<Object> = Vec::with_capacity(document.pages.len());
    for content in &document.pages {
        let encoded = Content {
            operations: page_operations(&content.runs),
        }
        .encode()
        .map_err(render_error)?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), page.page_width.into(), page.page_height.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode_win_ansi(&caption(&page.header_text))),
        "Producer" => Object::string_literal("sleuth"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(render_error)?;
    debug!(pages = page_count, bytes = bytes.len(), "Rendered PDF");
    Ok(bytes)
}

/// Lay out `text`, render it, and write the PDF to `path`.
pub fn export_pdf(text: &str, layout: &PageLayout, path: &Path) -> Result<(), ExportError> {
    let bytes = render_pdf(&layout_document(text, layout), layout)?;
    std::fs::write(path, &bytes).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "Exported PDF");
    Ok(())
}
