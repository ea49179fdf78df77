//! SVG detection and rasterisation.

use std::sync::{Arc, LazyLock};

use resvg::{tiny_skia, usvg};

use crate::error::ImagingError;

/// Whether `data` looks like an SVG document.
///
/// The first 100 bytes, trimmed and lower-cased, must contain `<svg`. A
/// document that opens with an XML declaration gets a deeper look at the
/// first 1024 bytes.
#[must_use]
pub fn is_svg(data: &[u8]) -> bool {
    let head = lossy_prefix(data, 100).trim().to_lowercase();
    if head.contains("<svg") {
        return true;
    }
    if head.contains("<?xml") {
        return lossy_prefix(data, 1024).to_lowercase().contains("<svg");
    }
    false
}

fn lossy_prefix(data: &[u8], len: usize) -> String {
    String::from_utf8_lossy(&data[..data.len().min(len)]).into_owned()
}

/// System fonts for `<text>` elements, loaded once per process.
static FONTS: LazyLock<Arc<usvg::fontdb::Database>> = LazyLock::new(|| {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    tracing::debug!(faces = db.len(), "Loaded system fonts for SVG text");
    Arc::new(db)
});

/// Rasterise an SVG document at its intrinsic size and encode it as PNG.
pub fn svg_to_png(data: &[u8]) -> Result<Vec<u8>, ImagingError> {
    let options = usvg::Options {
        fontdb: Arc::clone(&FONTS),
        ..usvg::Options::default()
    };
    let tree = usvg::Tree::from_data(data, &options)
        .map_err(|e| ImagingError::Svg(e.to_string()))?;

    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height()).ok_or_else(|| {
        ImagingError::InvalidDimensions(format!(
            "SVG canvas {}x{}",
            size.width(),
            size.height()
        ))
    })?;

    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
    tracing::debug!(
        width = size.width(),
        height = size.height(),
        "Rasterised SVG"
    );

    pixmap
        .encode_png()
        .map_err(|e| ImagingError::Svg(e.to_string()))
}
