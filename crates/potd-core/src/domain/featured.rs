//! Extraction of "Today's featured picture" from the Wikipedia main page.
//!
//! The main page wraps the featured picture in an element with id `mp-tfp`.
//! Its first `img` is the thumbnail; its text is the description followed by
//! the photo credit.

use scraper::{ElementRef, Html, Node, Selector};
use thiserror::Error;

/// Credit separators, in order of preference.
const CREDIT_SEPARATORS: [&str; 2] = ["Photograph credit:", "Photograph:"];

/// Elements that separate words when flattening text.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "blockquote", "br", "caption", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "ol", "p",
    "section", "table", "td", "th", "tr", "ul",
];

/// Errors raised when the main page does not have the expected structure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Could not find 'mp-tfp' element on the main page; the page structure might have changed")]
    MissingContainer,

    #[error("No image found in 'mp-tfp' container")]
    MissingImage,

    #[error("Invalid selector '{0}'")]
    Selector(String),
}

/// What the main page says about today's featured picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeaturedPicture {
    /// The `src` of the thumbnail, made absolute.
    pub thumbnail_url: String,
    /// Best guess at the full-resolution original.
    pub image_url: String,
    pub description: String,
    pub credit: String,
}

/// Parse the main page HTML into a [`FeaturedPicture`].
pub fn parse_featured_picture(html: &str) -> Result<FeaturedPicture, ExtractionError> {
    let document = Html::parse_document(html);
    let container_sel = selector("#mp-tfp")?;
    let img_sel = selector("img")?;

    let container = document
        .select(&container_sel)
        .next()
        .ok_or(ExtractionError::MissingContainer)?;

    let img = container
        .select(&img_sel)
        .next()
        .ok_or(ExtractionError::MissingImage)?;

    let src = img.value().attr("src").unwrap_or_default();
    let thumbnail_url = if src.starts_with("//") {
        format!("https:{src}")
    } else {
        src.to_string()
    };
    let image_url = original_image_url(&thumbnail_url);

    let (description, credit) = split_credit(&element_text(container));

    Ok(FeaturedPicture {
        thumbnail_url,
        image_url,
        description,
        credit,
    })
}

fn selector(css: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(css).map_err(|_| ExtractionError::Selector(css.to_string()))
}

/// Resolve a thumbnail URL to the original upload.
///
/// `//upload.wikimedia.org/wikipedia/commons/thumb/a/a4/Name.jpg/300px-Name.jpg`
/// becomes `//upload.wikimedia.org/wikipedia/commons/a/a4/Name.jpg`. Every
/// `/thumb/` segment is collapsed. URLs without one are returned unchanged.
#[must_use]
pub fn original_image_url(thumb_url: &str) -> String {
    if thumb_url.contains("/thumb/") {
        if let Some(last_slash) = thumb_url.rfind('/') {
            if last_slash > 0 {
                return thumb_url[..last_slash].replace("/thumb/", "/");
            }
        }
    }
    thumb_url.to_string()
}

/// Split the container text into `(description, credit)`.
///
/// Pieces are produced by splitting on the separator and dropping trailing
/// empty pieces; the credit is the second piece.
#[must_use]
pub fn split_credit(text: &str) -> (String, String) {
    let Some(separator) = CREDIT_SEPARATORS
        .into_iter()
        .find(|sep| text.contains(sep))
    else {
        return (text.to_string(), String::new());
    };

    let mut parts: Vec<&str> = text.split(separator).collect();
    while parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }

    if parts.len() > 1 {
        (parts[0].trim().to_string(), parts[1].trim().to_string())
    } else {
        (text.to_string(), String::new())
    }
}

/// Whitespace-normalised text of an element; block elements separate words.
fn element_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if name == "script" || name == "style" {
                    continue;
                }
                let block = BLOCK_ELEMENTS.contains(&name);
                if block {
                    out.push(' ');
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
                if block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}
