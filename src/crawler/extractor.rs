//! Record extraction from catalog item elements
//!
//! Converts one `article.product_pod` element into a normalized
//! [`ExtractedBook`]. Every fallible step returns a typed [`ExtractError`]
//! so the walker can skip the item and still count the failure.

use crate::record::{rating_from_class, ExtractedBook};
use crate::ExtractError;
use scraper::ElementRef;
use url::Url;

/// Extracts and normalizes one catalog item
///
/// # Normalization Rules
///
/// * Title: the `title` attribute of the item's heading link, falling back
///   to the link text.
/// * Product URL: catalog-relative hrefs (containing the catalogue segment)
///   resolve against the site root; parent-relative hrefs have their `../`
///   segments stripped and anchor at the catalogue root.
/// * Image URL: leading `../` segments stripped, anchored at the site root.
/// * Rating: the star element's class token ("One".."Five") mapped to 1-5;
///   unrecognized tokens map to 0.
/// * Price: currency symbol stripped, parsed as decimal.
/// * Availability: 1 if the stock-status text contains "In stock", else 0.
///
/// # Arguments
///
/// * `item` - The item element
/// * `category` - Category label the item was found under
/// * `base` - Site root URL
/// * `catalogue_path` - Path segment of the catalog root (e.g. "catalogue")
pub fn extract_book(
    item: &ElementRef,
    category: &str,
    base: &Url,
    catalogue_path: &str,
) -> Result<ExtractedBook, ExtractError> {
    let link = select_first(item, "h3 a").ok_or(ExtractError::Missing("title link"))?;

    let title = match link.value().attr("title") {
        Some(t) if !t.trim().is_empty() => t.trim().to_string(),
        _ => link.text().collect::<String>().trim().to_string(),
    };
    if title.is_empty() {
        return Err(ExtractError::Missing("title"));
    }

    let href = link
        .value()
        .attr("href")
        .ok_or(ExtractError::Missing("product href"))?;
    let product_url = resolve_product_url(href, base, catalogue_path)?;

    let img_src = select_first(item, "img")
        .and_then(|img| img.value().attr("src"))
        .ok_or(ExtractError::Missing("image src"))?;
    let image_url = resolve_image_url(img_src, base)?;

    let star = select_first(item, "p.star-rating").ok_or(ExtractError::Missing("rating"))?;
    // Class list is ["star-rating", "<Word>"]; a missing or unknown word is 0
    let rating = star
        .value()
        .classes()
        .find(|c| *c != "star-rating")
        .map(rating_from_class)
        .unwrap_or(0);

    let price_text = select_first(item, "p.price_color")
        .map(|p| p.text().collect::<String>())
        .ok_or(ExtractError::Missing("price"))?;
    let price = parse_price(&price_text)?;

    let availability = select_first(item, "p.instock.availability")
        .map(|p| p.text().collect::<String>())
        .map_or(0, |text| if text.contains("In stock") { 1 } else { 0 });

    Ok(ExtractedBook {
        title,
        price,
        rating,
        availability,
        category: category.to_string(),
        image_url,
        product_url,
    })
}

/// Resolves an item href to an absolute product URL
///
/// The catalog uses two relative-path conventions: the front page links
/// items as `catalogue/<slug>/index.html` while category pages link them as
/// `../../../<slug>/index.html`. Both must land under the catalogue root.
pub(crate) fn resolve_product_url(
    href: &str,
    base: &Url,
    catalogue_path: &str,
) -> Result<String, ExtractError> {
    let resolved = if href.contains(&format!("{}/", catalogue_path)) {
        base.join(href)
    } else {
        let clean = strip_parent_segments(href);
        base.join(&format!("{}/{}", catalogue_path, clean))
    };

    resolved
        .map(|url| url.to_string())
        .map_err(|source| ExtractError::UrlResolve {
            href: href.to_string(),
            source,
        })
}

/// Resolves a double-parent-relative image src to an absolute URL
pub(crate) fn resolve_image_url(src: &str, base: &Url) -> Result<String, ExtractError> {
    let clean = strip_parent_segments(src);
    base.join(clean)
        .map(|url| url.to_string())
        .map_err(|source| ExtractError::UrlResolve {
            href: src.to_string(),
            source,
        })
}

/// Strips leading `../` segments from a relative path
fn strip_parent_segments(path: &str) -> &str {
    let mut rest = path;
    while let Some(stripped) = rest.strip_prefix("../") {
        rest = stripped;
    }
    rest.trim_start_matches('/')
}

/// Strips the currency symbol and parses the price as a decimal
fn parse_price(text: &str) -> Result<f64, ExtractError> {
    let trimmed = text.trim();
    let numeric = trimmed.trim_start_matches(|c: char| !c.is_ascii_digit());

    numeric.parse::<f64>().map_err(|_| ExtractError::InvalidPrice {
        text: trimmed.to_string(),
    })
}

/// Selects the first descendant matching the selector
fn select_first<'a>(element: &ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = scraper::Selector::parse(css).ok()?;
    element.select(&selector).next()
}
