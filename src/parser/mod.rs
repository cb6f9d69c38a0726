pub mod extract;
pub mod table;

use scraper::Html;
use tracing::warn;
use url::Url;

use extract::ExtractedPage;

/// Two-step pipeline: HTML → item-table rows → records.
pub fn process_page(html: &str, base_url: Option<&str>) -> ExtractedPage {
    let base = base_url.and_then(|b| match Url::parse(b) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!("Ignoring base URL {}: {}", b, e);
            None
        }
    });
    let doc = Html::parse_document(html);
    let rows = table::item_rows(&doc);
    extract::extract_all(&rows, base.as_ref())
}

// ── Tests ──
