use std::sync::LazyLock;

use scraper::{ElementRef, Selector};
use url::Url;

use crate::db::{AbilitySet, ActiveAbility};
use crate::parser::table::{direct_text, resolve, text_content};

static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

/// Split an abilities cell into its own flavor text and its named links.
pub fn parse(cell: ElementRef, base_url: Option<&Url>) -> AbilitySet {
    let passive_text = direct_text(cell).trim().to_string();

    // Icon-only anchors carry no label
    let active_abilities = cell
        .select(&ANCHOR_SEL)
        .filter_map(|a| {
            let name = text_content(a).trim().to_string();
            if name.is_empty() {
                return None;
            }
            let url = a.value().attr("href").map(|h| resolve(h, base_url)).unwrap_or_default();
            Some(ActiveAbility { url, name })
        })
        .collect();

    AbilitySet {
        passive_text,
        active_abilities,
    }
}
