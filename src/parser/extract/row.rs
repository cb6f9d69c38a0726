use std::sync::LazyLock;

use scraper::{ElementRef, Selector};
use url::Url;

use crate::db::{AbilitySet, AssetRef, ItemKind};
use crate::parser::table::{resolve, text_content, Row};

use super::abilities;

static IMAGE_LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a.image[href]").unwrap());
static IMG_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img[src]").unwrap());
static BADGE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img[data-src]").unwrap());

const ASSET_COL: usize = 1;
const NAME_COL: usize = 2;
const DESC_COL: usize = 3;
const FIRE_MODE_COL: usize = 4;
const ATTACK_COL: usize = 5;
const ABILITIES_COL: usize = 6;

/// Why a row produced no record. Carries the row's image URL once known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    NoImage,
    NoName(String),
    NoDescription(String),
}

impl std::fmt::Display for Skip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Skip::NoImage => write!(f, "row has no image"),
            Skip::NoName(url) => write!(f, "item {} has no name", url),
            Skip::NoDescription(url) => write!(f, "item {} has no description", url),
        }
    }
}

/// Everything read from one row, before assembly.
#[derive(Debug)]
pub struct RowFields {
    pub asset: AssetRef,
    pub name: String,
    pub description: String,
    pub item_set: Option<AssetRef>,
    pub kind: ItemKind,
    pub attack_type: Option<String>,
    pub abilities: Option<AbilitySet>,
}

/// Read one row by column position. Columns 1-3 are mandatory; 4-6 only add
/// fields when the cell exists.
pub fn extract(row: Row, base_url: Option<&Url>) -> Result<RowFields, Skip> {
    let image_url = row
        .cell(ASSET_COL)
        .and_then(|c| primary_image(c, base_url))
        .ok_or(Skip::NoImage)?;

    let Some(name_cell) = row.cell(NAME_COL) else {
        return Err(Skip::NoName(image_url));
    };
    let badge_url = name_cell
        .select(&BADGE_SEL)
        .next()
        .and_then(|img| img.value().attr("data-src"))
        .map(|src| resolve(src, base_url));

    let Some(desc_cell) = row.cell(DESC_COL) else {
        return Err(Skip::NoDescription(image_url));
    };

    let kind = match row.cell(FIRE_MODE_COL) {
        Some(cell) => ItemKind::Weapon {
            fire_mode: text_content(cell),
        },
        None => ItemKind::Item,
    };

    Ok(RowFields {
        asset: AssetRef::from_url(&image_url),
        name: text_content(name_cell).trim().to_string(),
        description: text_content(desc_cell).trim().to_string(),
        item_set: AssetRef::from_optional(badge_url.as_deref()),
        kind,
        attack_type: row.cell(ATTACK_COL).map(text_content),
        abilities: row.cell(ABILITIES_COL).map(|c| abilities::parse(c, base_url)),
    })
}

/// Anchor-wrapped image destination, else a bare image source.
fn primary_image(cell: ElementRef, base_url: Option<&Url>) -> Option<String> {
    cell.select(&IMAGE_LINK_SEL)
        .next()
        .and_then(|a| a.value().attr("href"))
        .or_else(|| cell.select(&IMG_SEL).next().and_then(|img| img.value().attr("src")))
        .map(|url| resolve(url, base_url))
}
