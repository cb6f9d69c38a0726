pub mod abilities;
pub mod asset;
pub mod row;

use tracing::info;
use url::Url;

use super::table::Row;
use crate::db::ItemRecord;
use row::RowFields;

#[derive(Debug)]
pub struct ExtractedPage {
    pub records: Vec<ItemRecord>,
    pub skipped: usize,
}

/// Turn table rows into records, one per usable row, in row order.
pub fn extract_all(rows: &[Row], base_url: Option<&Url>) -> ExtractedPage {
    let mut records = Vec::with_capacity(rows.len());
    let mut skipped = 0;

    for (i, r) in rows.iter().enumerate() {
        match row::extract(*r, base_url) {
            Ok(fields) => records.push(assemble(fields)),
            Err(skip) => {
                info!("Row {}: {}, skipping", i + 1, skip);
                skipped += 1;
            }
        }
    }

    ExtractedPage { records, skipped }
}

fn assemble(fields: RowFields) -> ItemRecord {
    ItemRecord {
        asset: fields.asset,
        name: fields.name,
        description: fields.description,
        item_set: fields.item_set,
        kind: fields.kind,
        attack_type: fields.attack_type,
        abilities: fields.abilities,
    }
}

// ── Tests ──
