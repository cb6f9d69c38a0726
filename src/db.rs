use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

// ── Records ──

/// Identifiers derived from one CDN asset URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    #[serde(skip)]
    pub raw_url: String,
    #[serde(rename = "imgUrl")]
    pub canonical_url: String,
    #[serde(rename = "imgName")]
    pub file_name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveAbility {
    pub url: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilitySet {
    #[serde(rename = "passive")]
    pub passive_text: String,
    #[serde(rename = "active")]
    pub active_abilities: Vec<ActiveAbility>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemKind {
    Item,
    Weapon {
        #[serde(rename = "fireMode")]
        fire_mode: String,
    },
}

/// One table row as written to the item database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    #[serde(flatten)]
    pub asset: AssetRef,
    pub name: String,
    #[serde(rename = "desc")]
    pub description: String,
    #[serde(rename = "itemSet", default, with = "badge")]
    pub item_set: Option<AssetRef>,
    #[serde(flatten)]
    pub kind: ItemKind,
    #[serde(rename = "attackType", default, skip_serializing_if = "Option::is_none")]
    pub attack_type: Option<String>,
    #[serde(flatten)]
    pub abilities: Option<AbilitySet>,
}

impl ItemRecord {
    pub fn fire_mode(&self) -> Option<&str> {
        match &self.kind {
            ItemKind::Weapon { fire_mode } => Some(fire_mode),
            ItemKind::Item => None,
        }
    }
}

/// Item-set badges use `{name, url, slug}` instead of the primary asset's keys.
mod badge {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::AssetRef;

    #[derive(Serialize, Deserialize)]
    struct Badge {
        name: String,
        url: String,
        slug: String,
    }

    pub fn serialize<S: Serializer>(value: &Option<AssetRef>, s: S) -> Result<S::Ok, S::Error> {
        value
            .as_ref()
            .map(|a| Badge {
                name: a.file_name.clone(),
                url: a.canonical_url.clone(),
                slug: a.slug.clone(),
            })
            .serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<AssetRef>, D::Error> {
        let badge = Option::<Badge>::deserialize(d)?;
        Ok(badge.map(|b| AssetRef {
            raw_url: b.url.clone(),
            canonical_url: b.url,
            file_name: b.name,
            slug: b.slug,
        }))
    }
}

// ── Saving ──

/// Where extracted records go. Injected so the pipeline never touches the
/// filesystem itself.
pub trait RecordSink {
    fn save(&mut self, target: &Path, records: &[ItemRecord]) -> Result<()>;
}

/// Pretty JSON written through a `.tmp` sibling and renamed into place.
pub struct JsonFileSink;

impl RecordSink for JsonFileSink {
    fn save(&mut self, target: &Path, records: &[ItemRecord]) -> Result<()> {
        if let Some(dir) = target.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let tmp = tmp_path(target);
        let json = serde_json::to_string_pretty(records)?;
        fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
        if let Err(e) = fs::rename(&tmp, target) {
            let _ = fs::remove_file(&tmp);
            return Err(e).with_context(|| format!("Failed to move {} into place", target.display()));
        }
        Ok(())
    }
}

fn tmp_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

pub fn load(path: &Path) -> Result<Vec<ItemRecord>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid item database {}", path.display()))
}

// ── Stats ──

#[derive(Debug, Default, PartialEq, Eq)]
pub struct DbStats {
    pub total: usize,
    pub items: usize,
    pub weapons: usize,
    pub with_item_set: usize,
    pub with_abilities: usize,
    pub active_links: usize,
}

pub fn get_stats(records: &[ItemRecord]) -> DbStats {
    let mut s = DbStats::default();
    for r in records {
        s.total += 1;
        if r.fire_mode().is_some() {
            s.weapons += 1;
        } else {
            s.items += 1;
        }
        if r.item_set.is_some() {
            s.with_item_set += 1;
        }
        if let Some(abilities) = &r.abilities {
            s.with_abilities += 1;
            s.active_links += abilities.active_abilities.len();
        }
    }
    s
}

/// `(fileName, canonicalUrl)` for every asset a record references, in record order.
pub fn asset_manifest(records: &[ItemRecord]) -> Vec<(&str, &str)> {
    records
        .iter()
        .flat_map(|r| std::iter::once(&r.asset).chain(r.item_set.as_ref()))
        .map(|a| (a.file_name.as_str(), a.canonical_url.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn asset(url: &str, name: &str, slug: &str) -> AssetRef {
        AssetRef {
            raw_url: url.into(),
            canonical_url: url.into(),
            file_name: name.into(),
            slug: slug.into(),
        }
    }

    fn plain_item() -> ItemRecord {
        ItemRecord {
            asset: asset("https://x/Foo.png", "Foo.png", "Foo"),
            name: "Foo Item".into(),
            description: "A cool item".into(),
            item_set: None,
            kind: ItemKind::Item,
            attack_type: None,
            abilities: None,
        }
    }

    fn full_weapon() -> ItemRecord {
        ItemRecord {
            asset: asset("https://x/Gun.png", "Gun.png", "Gun"),
            name: "Gun".into(),
            description: "Shoots".into(),
            item_set: Some(asset("https://x/Set.png", "Set.png", "Set")),
            kind: ItemKind::Weapon {
                fire_mode: "Auto".into(),
            },
            attack_type: Some("Ranged".into()),
            abilities: Some(AbilitySet {
                passive_text: "Deals poison".into(),
                active_abilities: vec![ActiveAbility {
                    url: "/wiki/Venom".into(),
                    name: "Venom".into(),
                }],
            }),
        }
    }

    #[test]
    fn item_serializes_without_optional_keys() {
        let v = serde_json::to_value(plain_item()).unwrap();
        assert_eq!(
            v,
            json!({
                "imgUrl": "https://x/Foo.png",
                "imgName": "Foo.png",
                "slug": "Foo",
                "name": "Foo Item",
                "desc": "A cool item",
                "itemSet": null,
                "type": "item"
            })
        );
    }

    #[test]
    fn weapon_serializes_every_key() {
        let v = serde_json::to_value(full_weapon()).unwrap();
        assert_eq!(v["type"], "weapon");
        assert_eq!(v["fireMode"], "Auto");
        assert_eq!(v["attackType"], "Ranged");
        assert_eq!(v["passive"], "Deals poison");
        assert_eq!(v["active"], json!([{ "url": "/wiki/Venom", "name": "Venom" }]));
        assert_eq!(v["itemSet"], json!({ "name": "Set.png", "url": "https://x/Set.png", "slug": "Set" }));
    }

    #[test]
    fn loads_what_it_writes() {
        let records = vec![plain_item(), full_weapon()];
        let text = serde_json::to_string(&records).unwrap();
        let back: Vec<ItemRecord> = serde_json::from_str(&text).unwrap();
        assert_eq!(back[0].abilities, None);
        assert_eq!(back[0].kind, ItemKind::Item);
        assert_eq!(back[1].fire_mode(), Some("Auto"));
        assert_eq!(back[1].abilities, records[1].abilities);
        assert_eq!(back[1].item_set.as_ref().map(|a| a.slug.as_str()), Some("Set"));
    }

    #[test]
    fn loads_records_without_item_set_key() {
        let back: Vec<ItemRecord> = serde_json::from_str(
            r#"[{"imgUrl": "https://x/A.png", "imgName": "A.png", "slug": "A",
                 "name": "A", "desc": "d", "type": "weapon", "fireMode": "Semi"}]"#,
        )
        .unwrap();
        assert!(back[0].item_set.is_none());
        assert_eq!(back[0].fire_mode(), Some("Semi"));
        assert!(back[0].attack_type.is_none());
    }

    #[test]
    fn file_sink_replaces_target() {
        let dir = std::env::temp_dir().join(format!("neondb-sink-{}", std::process::id()));
        let target = dir.join("wiki").join("items.json");
        JsonFileSink.save(&target, &[plain_item()]).unwrap();
        JsonFileSink.save(&target, &[plain_item(), full_weapon()]).unwrap();
        let back = load(&target).unwrap();
        assert_eq!(back.len(), 2);
        assert!(!tmp_path(&target).exists());
        let text = fs::read_to_string(&target).unwrap();
        assert!(text.starts_with("[\n  {"));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn failed_rename_leaves_no_tmp_file() {
        let dir = std::env::temp_dir().join(format!("neondb-rename-{}", std::process::id()));
        // A non-empty directory at the target path makes the rename fail
        let target = dir.join("items.json");
        fs::create_dir_all(target.join("occupied")).unwrap();
        let err = JsonFileSink.save(&target, &[plain_item()]).unwrap_err();
        assert!(err.to_string().contains("into place"));
        assert!(!tmp_path(&target).exists());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn stats_and_manifest() {
        let records = vec![plain_item(), full_weapon()];
        let s = get_stats(&records);
        assert_eq!(
            s,
            DbStats {
                total: 2,
                items: 1,
                weapons: 1,
                with_item_set: 1,
                with_abilities: 1,
                active_links: 1,
            }
        );
        assert_eq!(
            asset_manifest(&records),
            vec![
                ("Foo.png", "https://x/Foo.png"),
                ("Gun.png", "https://x/Gun.png"),
                ("Set.png", "https://x/Set.png"),
            ]
        );
    }
}
