use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_CONFIG_PATH: &str = "neondb/conf.json";

/// Shared settings file. The scraper only reads the database paths and the
/// wiki base URL; the rest belongs to the viewer and translation stages and is
/// carried so `config` can show the whole resolved file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_item_db: Vec<PathBuf>,
    pub item_db: Vec<PathBuf>,
    pub abyss_db: PathBuf,
    pub wiki_base_url: Option<String>,

    #[serde(flatten)]
    pub viewer: ViewerSettings,

    pub translate: bool,
    pub translator_model: String,
    pub translator_lang: String,
    pub save_translated_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub bgcolor: String,
    pub fgcolor: String,
    pub small_font: String,
    pub large_font: String,
    pub position: String,
    pub decorated: bool,
    pub quit: String,
    pub clear: String,
    pub column_size: u32,
    pub topmost: bool,
    pub threshold: f64,
    pub trim_to_alpha: bool,
    pub size_ratio: f64,
    pub small_size_ratio: f64,
    pub use_colors: bool,
    pub language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_item_db: vec!["neondb/wiki/items.json".into(), "neondb/wiki/weapons.json".into()],
            item_db: Vec::new(),
            abyss_db: "neondb/abyssexplorer/items.json".into(),
            wiki_base_url: None,
            viewer: ViewerSettings::default(),
            translate: false,
            translator_model: "facebook/nllb-200-distilled-600M".into(),
            translator_lang: String::new(),
            save_translated_path: None,
        }
    }
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            bgcolor: "black".into(),
            fgcolor: "white".into(),
            small_font: "helvetica 12".into(),
            large_font: "helvetica 14".into(),
            position: "+0+0".into(),
            decorated: false,
            quit: "<Button-1>".into(),
            clear: "<Enter>".into(),
            column_size: 150,
            topmost: true,
            threshold: 0.7,
            trim_to_alpha: true,
            size_ratio: 1.3548,
            small_size_ratio: 0.5,
            use_colors: true,
            language: "en".into(),
        }
    }
}

impl Settings {
    /// Load from `path`; a missing file means defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read config {}", path.display()))
            }
        };
        Self::parse(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.viewer.threshold) {
            bail!("threshold must be between 0 and 1, got {}", self.viewer.threshold);
        }
        if self.translate {
            if self.translator_model.trim().is_empty() {
                bail!("translator_model is required when translate is enabled");
            }
            if self.translator_lang.trim().is_empty() {
                bail!("translator_lang is required when translate is enabled");
            }
        }
        Ok(())
    }
}
