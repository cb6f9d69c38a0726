use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::info;

use crate::db::ItemRecord;
use crate::parser;

/// Records extracted from one saved wiki page.
#[derive(Debug)]
pub struct PageResult {
    pub path: PathBuf,
    pub records: Vec<ItemRecord>,
    pub skipped: usize,
}

/// Parse saved HTML pages in parallel. Results keep the input order.
pub fn process_pages(paths: &[PathBuf], base_url: Option<&str>) -> Result<Vec<PageResult>> {
    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pages")?
            .progress_chars("#>-"),
    );

    let results = paths
        .par_iter()
        .map(|path| {
            let page = process_file(path, base_url);
            pb.inc(1);
            page
        })
        .collect::<Result<Vec<_>>>();

    pb.finish_and_clear();
    results
}

fn process_file(path: &Path, base_url: Option<&str>) -> Result<PageResult> {
    let html = fs::read_to_string(path).with_context(|| format!("Failed to read page {}", path.display()))?;
    let page = parser::process_page(&html, base_url);
    info!(
        "{}: {} records, {} rows skipped",
        path.display(),
        page.records.len(),
        page.skipped
    );
    Ok(PageResult {
        path: path.to_path_buf(),
        records: page.records,
        skipped: page.skipped,
    })
}
