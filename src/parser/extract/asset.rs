use std::sync::LazyLock;

use regex::Regex;

use crate::db::AssetRef;

static REVISION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/revision/.*$").unwrap());

/// Strip the CDN revision suffix: `.../Foo.png/revision/latest?cb=1` → `.../Foo.png`.
pub fn canonical_url(url: &str) -> &str {
    match REVISION_RE.find(url) {
        Some(m) => &url[..m.start()],
        None => url,
    }
}

/// Last path segment of the canonical URL. A URL without `/` is its own file name.
pub fn file_name(url: &str) -> &str {
    let canonical = canonical_url(url);
    canonical.rsplit('/').next().unwrap_or(canonical)
}

/// File name without its final `.ext`.
pub fn slug(url: &str) -> &str {
    let name = file_name(url);
    match name.rfind('.') {
        Some(dot) => &name[..dot],
        None => name,
    }
}

impl AssetRef {
    pub fn from_url(raw_url: &str) -> Self {
        AssetRef {
            raw_url: raw_url.to_string(),
            canonical_url: canonical_url(raw_url).to_string(),
            file_name: file_name(raw_url).to_string(),
            slug: slug(raw_url).to_string(),
        }
    }

    /// Absent in, absent out: lets optional badges go through without branching.
    pub fn from_optional(raw_url: Option<&str>) -> Option<Self> {
        raw_url.map(Self::from_url)
    }
}
