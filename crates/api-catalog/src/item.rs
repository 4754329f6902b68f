use alloc::format;
use alloc::sync::Arc;
use core::ops::Deref;

use url::Url;

use crate::{CatalogEntry, CatalogError, EntryAttributes};

/// An immutable, cheaply cloneable handle to a [`CatalogEntry`] held by a
/// listing.
///
/// To change an item, take a copy with [`CatalogItem::to_entry`], mutate it
/// and wrap the result in a new item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    entry: Arc<CatalogEntry>,
}

impl CatalogItem {
    pub fn new(entry: CatalogEntry) -> Self {
        Self {
            entry: Arc::new(entry),
        }
    }

    pub fn entry(&self) -> &CatalogEntry {
        &self.entry
    }

    /// Owned deep copy of the wrapped entry.
    pub fn to_entry(&self) -> CatalogEntry {
        CatalogEntry::clone(&self.entry)
    }

    /// Relocate every link that lives under `original` to the same relative
    /// position under `target`.
    ///
    /// A link is moved when its scheme equals `original`'s scheme and its
    /// path starts with `original`'s path. Hosts are not compared. Other
    /// links are kept as they are. `self` is left untouched.
    #[must_use]
    pub fn rewrite_urls(&self, original: &Url, target: &Url) -> Self {
        let attributes = self
            .entry
            .attributes()
            .map_links(|link| rewrite_link(link, original, target));
        Self::new(CatalogEntry::new(self.entry.id(), attributes))
    }
}

/// Move a single link from under `original` to under `target`. See
/// [`CatalogItem::rewrite_urls`].
pub fn rewrite_link(link: &Url, original: &Url, target: &Url) -> Url {
    if link.scheme() != original.scheme() {
        return link.clone();
    }
    let Some(suffix) = link.path().strip_prefix(original.path()) else {
        return link.clone();
    };

    // `./` keeps a suffix such as `a:b` from parsing as a scheme.
    let relative = format!("./{}", suffix.trim_start_matches('/'));
    match target.join(&relative) {
        Ok(mut rewritten) => {
            rewritten.set_query(link.query());
            rewritten.set_fragment(link.fragment());
            rewritten
        }
        Err(err) => {
            tracing::warn!(%link, %target, %err, "cannot relocate link, keeping it");
            link.clone()
        }
    }
}

impl From<CatalogEntry> for CatalogItem {
    fn from(entry: CatalogEntry) -> Self {
        Self::new(entry)
    }
}

impl TryFrom<Option<CatalogEntry>> for CatalogItem {
    type Error = CatalogError;

    fn try_from(entry: Option<CatalogEntry>) -> Result<Self, Self::Error> {
        entry.map(Self::new).ok_or(CatalogError::MissingEntry)
    }
}

impl Deref for CatalogItem {
    type Target = CatalogEntry;

    fn deref(&self) -> &CatalogEntry {
        &self.entry
    }
}

impl AsRef<EntryAttributes> for CatalogItem {
    fn as_ref(&self) -> &EntryAttributes {
        self.entry.attributes()
    }
}
