use alloc::string::String;
use alloc::vec::Vec;
use std::collections::HashMap;

use indexmap::IndexMap;
use url::Url;

use crate::{CatalogItem, DefaultsTable, by_rank, entry_id};

/// An ordered, indexed set of catalog items.
///
/// Items are kept in [`by_rank`] order regardless of the order they were
/// supplied in. Two indices are derived from that sequence: identifier to
/// item, and name to every item with that name (in rank order).
///
/// The only mutator is [`CatalogListing::set_items`], which replaces the
/// whole set and rebuilds both indices. There is no locking; sharing a
/// listing across threads while calling `set_items` needs external
/// synchronization.
#[derive(Debug, Clone, Default)]
pub struct CatalogListing {
    items: Vec<CatalogItem>,
    by_id: HashMap<String, CatalogItem>,
    by_name: IndexMap<String, Vec<CatalogItem>>,
}

impl CatalogListing {
    pub fn new(items: impl IntoIterator<Item = CatalogItem>) -> Self {
        let mut listing = Self::default();
        listing.set_items(items);
        listing
    }

    /// Replace every item, sort, and reindex.
    ///
    /// When two items share an identifier both stay in the sequence, but the
    /// identifier index keeps the one that sorts last.
    pub fn set_items(&mut self, items: impl IntoIterator<Item = CatalogItem>) {
        let mut items: Vec<CatalogItem> = items.into_iter().collect();
        items.sort_by(by_rank);

        let mut by_id = HashMap::with_capacity(items.len());
        let mut by_name: IndexMap<String, Vec<CatalogItem>> = IndexMap::new();
        for item in &items {
            if let Some(previous) = by_id.insert(item.id().to_owned(), item.clone()) {
                tracing::debug!(id = previous.id(), "duplicate identifier, keeping later item");
            }
            if let Some(name) = item.name() {
                by_name.entry(name.to_owned()).or_default().push(item.clone());
            }
        }

        self.items = items;
        self.by_id = by_id;
        self.by_name = by_name;
    }

    /// Items in rank order.
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn iter(&self) -> core::slice::Iter<'_, CatalogItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Distinct API names, in the rank order of their first item.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    pub fn get(&self, id: &str) -> Option<&CatalogItem> {
        self.by_id.get(id)
    }

    /// Look up `name` at `version` through its conventional identifier.
    pub fn get_version(&self, name: &str, version: &str) -> Option<&CatalogItem> {
        self.get(&entry_id(name, version))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Whether any item reachable through the identifier index is named
    /// `name`. An item shadowed by a duplicate identifier does not count.
    pub fn contains_name(&self, name: &str) -> bool {
        self.by_id.values().any(|item| item.name() == Some(name))
    }

    /// Every item named `name`, in rank order.
    pub fn get_by_name(&self, name: &str) -> &[CatalogItem] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// The first item named `name`, in rank order, whose `preferred` flag is
    /// set.
    pub fn get_preferred_by_name(&self, name: &str) -> Option<&CatalogItem> {
        self.get_by_name(name).iter().find(|item| item.is_preferred())
    }

    /// Build a new listing by passing every item through `transform`.
    ///
    /// `transform` also receives the listing under construction. It is empty
    /// and unindexed while the transform runs, so use it for identity only
    /// and never query it. Items for which `transform` returns `None` are
    /// dropped.
    #[must_use]
    pub fn apply_mapping<F>(&self, mut transform: F) -> CatalogListing
    where
        F: FnMut(&CatalogItem, &CatalogListing) -> Option<CatalogItem>,
    {
        let mut mapped = CatalogListing::default();
        let items: Vec<CatalogItem> = self
            .items
            .iter()
            .filter_map(|item| transform(item, &mapped))
            .collect();
        mapped.set_items(items);
        mapped
    }

    /// Merge `other` into a copy of this listing, one item per name.
    ///
    /// Items from `self` win over items from `other` with the same name.
    /// Within one listing the item that sorts last for a name wins.
    #[must_use]
    pub fn merge_by_name(&self, other: &CatalogListing) -> CatalogListing {
        merge_keyed(other, self, |item| item.name().map(String::from))
    }

    /// Merge `other` into a copy of this listing, one item per identifier.
    ///
    /// Items from `self` win over items from `other` with the same
    /// identifier.
    #[must_use]
    pub fn merge_by_id(&self, other: &CatalogListing) -> CatalogListing {
        merge_keyed(other, self, |item| Some(item.id().to_owned()))
    }

    /// Fill every entry's gaps from `defaults`, then force `overrides` onto
    /// it.
    #[must_use]
    pub fn overlay(&self, defaults: &DefaultsTable, overrides: &DefaultsTable) -> CatalogListing {
        self.apply_mapping(|item, _| {
            let mut entry = item.to_entry();
            defaults.fill_defaults(&mut entry);
            overrides.force_overrides(&mut entry);
            Some(CatalogItem::new(entry))
        })
    }

    /// Relocate every item's links from `original` to `target`. See
    /// [`CatalogItem::rewrite_urls`].
    #[must_use]
    pub fn rewrite_urls(&self, original: &Url, target: &Url) -> CatalogListing {
        self.apply_mapping(|item, _| Some(item.rewrite_urls(original, target)))
    }
}

/// Key `low` then `high` into one map so `high` wins every collision.
fn merge_keyed(
    low: &CatalogListing,
    high: &CatalogListing,
    key: impl Fn(&CatalogItem) -> Option<String>,
) -> CatalogListing {
    let mut merged: IndexMap<Option<String>, CatalogItem> = IndexMap::new();
    for item in low.iter().chain(high.iter()) {
        merged.insert(key(item), item.clone());
    }
    CatalogListing::new(merged.into_values())
}

impl From<Vec<CatalogItem>> for CatalogListing {
    fn from(items: Vec<CatalogItem>) -> Self {
        Self::new(items)
    }
}

impl FromIterator<CatalogItem> for CatalogListing {
    fn from_iter<I: IntoIterator<Item = CatalogItem>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a CatalogListing {
    type Item = &'a CatalogItem;
    type IntoIter = core::slice::Iter<'a, CatalogItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
