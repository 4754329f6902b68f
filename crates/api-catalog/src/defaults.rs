use alloc::collections::BTreeMap;
use alloc::string::String;

use crate::{CatalogEntry, EntryAttributes};

/// Overlay attributes looked up by API name or by (name, version).
///
/// Attribute sets carrying both a name and a version are stored under that
/// pair; those carrying only a name apply to every version of the API. Sets
/// without a name cannot be addressed and are dropped. When two sets land on
/// the same key the later one replaces the earlier one outright.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultsTable {
    by_name: BTreeMap<String, EntryAttributes>,
    by_version: BTreeMap<(String, String), EntryAttributes>,
}

impl DefaultsTable {
    pub fn from_attributes(sets: impl IntoIterator<Item = EntryAttributes>) -> Self {
        let mut table = Self::default();
        for attrs in sets {
            match (attrs.name.clone(), attrs.version.clone()) {
                (Some(name), Some(version)) => {
                    table.by_version.insert((name, version), attrs);
                }
                (Some(name), None) => {
                    table.by_name.insert(name, attrs);
                }
                (None, _) => {
                    tracing::debug!(?attrs, "dropping overlay without a name");
                }
            }
        }
        table
    }

    /// Attributes that apply to every version of `name`.
    pub fn get(&self, name: &str) -> Option<&EntryAttributes> {
        self.by_name.get(name)
    }

    /// Attributes that apply to exactly `name` at `version`.
    pub fn get_version(&self, name: &str, version: &str) -> Option<&EntryAttributes> {
        self.by_version.get(&(String::from(name), String::from(version)))
    }

    pub fn len(&self) -> usize {
        self.by_name.len() + self.by_version.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty() && self.by_version.is_empty()
    }

    /// Every stored attribute set, name-level sets first, each group in key
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = &EntryAttributes> {
        self.by_name.values().chain(self.by_version.values())
    }

    /// Fill gaps in `entry` from this table.
    ///
    /// The version-specific set is applied first so that it wins over the
    /// name-level set for fields both provide.
    pub fn fill_defaults(&self, entry: &mut CatalogEntry) {
        let (versioned, named) = self.lookup(entry);
        for attrs in [versioned, named].into_iter().flatten() {
            entry.apply_defaults(attrs);
        }
    }

    /// Force this table's values onto `entry`.
    ///
    /// The name-level set is applied first and the version-specific set last,
    /// so the more specific override wins.
    pub fn force_overrides(&self, entry: &mut CatalogEntry) {
        let (versioned, named) = self.lookup(entry);
        for attrs in [named, versioned].into_iter().flatten() {
            entry.apply_overrides(attrs);
        }
    }

    fn lookup(
        &self,
        entry: &CatalogEntry,
    ) -> (Option<&EntryAttributes>, Option<&EntryAttributes>) {
        let Some(name) = entry.name() else {
            return (None, None);
        };
        let versioned = entry
            .version()
            .and_then(|version| self.get_version(name, version));
        (versioned, self.get(name))
    }
}

impl FromIterator<EntryAttributes> for DefaultsTable {
    fn from_iter<I: IntoIterator<Item = EntryAttributes>>(iter: I) -> Self {
        Self::from_attributes(iter)
    }
}
