use alloc::format;
use alloc::string::String;

use crate::EntryAttributes;

/// Build the conventional identifier for an API version, `"<name>:<version>"`.
pub fn entry_id(name: &str, version: &str) -> String {
    format!("{name}:{version}")
}

/// One API version in a catalog: an identifier plus its attributes.
///
/// The identifier is fixed at construction. Uniqueness is only enforced by
/// the index of the [`CatalogListing`](crate::CatalogListing) that ends up
/// holding the entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    id: String,
    attributes: EntryAttributes,
}

impl CatalogEntry {
    pub fn new(id: impl Into<String>, attributes: EntryAttributes) -> Self {
        Self {
            id: id.into(),
            attributes,
        }
    }

    /// Build an entry identified by its own name and version.
    ///
    /// Returns `None` unless both are present.
    pub fn from_attributes(attributes: EntryAttributes) -> Option<Self> {
        let id = entry_id(attributes.name.as_deref()?, attributes.version.as_deref()?);
        Some(Self::new(id, attributes))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn attributes(&self) -> &EntryAttributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut EntryAttributes {
        &mut self.attributes
    }

    pub fn into_attributes(self) -> EntryAttributes {
        self.attributes
    }

    pub fn name(&self) -> Option<&str> {
        self.attributes.name.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.attributes.version.as_deref()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.attributes.display_name()
    }

    pub fn ranking(&self) -> i32 {
        self.attributes.ranking()
    }

    pub fn is_preferred(&self) -> bool {
        self.attributes.is_preferred()
    }

    /// Deep copy of this entry under a different identifier, e.g. to
    /// materialize an installed copy next to the catalog original.
    #[must_use]
    pub fn with_id(&self, id: impl Into<String>) -> Self {
        Self::new(id, self.attributes.clone())
    }

    /// Fill missing attributes from `defaults`. See
    /// [`EntryAttributes::apply_defaults`].
    pub fn apply_defaults(&mut self, defaults: &EntryAttributes) {
        self.attributes.apply_defaults(defaults);
    }

    /// Overwrite attributes with everything `overrides` specifies. See
    /// [`EntryAttributes::apply_overrides`].
    pub fn apply_overrides(&mut self, overrides: &EntryAttributes) {
        self.attributes.apply_overrides(overrides);
    }
}

impl AsRef<EntryAttributes> for CatalogEntry {
    fn as_ref(&self) -> &EntryAttributes {
        &self.attributes
    }
}
