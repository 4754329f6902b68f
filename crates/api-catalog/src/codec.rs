//! JSON encoding and decoding of catalog documents.
//!
//! Links inside a document may be relative. [`WireCodec`] carries the base
//! link they resolve against, and encodes links under that base back into
//! relative form.

use alloc::borrow::ToOwned;
use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::{CatalogEntry, CatalogError, CatalogItem, CatalogListing, DefaultsTable, EntryAttributes};

/// `kind` of a directory list document.
pub const DIRECTORY_LIST_KIND: &str = "discovery#directoryList";
/// `kind` of each item in a directory list.
pub const DIRECTORY_ITEM_KIND: &str = "discovery#directoryItem";
/// `kind` of a partial directory list (defaults and overrides).
pub const PARTIAL_LIST_KIND: &str = "discovery#partialDirectoryList";
/// `kind` of each item in a partial directory list.
pub const PARTIAL_ITEM_KIND: &str = "discovery#partialDirectoryItem";

const RELEASE_DATE_FORMAT: &str = "%Y-%m-%d";

/// One item as it is written. Field order here is the emitted order.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    icons: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    release_notes_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ranking: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    discovery_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    documentation_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    download_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tos_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    preferred: Option<bool>,
}

/// One item as it is read.
///
/// Links, icons, labels and the release date are kept as raw JSON so a value
/// of the wrong type is handled per field instead of rejecting the item.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    kind: Option<String>,
    id: Option<String>,
    name: Option<String>,
    version: Option<String>,
    title: Option<String>,
    publisher: Option<String>,
    description: Option<String>,
    icons: Option<Value>,
    labels: Option<Value>,
    release_date: Option<Value>,
    release_notes_link: Option<Value>,
    ranking: Option<i32>,
    discovery_link: Option<Value>,
    documentation_link: Option<Value>,
    download_link: Option<Value>,
    tos_link: Option<Value>,
    preferred: Option<bool>,
}

#[derive(Serialize)]
struct WireList<'a> {
    kind: &'a str,
    items: Vec<WireItem>,
}

/// Encoder and decoder for directory documents.
///
/// A codec is a plain value: build one per document (or share one for every
/// document hosted under the same base) and pass it where it is needed.
/// Nested calls cannot disturb each other's base link.
///
/// Decoding is lenient about structure and strict about dates:
/// a document of the wrong `kind` decodes to an empty listing, items with the
/// wrong `kind` or without an `id` are skipped, and malformed links are left
/// unset, but an unparsable `releaseDate` fails the whole decode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireCodec {
    base: Option<Url>,
}

impl WireCodec {
    /// A codec that only accepts absolute links and emits them unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// A codec resolving relative links against `base` and relativizing
    /// links under `base` on output.
    pub fn with_base(base: Url) -> Self {
        Self { base: Some(base) }
    }

    pub fn base(&self) -> Option<&Url> {
        self.base.as_ref()
    }

    // -- directory list ------------------------------------------------------

    /// Decode a directory list document.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Json`] if `json` is not JSON, or
    /// [`CatalogError::InvalidReleaseDate`] if any retained item carries an
    /// unparsable `releaseDate`.
    pub fn decode_listing(&self, json: &str) -> Result<CatalogListing, CatalogError> {
        let document: Value = serde_json::from_str(json)?;
        self.decode_listing_value(&document)
    }

    /// Decode a directory list from an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// See [`WireCodec::decode_listing`].
    pub fn decode_listing_value(&self, document: &Value) -> Result<CatalogListing, CatalogError> {
        let mut items = Vec::new();
        for raw in items_of(document, DIRECTORY_LIST_KIND) {
            if let Some(entry) = self.decode_entry_value(raw)? {
                items.push(CatalogItem::new(entry));
            }
        }
        Ok(CatalogListing::new(items))
    }

    /// Encode a listing as a pretty-printed directory list document.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Json`] if serialization fails.
    pub fn encode_listing(&self, listing: &CatalogListing) -> Result<String, CatalogError> {
        let document = WireList {
            kind: DIRECTORY_LIST_KIND,
            items: listing
                .iter()
                .map(|item| self.entry_to_wire(item.entry()))
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }

    // -- single entry --------------------------------------------------------

    /// Decode one directory item document.
    ///
    /// Returns `Ok(None)` when the document is not a directory item or has no
    /// `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Json`] if `json` is not JSON, or
    /// [`CatalogError::InvalidReleaseDate`] for an unparsable `releaseDate`.
    pub fn decode_entry(&self, json: &str) -> Result<Option<CatalogEntry>, CatalogError> {
        let raw: Value = serde_json::from_str(json)?;
        self.decode_entry_value(&raw)
    }

    /// Decode one directory item from an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// See [`WireCodec::decode_entry`].
    pub fn decode_entry_value(&self, raw: &Value) -> Result<Option<CatalogEntry>, CatalogError> {
        let Some(wire) = wire_item(raw, DIRECTORY_ITEM_KIND) else {
            return Ok(None);
        };
        let Some(id) = wire.id.clone() else {
            debug!(name = ?wire.name, "skipping directory item without an id");
            return Ok(None);
        };
        let attributes = self.attributes_from_wire(wire, &id)?;
        Ok(Some(CatalogEntry::new(id, attributes)))
    }

    /// Encode one entry as a pretty-printed directory item document.
    ///
    /// `ranking` is always written, as `0` when the entry has none.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Json`] if serialization fails.
    pub fn encode_entry(&self, entry: &CatalogEntry) -> Result<String, CatalogError> {
        Ok(serde_json::to_string_pretty(&self.entry_to_wire(entry))?)
    }

    // -- partial list (defaults and overrides) -------------------------------

    /// Decode a partial directory list into bare attribute sets.
    ///
    /// Items need the partial item `kind` and a `name`; everything else is
    /// optional and `id` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Json`] if `json` is not JSON, or
    /// [`CatalogError::InvalidReleaseDate`] for an unparsable `releaseDate`.
    pub fn decode_partial_listing(&self, json: &str) -> Result<Vec<EntryAttributes>, CatalogError> {
        let document: Value = serde_json::from_str(json)?;
        let mut sets = Vec::new();
        for raw in items_of(&document, PARTIAL_LIST_KIND) {
            let Some(wire) = wire_item(raw, PARTIAL_ITEM_KIND) else {
                continue;
            };
            let Some(name) = wire.name.clone() else {
                debug!(id = ?wire.id, "skipping partial item without a name");
                continue;
            };
            sets.push(self.attributes_from_wire(wire, &name)?);
        }
        Ok(sets)
    }

    /// Encode attribute sets as a pretty-printed partial directory list.
    ///
    /// Unlike [`WireCodec::encode_entry`], an absent `ranking` stays absent,
    /// so re-reading the document never introduces a ranking override.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Json`] if serialization fails.
    pub fn encode_partial_listing<'a>(
        &self,
        sets: impl IntoIterator<Item = &'a EntryAttributes>,
    ) -> Result<String, CatalogError> {
        let document = WireList {
            kind: PARTIAL_LIST_KIND,
            items: sets
                .into_iter()
                .map(|attrs| WireItem {
                    kind: Some(PARTIAL_ITEM_KIND.to_owned()),
                    ..self.attributes_to_wire(attrs)
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }

    /// Decode a partial directory list straight into a [`DefaultsTable`].
    ///
    /// # Errors
    ///
    /// See [`WireCodec::decode_partial_listing`].
    pub fn decode_defaults(&self, json: &str) -> Result<DefaultsTable, CatalogError> {
        Ok(DefaultsTable::from_attributes(self.decode_partial_listing(json)?))
    }

    /// Encode a [`DefaultsTable`] as a partial directory list.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Json`] if serialization fails.
    pub fn encode_defaults(&self, table: &DefaultsTable) -> Result<String, CatalogError> {
        self.encode_partial_listing(table.iter())
    }

    // -- field mapping -------------------------------------------------------

    fn attributes_from_wire(
        &self,
        wire: RawItem,
        label: &str,
    ) -> Result<EntryAttributes, CatalogError> {
        let release_date = wire
            .release_date
            .map(|value| parse_release_date(value, label))
            .transpose()?;

        let mut icon_links = BTreeMap::new();
        match wire.icons {
            Some(Value::Object(icons)) => {
                for (key, raw) in icons {
                    if let Some(link) = self.resolve_link("icons", raw) {
                        icon_links.insert(key, link);
                    }
                }
            }
            Some(other) => warn!(icons = %other, "ignoring icons that are not an object"),
            None => {}
        }

        Ok(EntryAttributes {
            name: wire.name,
            version: wire.version,
            display_name: wire.title,
            publisher: wire.publisher,
            description: wire.description,
            icon_links,
            labels: labels_from_wire(wire.labels),
            release_date,
            release_notes_link: wire
                .release_notes_link
                .and_then(|raw| self.resolve_link("releaseNotesLink", raw)),
            ranking: wire.ranking,
            discovery_link: wire
                .discovery_link
                .and_then(|raw| self.resolve_link("discoveryLink", raw)),
            documentation_link: wire
                .documentation_link
                .and_then(|raw| self.resolve_link("documentationLink", raw)),
            download_link: wire
                .download_link
                .and_then(|raw| self.resolve_link("downloadLink", raw)),
            tos_link: wire
                .tos_link
                .and_then(|raw| self.resolve_link("tosLink", raw)),
            preferred: wire.preferred,
        })
    }

    fn entry_to_wire(&self, entry: &CatalogEntry) -> WireItem {
        WireItem {
            kind: Some(DIRECTORY_ITEM_KIND.to_owned()),
            id: Some(entry.id().to_owned()),
            ranking: Some(entry.ranking()),
            ..self.attributes_to_wire(entry.attributes())
        }
    }

    fn attributes_to_wire(&self, attrs: &EntryAttributes) -> WireItem {
        let link = |l: &Option<Url>| l.as_ref().map(|l| self.render_link(l));
        WireItem {
            kind: None,
            id: None,
            name: attrs.name.clone(),
            version: attrs.version.clone(),
            title: attrs.display_name.clone(),
            publisher: attrs.publisher.clone(),
            description: attrs.description.clone(),
            icons: attrs
                .icon_links
                .iter()
                .map(|(key, l)| (key.clone(), self.render_link(l)))
                .collect(),
            labels: attrs.labels.iter().cloned().collect(),
            release_date: attrs.release_date.map(|date| date.to_string()),
            release_notes_link: link(&attrs.release_notes_link),
            ranking: attrs.ranking,
            discovery_link: link(&attrs.discovery_link),
            documentation_link: link(&attrs.documentation_link),
            download_link: link(&attrs.download_link),
            tos_link: link(&attrs.tos_link),
            preferred: attrs.preferred,
        }
    }

    /// Resolve a link from a document, logging and dropping it if malformed.
    fn resolve_link(&self, field: &'static str, raw: Value) -> Option<Url> {
        let Value::String(raw) = raw else {
            warn!(field, link = %raw, "ignoring link that is not a string");
            return None;
        };
        let resolved = match &self.base {
            Some(base) => base.join(&raw),
            None => Url::parse(&raw),
        };
        match resolved {
            Ok(link) => Some(link),
            Err(err) => {
                warn!(field, link = %raw, %err, "ignoring malformed link");
                None
            }
        }
    }

    /// Absolute text of `link`, made relative when it starts with the base.
    fn render_link(&self, link: &Url) -> String {
        let text = link.as_str();
        if let Some(base) = &self.base
            && let Some(rest) = text.strip_prefix(base.as_str())
        {
            let rest = rest.strip_prefix('/').unwrap_or(rest);
            // A colon in the first segment would read back as a scheme.
            if rest.split('/').next().is_some_and(|segment| segment.contains(':')) {
                return format!("./{rest}");
            }
            return rest.to_owned();
        }
        text.to_owned()
    }
}

/// The `items` array of `document` if its `kind` is `kind`, otherwise empty.
fn items_of<'v>(document: &'v Value, kind: &str) -> &'v [Value] {
    if document.get("kind").and_then(Value::as_str) != Some(kind) {
        debug!(expected = kind, "document kind mismatch, treating as empty");
        return &[];
    }
    document
        .get("items")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Deserialize `raw` as an item, keeping it only if its `kind` is `kind`.
fn wire_item(raw: &Value, kind: &str) -> Option<RawItem> {
    let wire = match RawItem::deserialize(raw) {
        Ok(wire) => wire,
        Err(err) => {
            debug!(%err, "skipping malformed item");
            return None;
        }
    };
    if wire.kind.as_deref() != Some(kind) {
        debug!(kind = ?wire.kind, expected = kind, "skipping item of another kind");
        return None;
    }
    Some(wire)
}

/// String labels of `raw`; anything else in the array is logged and dropped.
fn labels_from_wire(raw: Option<Value>) -> BTreeSet<String> {
    match raw {
        Some(Value::Array(values)) => values
            .into_iter()
            .filter_map(|value| match value {
                Value::String(label) => Some(label),
                other => {
                    warn!(label = %other, "ignoring label that is not a string");
                    None
                }
            })
            .collect(),
        Some(other) => {
            warn!(labels = %other, "ignoring labels that are not an array");
            BTreeSet::new()
        }
        None => BTreeSet::new(),
    }
}

/// A date of any other JSON type is parsed from its JSON text, which never
/// matches the format, so it fails like any other malformed date.
fn parse_release_date(value: Value, label: &str) -> Result<NaiveDate, CatalogError> {
    let value = match value {
        Value::String(text) => text,
        other => other.to_string(),
    };
    match NaiveDate::parse_from_str(&value, RELEASE_DATE_FORMAT) {
        Ok(date) => Ok(date),
        Err(source) => Err(CatalogError::InvalidReleaseDate {
            id: label.to_owned(),
            value,
            source,
        }),
    }
}

/// Decode an icon cache index: a flat map from icon key to cached link.
///
/// # Errors
///
/// Returns [`CatalogError::Json`] if `json` is not a JSON object of strings.
pub fn decode_icon_cache(json: &str) -> Result<BTreeMap<String, String>, CatalogError> {
    Ok(serde_json::from_str(json)?)
}

/// Encode an icon cache index, keys in sorted order.
///
/// # Errors
///
/// Returns [`CatalogError::Json`] if serialization fails.
pub fn encode_icon_cache(cache: &BTreeMap<String, String>) -> Result<String, CatalogError> {
    Ok(serde_json::to_string_pretty(cache)?)
}
