use thiserror::Error;

/// Errors raised by the catalog model and the wire codec.
///
/// Only the strict failure classes surface here. A document of the wrong
/// shape, an item with the wrong `kind` or no `id`, and an unparsable link
/// field are all tolerated and logged instead.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The input is not JSON at all.
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A `releaseDate` value is not an ISO `YYYY-MM-DD` date. This aborts the
    /// whole decode.
    #[error("entry `{id}` has an invalid release date `{value}`: {source}")]
    InvalidReleaseDate {
        id: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A [`CatalogItem`](crate::CatalogItem) was requested without an entry.
    #[error("a catalog item requires an entry")]
    MissingEntry,

    /// A link supplied by the caller (not by a catalog document) is malformed.
    #[error("invalid link `{link}`: {source}")]
    InvalidLink {
        link: String,
        #[source]
        source: url::ParseError,
    },
}

/// Parse an absolute link supplied by a caller, such as a base link or a
/// mirror root.
///
/// # Errors
///
/// Returns [`CatalogError::InvalidLink`] if `link` is not an absolute URL.
pub fn parse_link(link: &str) -> Result<url::Url, CatalogError> {
    url::Url::parse(link).map_err(|source| CatalogError::InvalidLink {
        link: link.to_owned(),
        source,
    })
}
