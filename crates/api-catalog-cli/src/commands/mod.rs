use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use api_catalog::{CatalogListing, DefaultsTable, WireCodec};
use api_catalog_config::MergeKey;

pub mod build;
pub mod merge;
pub mod normalize;
pub mod overlay;
pub mod rewrite;
pub mod show;

/// Read and decode one directory list file.
pub fn read_listing(codec: &WireCodec, path: &Path) -> Result<CatalogListing> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let listing = codec
        .decode_listing(&content)
        .with_context(|| format!("failed to decode {}", path.display()))?;
    tracing::debug!(path = %path.display(), items = listing.len(), "read listing");
    Ok(listing)
}

/// Read every partial directory list in `paths` into one table.
///
/// Earlier files take precedence: when two files address the same name (or
/// name and version), the set from the earlier file is kept.
pub fn read_overlays(codec: &WireCodec, paths: &[PathBuf]) -> Result<DefaultsTable> {
    let mut sets = Vec::new();
    for path in paths.iter().rev() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let decoded = codec
            .decode_partial_listing(&content)
            .with_context(|| format!("failed to decode {}", path.display()))?;
        sets.extend(decoded);
    }
    Ok(DefaultsTable::from_attributes(sets))
}

/// Fold `listings` left to right, the accumulated listing winning every
/// collision.
pub fn merge_all(listings: impl IntoIterator<Item = CatalogListing>, key: MergeKey) -> CatalogListing {
    let mut listings = listings.into_iter();
    let Some(first) = listings.next() else {
        return CatalogListing::default();
    };
    listings.fold(first, |merged, next| match key {
        MergeKey::Id => merged.merge_by_id(&next),
        MergeKey::Name => merged.merge_by_name(&next),
    })
}

/// Write `content` to `output`, or to stdout when no path is given.
pub fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create {}", dir.display()))?;
            }
            fs::write(path, format!("{content}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote catalog");
        }
        None => println!("{content}"),
    }
    Ok(())
}
