use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use api_catalog::WireCodec;
use api_catalog_config::{Config, MergeKey};
use bpaf::Bpaf;

use super::{merge_all, read_listing, write_output};

#[derive(Debug, Clone, Bpaf)]
pub struct MergeArgs {
    /// Match entries by identifier or by API name; defaults to the configured
    /// merge-key
    #[bpaf(long("by"), argument("id|name"))]
    pub by: Option<MergeKey>,

    /// Write the result to FILE instead of stdout
    #[bpaf(short('o'), long("output"), argument("FILE"))]
    pub output: Option<PathBuf>,

    /// Directory lists to merge; earlier files win collisions
    #[bpaf(positional("FILE"))]
    pub files: Vec<PathBuf>,
}

pub fn render(args: &MergeArgs, codec: &WireCodec, config: &Config) -> Result<String> {
    if args.files.is_empty() {
        bail!("merge needs at least one FILE");
    }
    let key = args.by.unwrap_or_else(|| config.merge_key());
    let listings = args
        .files
        .iter()
        .map(|path| read_listing(codec, path))
        .collect::<Result<Vec<_>>>()?;
    let merged = merge_all(listings, key);
    tracing::info!(%key, items = merged.len(), "merged listings");
    codec
        .encode_listing(&merged)
        .context("failed to encode listing")
}

pub fn run(args: &MergeArgs, codec: &WireCodec, config: &Config) -> Result<()> {
    write_output(&render(args, codec, config)?, args.output.as_deref())
}
