use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use api_catalog::WireCodec;
use api_catalog_config::Config;
use bpaf::Bpaf;

use super::{merge_all, read_listing, read_overlays, write_output};

#[derive(Debug, Clone, Bpaf)]
pub struct BuildArgs {
    /// Write the catalog to FILE instead of the configured output
    #[bpaf(short('o'), long("output"), argument("FILE"))]
    pub output: Option<PathBuf>,
}

/// Merge the configured sources, apply defaults and overrides, then relocate
/// links to the mirror if one is set.
pub fn render(codec: &WireCodec, config: &Config) -> Result<String> {
    if config.sources.is_empty() {
        bail!("no sources configured, add `sources` to api-catalog.toml");
    }

    let listings = config
        .sources
        .iter()
        .map(|path| read_listing(codec, path))
        .collect::<Result<Vec<_>>>()?;
    let mut catalog = merge_all(listings, config.merge_key());

    let defaults = read_overlays(codec, &config.defaults)?;
    let overrides = read_overlays(codec, &config.overrides)?;
    if !defaults.is_empty() || !overrides.is_empty() {
        catalog = catalog.overlay(&defaults, &overrides);
    }

    if let Some((from, to)) = config.mirror_bases().context("invalid [mirror]")? {
        tracing::info!(%from, %to, "relocating links");
        catalog = catalog.rewrite_urls(&from, &to);
    }

    tracing::info!(
        sources = config.sources.len(),
        items = catalog.len(),
        "built catalog"
    );
    codec
        .encode_listing(&catalog)
        .context("failed to encode catalog")
}

pub fn run(args: &BuildArgs, codec: &WireCodec, config: &Config) -> Result<()> {
    let output = args.output.as_deref().or(config.output.as_deref());
    write_output(&render(codec, config)?, output)
}
