use std::path::PathBuf;

use anyhow::{Context, Result};
use api_catalog::WireCodec;
use bpaf::Bpaf;

use super::{read_listing, read_overlays, write_output};

#[derive(Debug, Clone, Bpaf)]
pub struct OverlayArgs {
    /// Partial directory list whose values fill gaps; repeatable, earlier
    /// files win
    #[bpaf(long("defaults"), argument("FILE"))]
    pub defaults: Vec<PathBuf>,

    /// Partial directory list whose values replace catalog values;
    /// repeatable, earlier files win
    #[bpaf(long("overrides"), argument("FILE"))]
    pub overrides: Vec<PathBuf>,

    /// Write the result to FILE instead of stdout
    #[bpaf(short('o'), long("output"), argument("FILE"))]
    pub output: Option<PathBuf>,

    /// Directory list to overlay
    #[bpaf(positional("FILE"))]
    pub file: PathBuf,
}

pub fn render(args: &OverlayArgs, codec: &WireCodec) -> Result<String> {
    let listing = read_listing(codec, &args.file)?;
    let defaults = read_overlays(codec, &args.defaults)?;
    let overrides = read_overlays(codec, &args.overrides)?;
    tracing::debug!(
        defaults = defaults.len(),
        overrides = overrides.len(),
        "applying overlays"
    );
    codec
        .encode_listing(&listing.overlay(&defaults, &overrides))
        .context("failed to encode listing")
}

pub fn run(args: &OverlayArgs, codec: &WireCodec) -> Result<()> {
    write_output(&render(args, codec)?, args.output.as_deref())
}
