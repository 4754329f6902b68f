use std::path::PathBuf;

use anyhow::{Context, Result};
use api_catalog::WireCodec;
use bpaf::Bpaf;

use super::{read_listing, write_output};

#[derive(Debug, Clone, Bpaf)]
pub struct NormalizeArgs {
    /// Write the result to FILE instead of stdout
    #[bpaf(short('o'), long("output"), argument("FILE"))]
    pub output: Option<PathBuf>,

    /// Directory list to normalize
    #[bpaf(positional("FILE"))]
    pub file: PathBuf,
}

/// Decode and re-encode: items sorted by rank, links under the base made
/// relative, unusable items dropped.
pub fn render(args: &NormalizeArgs, codec: &WireCodec) -> Result<String> {
    let listing = read_listing(codec, &args.file)?;
    codec
        .encode_listing(&listing)
        .context("failed to encode listing")
}

pub fn run(args: &NormalizeArgs, codec: &WireCodec) -> Result<()> {
    write_output(&render(args, codec)?, args.output.as_deref())
}
