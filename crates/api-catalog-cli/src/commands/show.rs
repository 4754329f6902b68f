use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use api_catalog::{CatalogListing, WireCodec};
use bpaf::Bpaf;

use super::read_listing;

#[derive(Debug, Clone, Bpaf)]
pub struct ShowArgs {
    /// Show only this version of the API
    #[bpaf(long("version"), argument("VERSION"))]
    pub version: Option<String>,

    /// Show only the preferred version of the API
    #[bpaf(long("preferred"), switch)]
    pub preferred: bool,

    /// Directory list to look in
    #[bpaf(positional("FILE"))]
    pub file: PathBuf,

    /// API name
    #[bpaf(positional("NAME"))]
    pub name: String,
}

/// A single entry document for `--version`/`--preferred`, otherwise a
/// directory list of every version of the API in rank order.
pub fn render(args: &ShowArgs, codec: &WireCodec) -> Result<String> {
    let listing = read_listing(codec, &args.file)?;
    let name = args.name.as_str();

    let single = match (&args.version, args.preferred) {
        (Some(_), true) => bail!("--version and --preferred cannot be combined"),
        (Some(version), false) => Some(
            listing
                .get_version(name, version)
                .with_context(|| format!("no {name} {version} in {}", args.file.display()))?,
        ),
        (None, true) => Some(listing.get_preferred_by_name(name).with_context(|| {
            format!("no preferred version of {name} in {}", args.file.display())
        })?),
        (None, false) => None,
    };
    if let Some(item) = single {
        return codec
            .encode_entry(item.entry())
            .context("failed to encode entry");
    }

    let versions = listing.get_by_name(name);
    if versions.is_empty() {
        bail!("no API named {name} in {}", args.file.display());
    }
    codec
        .encode_listing(&versions.iter().cloned().collect::<CatalogListing>())
        .context("failed to encode listing")
}

pub fn run(args: &ShowArgs, codec: &WireCodec) -> Result<()> {
    println!("{}", render(args, codec)?);
    Ok(())
}
