use std::path::PathBuf;

use anyhow::{Context, Result};
use api_catalog::{WireCodec, parse_link};
use bpaf::Bpaf;

use super::{read_listing, write_output};

#[derive(Debug, Clone, Bpaf)]
pub struct RewriteArgs {
    /// Base the links currently live under
    #[bpaf(long("from"), argument("URL"))]
    pub from: String,

    /// Base to move the links to
    #[bpaf(long("to"), argument("URL"))]
    pub to: String,

    /// Write the result to FILE instead of stdout
    #[bpaf(short('o'), long("output"), argument("FILE"))]
    pub output: Option<PathBuf>,

    /// Directory list to relocate
    #[bpaf(positional("FILE"))]
    pub file: PathBuf,
}

pub fn render(args: &RewriteArgs, codec: &WireCodec) -> Result<String> {
    let from = parse_link(&args.from).context("invalid --from")?;
    let to = parse_link(&args.to).context("invalid --to")?;
    let listing = read_listing(codec, &args.file)?;
    codec
        .encode_listing(&listing.rewrite_urls(&from, &to))
        .context("failed to encode listing")
}

pub fn run(args: &RewriteArgs, codec: &WireCodec) -> Result<()> {
    write_output(&render(args, codec)?, args.output.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::write_listing;

    #[test]
    fn moves_links_under_the_mirror() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let file = write_listing(tmp.path(), "catalog.json", &[("tasks:v1", "tasks", "v1", 0)]);
        let args = RewriteArgs {
            from: "https://apis.test/discovery/".into(),
            to: "http://mirror.test/cache/".into(),
            output: None,
            file,
        };
        let value: serde_json::Value = serde_json::from_str(&render(&args, &WireCodec::new())?)?;
        assert_eq!(
            value["items"][0]["discoveryLink"],
            "http://mirror.test/cache/tasks/v1"
        );
        Ok(())
    }

    #[test]
    fn rejects_relative_bases() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let file = write_listing(tmp.path(), "catalog.json", &[("x:1", "x", "1", 0)]);
        let args = RewriteArgs {
            from: "discovery/".into(),
            to: "http://mirror.test/".into(),
            output: None,
            file,
        };
        let err = render(&args, &WireCodec::new()).expect_err("relative base");
        assert!(format!("{err:#}").contains("invalid --from"));
        Ok(())
    }
}
