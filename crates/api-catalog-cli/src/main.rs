#![doc = include_str!("../README.md")]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use api_catalog::{WireCodec, parse_link};
use api_catalog_config::Config;
use bpaf::Bpaf;

mod commands;
mod logging;

use commands::build::{BuildArgs, build_args};
use commands::merge::{MergeArgs, merge_args};
use commands::normalize::{NormalizeArgs, normalize_args};
use commands::overlay::{OverlayArgs, overlay_args};
use commands::rewrite::{RewriteArgs, rewrite_args};
use commands::show::{ShowArgs, show_args};
use logging::LogLevel;

/// Options shared by every command
#[derive(Debug, Clone, Bpaf)]
struct GlobalOptions {
    /// The level of logging. In order, from the most verbose to the least
    /// verbose: debug, info, warn, error.
    #[bpaf(
        long("log-level"),
        argument("none|debug|info|warn|error"),
        fallback(LogLevel::None),
        display_fallback
    )]
    log_level: LogLevel,

    /// Use this config file instead of searching for api-catalog.toml
    #[bpaf(long("config"), argument("FILE"))]
    config: Option<PathBuf>,

    /// Base link for relative item links, overriding the configured base-url
    #[bpaf(long("base-url"), argument("URL"))]
    base_url: Option<String>,
}

#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version, fallback_to_usage)]
/// Normalize, merge, overlay and relocate API directory catalogs
struct Cli {
    #[bpaf(external(global_options))]
    global: GlobalOptions,

    #[bpaf(external(commands))]
    command: Commands,
}

#[derive(Debug, Clone, Bpaf)]
enum Commands {
    #[bpaf(command("normalize"))]
    /// Decode a directory list and write it back in canonical form
    Normalize(#[bpaf(external(normalize_args))] NormalizeArgs),

    #[bpaf(command("merge"))]
    /// Merge directory lists, earlier files winning collisions
    Merge(#[bpaf(external(merge_args))] MergeArgs),

    #[bpaf(command("overlay"))]
    /// Fill entries from defaults and force overrides onto them
    Overlay(#[bpaf(external(overlay_args))] OverlayArgs),

    #[bpaf(command("rewrite"))]
    /// Relocate links from one base to another
    Rewrite(#[bpaf(external(rewrite_args))] RewriteArgs),

    #[bpaf(command("show"))]
    /// Print the entries of one API
    Show(#[bpaf(external(show_args))] ShowArgs),

    #[bpaf(command("build"))]
    /// Build the catalog described by api-catalog.toml
    Build(#[bpaf(external(build_args))] BuildArgs),

    /// Print version information
    #[bpaf(command("version"))]
    Version,
}

fn load_config(global: &GlobalOptions) -> Result<Config> {
    match &global.config {
        Some(path) => api_catalog_config::load_file(path),
        None => api_catalog_config::load(),
    }
}

/// The codec for this run: `--base-url` wins over the configured base-url.
fn codec_for(global: &GlobalOptions, config: &Config) -> Result<WireCodec> {
    let base = match &global.base_url {
        Some(raw) => Some(parse_link(raw).context("invalid --base-url")?),
        None => config.base_url().context("invalid base-url in config")?,
    };
    Ok(base.map_or_else(WireCodec::new, WireCodec::with_base))
}

fn run(cli: &Cli) -> Result<()> {
    if matches!(cli.command, Commands::Version) {
        println!("api-catalog {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = load_config(&cli.global)?;
    let codec = codec_for(&cli.global, &config)?;
    tracing::debug!(base = ?codec.base(), "loaded config");

    match &cli.command {
        Commands::Normalize(args) => commands::normalize::run(args, &codec),
        Commands::Merge(args) => commands::merge::run(args, &codec, &config),
        Commands::Overlay(args) => commands::overlay::run(args, &codec),
        Commands::Rewrite(args) => commands::rewrite::run(args, &codec),
        Commands::Show(args) => commands::show::run(args, &codec),
        Commands::Build(args) => commands::build::run(args, &codec, &config),
        Commands::Version => Ok(()),
    }
}

fn main() -> ExitCode {
    let cli = cli().run();
    logging::init(cli.global.log_level);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_catalog_config::MergeKey;

    fn parse(args: &[&str]) -> anyhow::Result<Cli> {
        cli()
            .run_inner(args)
            .map_err(|e| anyhow::anyhow!("{e:?}"))
    }

    #[test]
    fn cli_parses_normalize() -> anyhow::Result<()> {
        let parsed = parse(&["normalize", "in.json", "-o", "out.json"])?;
        assert_eq!(parsed.global.log_level, LogLevel::None);
        match parsed.command {
            Commands::Normalize(args) => {
                assert_eq!(args.file, PathBuf::from("in.json"));
                assert_eq!(args.output, Some(PathBuf::from("out.json")));
            }
            _ => panic!("expected Normalize"),
        }
        Ok(())
    }

    #[test]
    fn cli_parses_global_options() -> anyhow::Result<()> {
        let parsed = parse(&[
            "--log-level",
            "debug",
            "--config",
            "conf/api-catalog.toml",
            "--base-url",
            "https://apis.test/",
            "build",
        ])?;
        assert_eq!(parsed.global.log_level, LogLevel::Debug);
        assert_eq!(
            parsed.global.config,
            Some(PathBuf::from("conf/api-catalog.toml"))
        );
        assert_eq!(parsed.global.base_url.as_deref(), Some("https://apis.test/"));
        assert!(matches!(parsed.command, Commands::Build(BuildArgs { output: None })));
        Ok(())
    }

    #[test]
    fn cli_parses_merge() -> anyhow::Result<()> {
        let parsed = parse(&["merge", "--by", "name", "a.json", "b.json"])?;
        match parsed.command {
            Commands::Merge(args) => {
                assert_eq!(args.by, Some(MergeKey::Name));
                assert_eq!(
                    args.files,
                    vec![PathBuf::from("a.json"), PathBuf::from("b.json")]
                );
            }
            _ => panic!("expected Merge"),
        }
        Ok(())
    }

    #[test]
    fn cli_rejects_unknown_merge_key() {
        assert!(parse(&["merge", "--by", "version", "a.json"]).is_err());
    }

    #[test]
    fn cli_parses_overlay() -> anyhow::Result<()> {
        let parsed = parse(&[
            "overlay",
            "--defaults",
            "d1.json",
            "--defaults",
            "d2.json",
            "--overrides",
            "o.json",
            "catalog.json",
        ])?;
        match parsed.command {
            Commands::Overlay(args) => {
                assert_eq!(args.defaults.len(), 2);
                assert_eq!(args.overrides, vec![PathBuf::from("o.json")]);
                assert_eq!(args.file, PathBuf::from("catalog.json"));
            }
            _ => panic!("expected Overlay"),
        }
        Ok(())
    }

    #[test]
    fn cli_parses_rewrite() -> anyhow::Result<()> {
        let parsed = parse(&[
            "rewrite",
            "--from",
            "https://a.test/",
            "--to",
            "https://b.test/",
            "catalog.json",
        ])?;
        match parsed.command {
            Commands::Rewrite(args) => {
                assert_eq!(args.from, "https://a.test/");
                assert_eq!(args.to, "https://b.test/");
            }
            _ => panic!("expected Rewrite"),
        }
        Ok(())
    }

    #[test]
    fn cli_parses_show() -> anyhow::Result<()> {
        let parsed = parse(&["show", "--preferred", "catalog.json", "tasks"])?;
        match parsed.command {
            Commands::Show(args) => {
                assert!(args.preferred);
                assert!(args.version.is_none());
                assert_eq!(args.name, "tasks");
            }
            _ => panic!("expected Show"),
        }
        Ok(())
    }

    #[test]
    fn cli_parses_version() -> anyhow::Result<()> {
        let parsed = parse(&["version"])?;
        assert!(matches!(parsed.command, Commands::Version));
        Ok(())
    }

    #[test]
    fn base_url_flag_wins_over_config() -> anyhow::Result<()> {
        let global = parse(&["--base-url", "https://flag.test/", "version"])?.global;
        let config = Config {
            base_url: Some("https://config.test/".into()),
            ..Config::default()
        };
        let codec = codec_for(&global, &config)?;
        assert_eq!(codec.base().map(url::Url::as_str), Some("https://flag.test/"));
        Ok(())
    }

    #[test]
    fn config_base_url_is_used() -> anyhow::Result<()> {
        let global = parse(&["version"])?.global;
        let config = Config {
            base_url: Some("https://config.test/".into()),
            ..Config::default()
        };
        let codec = codec_for(&global, &config)?;
        assert_eq!(
            codec.base().map(url::Url::as_str),
            Some("https://config.test/")
        );
        Ok(())
    }

    #[test]
    fn invalid_base_url_is_reported() -> anyhow::Result<()> {
        let global = parse(&["--base-url", "not a url", "version"])?.global;
        let err = codec_for(&global, &Config::default()).expect_err("invalid base");
        assert!(format!("{err:#}").contains("invalid --base-url"));
        Ok(())
    }
}
