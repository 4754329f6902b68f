#![doc = include_str!("../README.md")]

use core::fmt;
use core::str::FromStr;
use std::path::{Path, PathBuf};

use api_catalog::{CatalogError, parse_link};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

const CONFIG_FILENAME: &str = "api-catalog.toml";

fn example_base_url() -> &'static str {
    "https://www.googleapis.com/discovery/v1/"
}

fn example_sources() -> Vec<String> {
    vec![
        "catalogs/upstream.json".into(),
        "catalogs/local.json".into(),
    ]
}

/// Which key identifies "the same API" when listings are merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MergeKey {
    /// One entry per identifier (`name:version`).
    #[default]
    Id,
    /// One entry per API name, regardless of version.
    Name,
}

impl fmt::Display for MergeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeKey::Id => f.write_str("id"),
            MergeKey::Name => f.write_str("name"),
        }
    }
}

impl FromStr for MergeKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(MergeKey::Id),
            "name" => Ok(MergeKey::Name),
            other => Err(format!("unknown merge key '{other}', expected 'id' or 'name'")),
        }
    }
}

/// Relocation of catalog links from one base to another.
///
/// Every link starting with `from` is rewritten to live under `to`. Links
/// elsewhere are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
#[schemars(title = "Mirror")]
pub struct Mirror {
    /// Base the catalog's links currently point at.
    pub from: String,
    /// Base the links are moved to.
    pub to: String,
}

/// Configuration file for building an API directory catalog.
///
/// The loader walks up the directory tree looking for `api-catalog.toml`
/// files and merges them together. Settings in child directories take
/// priority over parent directories. Set `root = true` to stop the upward
/// search.
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
#[schemars(title = "api-catalog.toml")]
pub struct Config {
    /// Mark this configuration file as the project root.
    ///
    /// When `true`, no `api-catalog.toml` from a parent directory is merged.
    #[serde(default)]
    pub root: bool,

    /// Base link for relative item links.
    ///
    /// Relative links like `./apis/tasks/v1/rest` are resolved against it
    /// when reading, and links under it are written back relative.
    #[schemars(title = "Base URL", example = example_base_url())]
    #[serde(default)]
    pub base_url: Option<String>,

    /// Directory list files merged into the catalog.
    ///
    /// Earlier sources take precedence over later ones. Child config sources
    /// come before parent config sources after merging.
    #[schemars(title = "Sources", example = example_sources())]
    #[serde(default)]
    pub sources: Vec<PathBuf>,

    /// How entries from different sources are matched when merging.
    /// Defaults to `id`.
    #[schemars(title = "Merge Key")]
    #[serde(default)]
    pub merge_key: Option<MergeKey>,

    /// Partial directory lists whose values fill gaps in catalog entries.
    #[schemars(title = "Defaults")]
    #[serde(default)]
    pub defaults: Vec<PathBuf>,

    /// Partial directory lists whose values replace catalog values.
    #[schemars(title = "Overrides")]
    #[serde(default)]
    pub overrides: Vec<PathBuf>,

    /// Where `build` writes the encoded catalog. Standard output when unset.
    #[schemars(title = "Output")]
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Relocate links to a mirror before writing.
    #[serde(default)]
    pub mirror: Option<Mirror>,
}

impl Config {
    /// Merge a parent config into this one. Child values take priority:
    /// - scalars (`base-url`, `merge-key`, `output`, `mirror`) fall back to
    ///   the parent only when unset here
    /// - `sources`, `defaults`, `overrides`: parent entries are appended
    ///   (deduped)
    /// - `root` is not inherited
    fn merge_parent(&mut self, parent: Config) {
        self.base_url = self.base_url.take().or(parent.base_url);
        self.merge_key = self.merge_key.or(parent.merge_key);
        self.output = self.output.take().or(parent.output);
        self.mirror = self.mirror.take().or(parent.mirror);
        append_deduped(&mut self.sources, parent.sources);
        append_deduped(&mut self.defaults, parent.defaults);
        append_deduped(&mut self.overrides, parent.overrides);
    }

    /// Anchor relative paths at `dir`, the directory of the file that
    /// declared them.
    fn resolve_paths(&mut self, dir: &Path) {
        for path in self
            .sources
            .iter_mut()
            .chain(&mut self.defaults)
            .chain(&mut self.overrides)
            .chain(self.output.as_mut())
        {
            if path.is_relative() {
                *path = dir.join(&*path);
            }
        }
    }

    pub fn merge_key(&self) -> MergeKey {
        self.merge_key.unwrap_or_default()
    }

    /// The parsed `base-url`, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidLink`] if the value is not an absolute
    /// URL.
    pub fn base_url(&self) -> Result<Option<Url>, CatalogError> {
        self.base_url.as_deref().map(parse_link).transpose()
    }

    /// The parsed `[mirror]` bases as `(from, to)`, if a mirror is configured.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidLink`] if either base is not an
    /// absolute URL.
    pub fn mirror_bases(&self) -> Result<Option<(Url, Url)>, CatalogError> {
        let Some(mirror) = &self.mirror else {
            return Ok(None);
        };
        Ok(Some((parse_link(&mirror.from)?, parse_link(&mirror.to)?)))
    }
}

fn append_deduped(child: &mut Vec<PathBuf>, parent: Vec<PathBuf>) {
    for path in parent {
        if !child.contains(&path) {
            child.push(path);
        }
    }
}

/// Generate the JSON Schema for `api-catalog.toml` as a `serde_json::Value`.
///
/// # Panics
///
/// Panics if the schema cannot be serialized to JSON (should never happen).
pub fn schema() -> Value {
    serde_json::to_value(schema_for!(Config)).expect("schema serialization cannot fail")
}

/// Find the nearest `api-catalog.toml` starting from `start_dir`, walking
/// upward.
pub fn find_config_path(start_dir: &Path) -> Option<PathBuf> {
    let mut dir = start_dir.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Read and parse a single config file, anchoring its relative paths at the
/// file's directory. No parent configs are merged.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_file(path: &Path) -> Result<Config, anyhow::Error> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let mut cfg: Config = toml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))?;
    if let Some(dir) = path.parent() {
        cfg.resolve_paths(dir);
    }
    Ok(cfg)
}

/// Search for `api-catalog.toml` files starting from `start_dir`, walking up.
/// Merges all configs found until one with `root = true` is hit (inclusive).
/// Returns the merged config, or `None` if no config file was found.
///
/// # Errors
///
/// Returns an error if a config file exists but cannot be read or parsed.
pub fn find_and_load(start_dir: &Path) -> Result<Option<Config>, anyhow::Error> {
    let mut configs: Vec<Config> = Vec::new();
    let mut dir = start_dir.to_path_buf();

    loop {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.is_file() {
            let cfg = load_file(&candidate)?;
            let is_root = cfg.root;
            configs.push(cfg);
            if is_root {
                break;
            }
        }
        if !dir.pop() {
            break;
        }
    }

    let mut configs = configs.into_iter();
    let Some(mut merged) = configs.next() else {
        return Ok(None);
    };
    for parent in configs {
        merged.merge_parent(parent);
    }
    Ok(Some(merged))
}

/// Load config from the current working directory (walking upward).
///
/// # Errors
///
/// Returns an error if a config file exists but cannot be read or parsed.
pub fn load() -> Result<Config, anyhow::Error> {
    let cwd = std::env::current_dir()?;
    Ok(find_and_load(&cwd)?.unwrap_or_default())
}
