use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

const SUPPORTED_CONFIG_VERSION: u32 = 1;
const DEFAULT_LOG_FILTER: &str = "info";

/// Name of the configuration file looked up in the working directory.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "fight-caves.toml";

/// Runtime settings of the command-line adapter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Config {
    /// File the session snapshot is persisted to, if any.
    pub(crate) snapshot_path: Option<PathBuf>,
    /// Default tracing filter used when `RUST_LOG` is unset.
    pub(crate) log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

impl Config {
    /// Loads the configuration from `path`, or from the default file if present.
    ///
    /// An explicitly provided path must exist; the default file is optional.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.is_file() {
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read configuration at {}", path.display()))?;
        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::parse(&contents, &base)
            .with_context(|| format!("invalid configuration at {}", path.display()))
    }

    fn parse(contents: &str, base_path: &Path) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).context("failed to parse configuration toml contents")?;
        if file.version != SUPPORTED_CONFIG_VERSION {
            bail!(
                "unsupported configuration version {}; expected {}",
                file.version,
                SUPPORTED_CONFIG_VERSION
            );
        }

        Ok(Self {
            snapshot_path: file.snapshot_path.map(|path| base_path.join(path)),
            log_filter: file
                .log_filter
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned()),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    version: u32,
    snapshot_path: Option<PathBuf>,
    log_filter: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_resolves_snapshot_relative_to_config() {
        let config = Config::parse(
            r#"
                version = 1
                snapshot_path = "state/session.txt"
                log_filter = "debug"
            "#,
            Path::new("/srv/caves"),
        )
        .expect("config parses");

        assert_eq!(
            config.snapshot_path,
            Some(PathBuf::from("/srv/caves/state/session.txt"))
        );
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn parse_applies_defaults() {
        let config = Config::parse("version = 1", Path::new("")).expect("config parses");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn parse_rejects_unknown_version() {
        let error = Config::parse("version = 2", Path::new("")).expect_err("version rejected");
        assert!(error.to_string().contains("unsupported configuration version 2"));
    }

    #[test]
    fn parse_rejects_unknown_keys() {
        let result = Config::parse("version = 1\nroute = 3", Path::new(""));
        assert!(result.is_err());
    }

    #[test]
    fn load_reads_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "version = 1\nsnapshot_path = \"caves.txt\"").expect("write config");

        let config = Config::load(Some(file.path())).expect("config loads");
        let expected = file
            .path()
            .parent()
            .expect("temp file has a parent")
            .join("caves.txt");
        assert_eq!(config.snapshot_path, Some(expected));
    }

    #[test]
    fn load_requires_explicit_file_to_exist() {
        let directory = tempfile::tempdir().expect("temp dir");
        let missing = directory.path().join("missing.toml");
        assert!(Config::load(Some(&missing)).is_err());
    }
}
