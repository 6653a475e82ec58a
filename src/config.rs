//! Check configuration, config-file discovery and effective settings.
//!
//! themecheck reads `themecheck.toml|yaml|yml` from the current directory (or
//! closest ancestor) and merges it with CLI flags. Defaults:
//! - `version`: `latest`
//! - `verbose`: false
//! - `fatal`: false
//! - `output`: `human`
//!
//! Overrides precedence: CLI > config file > defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Platform version line a theme is checked against.
pub enum CheckVersion {
    V1,
    V2,
    V3,
    V4,
    #[default]
    Latest,
    Canary,
}

impl CheckVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckVersion::V1 => "v1",
            CheckVersion::V2 => "v2",
            CheckVersion::V3 => "v3",
            CheckVersion::V4 => "v4",
            CheckVersion::Latest => "latest",
            CheckVersion::Canary => "canary",
        }
    }

    /// Ghost release line shown in the summary, e.g. `5.x`.
    pub fn ghost_version(self) -> &'static str {
        match self {
            CheckVersion::V1 => "1.x",
            CheckVersion::V2 => "2.x",
            CheckVersion::V3 => "3.x",
            CheckVersion::V4 => "4.x",
            CheckVersion::Latest => "5.x",
            CheckVersion::Canary => "6.x",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Mutually exclusive version selectors as given on the command line.
pub struct VersionFlags {
    pub v1: bool,
    pub v2: bool,
    pub v3: bool,
    pub v4: bool,
    pub canary: bool,
}

impl VersionFlags {
    /// First set flag in the fixed order v1 > v2 > v3 > v4 > canary.
    pub fn selected(&self) -> Option<CheckVersion> {
        [
            (self.v1, CheckVersion::V1),
            (self.v2, CheckVersion::V2),
            (self.v3, CheckVersion::V3),
            (self.v4, CheckVersion::V4),
            (self.canary, CheckVersion::Canary),
        ]
        .into_iter()
        .find_map(|(set, v)| set.then_some(v))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Options handed to the checker and renderers. Built once per run.
pub struct CheckConfiguration {
    pub check_version: CheckVersion,
    pub verbose: bool,
    pub only_fatal_errors: bool,
}

impl CheckConfiguration {
    /// Resolve CLI flags into a configuration; no version flag means `latest`.
    pub fn resolve(flags: &VersionFlags, verbose: bool, fatal: bool) -> Self {
        Self {
            check_version: flags.selected().unwrap_or_default(),
            verbose,
            only_fatal_errors: fatal,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
/// Report output mode.
pub enum OutputMode {
    #[default]
    Human,
    Json,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `themecheck.toml|yaml`.
pub struct FileConfig {
    pub version: Option<CheckVersion>,
    pub verbose: Option<bool>,
    pub fatal: Option<bool>,
    pub output: Option<OutputMode>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML in {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid YAML in {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

const CONFIG_NAMES: [&str; 3] = ["themecheck.toml", "themecheck.yaml", "themecheck.yml"];

/// Walk upward from `start` to the directory that owns the config.
///
/// Stops when a `themecheck.toml|yaml|yml` or a `.git` entry is found.
pub fn detect_config_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_NAMES.iter().any(|n| cur.join(n).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `FileConfig` from `root`, if one of the config files is present.
pub fn load_config(root: &Path) -> Result<Option<FileConfig>, ConfigError> {
    for name in CONFIG_NAMES {
        let path = root.join(name);
        if !path.is_file() {
            continue;
        }
        let s = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let cfg = if name.ends_with(".toml") {
            toml::from_str(&s).map_err(|source| ConfigError::Toml { path, source })?
        } else {
            serde_yaml::from_str(&s).map_err(|source| ConfigError::Yaml { path, source })?
        };
        return Ok(Some(cfg));
    }
    Ok(None)
}

#[derive(Debug, Clone, Copy, Default)]
/// Raw CLI switches that take part in precedence resolution.
pub struct CliSwitches {
    pub versions: VersionFlags,
    pub verbose: bool,
    pub fatal: bool,
    pub output: Option<OutputMode>,
}

#[derive(Debug, Clone)]
/// Fully-resolved settings used by the binary after applying precedence.
pub struct Effective {
    pub check: CheckConfiguration,
    pub output: OutputMode,
    pub config_path: Option<PathBuf>,
}

/// Merge CLI switches with an optional config file. CLI wins when set.
pub fn merge(cli: &CliSwitches, file: Option<&FileConfig>) -> (CheckConfiguration, OutputMode) {
    let mut flags = cli.versions;
    if flags.selected().is_none() {
        match file.and_then(|f| f.version) {
            Some(CheckVersion::V1) => flags.v1 = true,
            Some(CheckVersion::V2) => flags.v2 = true,
            Some(CheckVersion::V3) => flags.v3 = true,
            Some(CheckVersion::V4) => flags.v4 = true,
            Some(CheckVersion::Canary) => flags.canary = true,
            Some(CheckVersion::Latest) | None => {}
        }
    }
    let verbose = cli.verbose || file.and_then(|f| f.verbose).unwrap_or(false);
    let fatal = cli.fatal || file.and_then(|f| f.fatal).unwrap_or(false);
    let output = cli
        .output
        .or_else(|| file.and_then(|f| f.output))
        .unwrap_or_default();
    (CheckConfiguration::resolve(&flags, verbose, fatal), output)
}

/// Resolve `Effective` by discovering a config file above `start`.
pub fn resolve_effective(cli: &CliSwitches, start: &Path) -> Result<Effective, ConfigError> {
    let root = detect_config_root(start);
    let file = load_config(&root)?;
    let config_path = file.as_ref().and_then(|_| {
        CONFIG_NAMES
            .iter()
            .map(|n| root.join(n))
            .find(|p| p.is_file())
    });
    let (check, output) = merge(cli, file.as_ref());
    Ok(Effective {
        check,
        output,
        config_path,
    })
}
