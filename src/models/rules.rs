//! Rule catalog schema used by the built-in scanner.
//!
//! Key components:
//! - `Rule`: a code, severity `level`, user-facing `rule` text and `details`.
//! - `versions`: optional list of check versions the rule applies to.
//! - `check`: how the rule is evaluated (required-file, package-field,
//!   template-match, template-missing).

use crate::config::CheckVersion;
use crate::models::Severity;
use serde::Deserialize;

/// Catalog shipped with the binary.
pub const BUILTIN_CATALOG: &str = include_str!("../../rules/catalog.toml");

#[derive(Deserialize)]
/// Root catalog loaded from TOML.
pub struct Catalog {
    #[serde(default, rename = "rule")]
    pub rules: Vec<Rule>,
}

impl Catalog {
    pub fn builtin() -> Result<Self, toml::de::Error> {
        toml::from_str(BUILTIN_CATALOG)
    }

    /// Rules that apply when checking against `version`, in catalog order.
    pub fn for_version(&self, version: CheckVersion) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(move |r| r.applies_to(version))
    }
}

#[derive(Deserialize, Clone)]
/// A single catalog entry.
pub struct Rule {
    pub code: String,
    pub level: Severity,
    pub rule: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub fatal: bool,
    #[serde(default)]
    pub versions: Option<Vec<CheckVersion>>,
    pub check: Check,
}

impl Rule {
    pub fn applies_to(&self, version: CheckVersion) -> bool {
        self.versions
            .as_ref()
            .is_none_or(|vs| vs.contains(&version))
    }
}

#[derive(Deserialize, Clone)]
#[serde(tag = "kind")]
/// Checks supported by the scanner.
pub enum Check {
    #[serde(rename = "required-file")]
    RequiredFile { path: String },
    #[serde(rename = "package-field")]
    PackageField {
        /// Dotted path into package.json, e.g. `config.posts_per_page`.
        field: String,
        #[serde(default)]
        pattern: Option<String>,
    },
    #[serde(rename = "template-match")]
    TemplateMatch { files: String, regex: String },
    #[serde(rename = "template-missing")]
    TemplateMissing { files: String, regex: String },
}
