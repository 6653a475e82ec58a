//! Shared data models for check results and the rule catalog.

pub mod rules;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Severity of a finding, ordered from most to least blocking.
pub enum Severity {
    Error,
    Warning,
    Recommendation,
    Feature,
}

impl Severity {
    /// Sections rendered in the report body, in order. Features are never listed.
    pub const REPORTED: [Severity; 3] = [Severity::Error, Severity::Warning, Severity::Recommendation];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Recommendation => "recommendation",
            Severity::Feature => "feature",
        }
    }

    /// Capitalized singular label, e.g. `Error`.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
            Severity::Recommendation => "Recommendation",
            Severity::Feature => "Feature",
        }
    }

    /// Capitalized plural section title, e.g. `Errors`.
    pub fn heading(self) -> &'static str {
        match self {
            Severity::Error => "Errors",
            Severity::Warning => "Warnings",
            Severity::Recommendation => "Recommendations",
            Severity::Feature => "Features",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A file or location that failed a rule.
pub struct FailureRef {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl FailureRef {
    pub fn new(reference: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One reported compatibility issue or note.
pub struct Finding {
    pub code: String,
    pub rule: String,
    pub level: Severity,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub failures: Vec<FailureRef>,
    #[serde(default)]
    pub fatal: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Findings bucketed by severity. Each bucket keeps checker order.
pub struct Results {
    #[serde(default)]
    pub error: Vec<Finding>,
    #[serde(default)]
    pub warning: Vec<Finding>,
    #[serde(default)]
    pub recommendation: Vec<Finding>,
    #[serde(default)]
    pub feature: Vec<Finding>,
    /// Codes of rules that passed.
    #[serde(default)]
    pub pass: Vec<String>,
}

impl Results {
    pub fn bucket(&self, level: Severity) -> &[Finding] {
        match level {
            Severity::Error => &self.error,
            Severity::Warning => &self.warning,
            Severity::Recommendation => &self.recommendation,
            Severity::Feature => &self.feature,
        }
    }

    pub fn bucket_mut(&mut self, level: Severity) -> &mut Vec<Finding> {
        match level {
            Severity::Error => &mut self.error,
            Severity::Warning => &mut self.warning,
            Severity::Recommendation => &mut self.recommendation,
            Severity::Feature => &mut self.feature,
        }
    }

    /// Append a finding to the bucket matching its level.
    pub fn push(&mut self, finding: Finding) {
        self.bucket_mut(finding.level).push(finding);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Outcome of checking one theme against one platform version.
pub struct ThemeResult {
    pub checked_version: String,
    pub results: Results,
    /// Set once the format step has normalized the results.
    #[serde(default)]
    pub formatted: bool,
}

impl ThemeResult {
    pub fn new(checked_version: impl Into<String>) -> Self {
        Self {
            checked_version: checked_version.into(),
            ..Default::default()
        }
    }

    pub fn error_count(&self) -> usize {
        self.results.error.len()
    }

    pub fn warning_count(&self) -> usize {
        self.results.warning.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_routes_by_level() {
        let mut r = Results::default();
        r.push(Finding {
            code: "GS-1".into(),
            rule: "r".into(),
            level: Severity::Recommendation,
            details: String::new(),
            failures: vec![],
            fatal: false,
        });
        assert!(r.error.is_empty());
        assert_eq!(r.bucket(Severity::Recommendation).len(), 1);
    }

    #[test]
    fn test_theme_result_json_shape() {
        let mut t = ThemeResult::new("5.x");
        t.results.push(Finding {
            code: "GS-2".into(),
            rule: "Missing file".into(),
            level: Severity::Error,
            details: "d".into(),
            failures: vec![FailureRef::new("index.hbs", "")],
            fatal: true,
        });
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["checkedVersion"], "5.x");
        assert_eq!(v["results"]["error"][0]["level"], "error");
        assert_eq!(v["results"]["error"][0]["failures"][0]["ref"], "index.hbs");
        assert!(v["results"]["error"][0]["failures"][0].get("message").is_none());
    }
}
