//! Output rendering for check results.
//!
//! Supports `human` (default) and `json` outputs. The human report is built
//! from plain lines so tests can inspect it; styling is applied through a
//! `Palette` that can be switched off (`NO_COLOR`, JSON mode, tests).

use crate::config::{CheckConfiguration, OutputMode};
use crate::models::{FailureRef, Finding, Severity, ThemeResult};
use owo_colors::{OwoColorize, Style};
use regex::Regex;
use serde_json::{json, Value as JsonVal};
use std::sync::OnceLock;
use unicode_width::UnicodeWidthStr;

const CHECK_MARK: &str = "\u{2713}";
const ERROR_SUBTITLE: &str = "Important to fix, functionality may be degraded.";
pub const DOCS_URL: &str = "https://ghost.org/docs/themes/";
pub const ONLINE_CHECKER_URL: &str = "https://gscan.ghost.org/";

/// Display style for each severity.
pub fn severity_style(level: Severity) -> Style {
    match level {
        Severity::Error => Style::new().red(),
        Severity::Warning => Style::new().yellow(),
        Severity::Recommendation => Style::new().yellow(),
        Severity::Feature => Style::new().green(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Applies named styles to text spans, or nothing when colors are off.
pub struct Palette {
    color: bool,
}

impl Palette {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    /// Colors on for the human report unless `NO_COLOR` is set.
    pub fn detect(mode: OutputMode) -> Self {
        Self::new(mode == OutputMode::Human && crate::utils::use_colors())
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.color {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn severity(&self, level: Severity, text: &str) -> String {
        self.paint(text, severity_style(level))
    }

    pub fn severity_strong(&self, level: Severity, text: &str) -> String {
        self.paint(text, severity_style(level).bold())
    }

    pub fn bold(&self, text: &str) -> String {
        self.paint(text, Style::new().bold())
    }

    pub fn link(&self, text: &str) -> String {
        self.paint(text, Style::new().cyan().underline())
    }

    pub fn success(&self, text: &str) -> String {
        self.paint(text, Style::new().green())
    }

    pub fn is_color(&self) -> bool {
        self.color
    }
}

fn ansi_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").unwrap())
}

/// Remove terminal styling sequences from `s`.
pub fn strip_styles(s: &str) -> std::borrow::Cow<'_, str> {
    ansi_re().replace_all(s, "")
}

/// Columns `s` occupies on screen, ignoring styling sequences.
pub fn visible_width(s: &str) -> usize {
    UnicodeWidthStr::width(strip_styles(s).as_ref())
}

/// `1 error`, `2 errors`.
pub fn count_phrase(word: &str, count: usize) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

/// One-line compatibility summary, underlined when there are problems.
pub fn render_summary(result: &ThemeResult, cfg: &CheckConfiguration, palette: &Palette) -> String {
    let errors = result.error_count();
    let warnings = result.warning_count();

    if errors == 0 && warnings == 0 {
        let mark = palette.success(CHECK_MARK);
        return if cfg.only_fatal_errors {
            format!(
                "{mark} Your theme has no fatal compatibility issues with Ghost {}",
                result.checked_version
            )
        } else {
            format!(
                "{mark} Your theme is compatible with Ghost {}",
                result.checked_version
            )
        };
    }

    let mut summary = String::from("Your theme has");
    if errors > 0 {
        let phrase = format!(" {}", count_phrase("error", errors));
        summary.push_str(&palette.severity_strong(Severity::Error, &phrase));
    }
    if errors > 0 && warnings > 0 {
        summary.push_str(" and");
    }
    if warnings > 0 {
        let phrase = format!(" {}", count_phrase("warning", warnings));
        summary.push_str(&palette.severity_strong(Severity::Warning, &phrase));
    }
    summary.push('!');

    let underline = "-".repeat(visible_width(&summary));
    format!("{summary}\n{underline}")
}

fn failure_line(failure: &FailureRef) -> String {
    if failure.message.is_empty() {
        failure.reference.clone()
    } else {
        format!("{} - {}", failure.reference, failure.message)
    }
}

/// Lines for a single finding, including the trailing blank line.
pub fn render_finding(finding: &Finding, cfg: &CheckConfiguration, palette: &Palette) -> Vec<String> {
    let label = format!("- {}:", finding.level.label());
    let mut lines = vec![format!(
        "{} {}",
        palette.severity(finding.level, &label),
        finding.rule
    )];

    if cfg.verbose {
        if !finding.details.is_empty() {
            lines.push(format!("{} {}", palette.bold("Details:"), finding.details));
        }
        if !finding.failures.is_empty() {
            lines.push(palette.bold("Files:"));
            lines.extend(finding.failures.iter().map(failure_line));
        }
    } else if !finding.failures.is_empty() {
        let refs: Vec<&str> = finding
            .failures
            .iter()
            .map(|f| f.reference.as_str())
            .collect();
        lines.push(format!("{} {}", palette.bold("Files:"), refs.join(", ")));
    }

    lines.push(String::new());
    lines
}

/// Section title, its underline and (for errors) the cautionary subtitle.
pub fn render_section_header(level: Severity, palette: &Palette) -> Vec<String> {
    let heading = level.heading();
    let mut lines = vec![
        String::new(),
        palette.severity_strong(level, heading),
        palette.severity_strong(level, &"-".repeat(visible_width(heading))),
    ];
    if level == Severity::Error {
        lines.push(palette.severity(level, ERROR_SUBTITLE));
        lines.push(String::new());
    }
    lines
}

/// Links printed after the findings.
pub fn render_footer(palette: &Palette) -> Vec<String> {
    vec![
        String::new(),
        format!("Get more help at {}", palette.link(DOCS_URL)),
        format!(
            "You can also check theme compatibility at {}",
            palette.link(ONLINE_CHECKER_URL)
        ),
    ]
}

/// Compose the JSON report (pure) for testing/snapshot purposes.
pub fn compose_json(result: &ThemeResult) -> Result<JsonVal, serde_json::Error> {
    let summary = json!({
        "errors": result.error_count(),
        "warnings": result.warning_count(),
        "recommendations": result.results.recommendation.len(),
        "passed": result.results.pass.len(),
        "exitCode": if result.error_count() > 0 { 1 } else { 0 },
    });
    Ok(json!({
        "checkedVersion": result.checked_version,
        "formatted": result.formatted,
        "summary": summary,
        "results": serde_json::to_value(&result.results)?,
    }))
}
