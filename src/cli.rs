//! CLI argument parsing via `clap`.

use crate::config::{CliSwitches, OutputMode, VersionFlags};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "themecheck",
    version,
    about = "Check a Ghost theme for compatibility",
    long_about = "Check a Ghost theme directory or zip archive for compatibility and print a report grouped by severity.\n\nExits 1 when the theme has errors, 0 otherwise. Warnings and recommendations never fail the run.\n\nConfiguration precedence: CLI > themecheck.toml > defaults.",
    after_help = "Examples:\n  themecheck ./content/themes/casper\n  themecheck -z casper.zip --verbose\n  themecheck -3 --fatal ./my-theme",
    arg_required_else_help = true
)]
/// Command-line options.
pub struct Cli {
    #[arg(value_parser = existing_path, help = "Theme directory, or zip file with --zip")]
    pub path: PathBuf,
    #[arg(short = 'z', long, action = clap::ArgAction::SetTrue, help = "Theme path points to a zip file")]
    pub zip: bool,
    #[arg(short = '1', long, action = clap::ArgAction::SetTrue, help = "Check theme for Ghost 1.0 compatibility")]
    pub v1: bool,
    #[arg(short = '2', long, action = clap::ArgAction::SetTrue, help = "Check theme for Ghost 2.0 compatibility")]
    pub v2: bool,
    #[arg(short = '3', long, action = clap::ArgAction::SetTrue, help = "Check theme for Ghost 3.0 compatibility")]
    pub v3: bool,
    #[arg(long, hide = true, action = clap::ArgAction::SetTrue)]
    pub v4: bool,
    #[arg(short = 'c', long, action = clap::ArgAction::SetTrue, help = "Check theme for Ghost compatibility with the next release")]
    pub canary: bool,
    #[arg(short = 'f', long, action = clap::ArgAction::SetTrue, help = "Only report errors that block the theme from working")]
    pub fatal: bool,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Show rule details and every failing file")]
    pub verbose: bool,
    #[arg(long, value_enum, help = "Output mode: human|json (default: human)")]
    pub output: Option<OutputMode>,
}

impl Cli {
    pub fn switches(&self) -> CliSwitches {
        CliSwitches {
            versions: VersionFlags {
                v1: self.v1,
                v2: self.v2,
                v3: self.v3,
                v4: self.v4,
                canary: self.canary,
            },
            verbose: self.verbose,
            fatal: self.fatal,
            output: self.output,
        }
    }
}

fn existing_path(s: &str) -> Result<PathBuf, String> {
    let p = PathBuf::from(s);
    if p.exists() {
        Ok(p)
    } else {
        Err(format!("path does not exist: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CheckConfiguration, CheckVersion};
    use tempfile::tempdir;

    #[test]
    fn test_parse_flags_into_switches() {
        let dir = tempdir().unwrap();
        let path = dir.path().to_str().unwrap();
        let cli = Cli::try_parse_from(["themecheck", "-1", "-3", "-f", "--verbose", path]).unwrap();
        let sw = cli.switches();
        let cfg = CheckConfiguration::resolve(&sw.versions, sw.verbose, sw.fatal);
        assert_eq!(cfg.check_version, CheckVersion::V1);
        assert!(cfg.verbose && cfg.only_fatal_errors);
        assert!(!cli.zip);
    }

    #[test]
    fn test_hidden_v4_and_output_mode() {
        let dir = tempdir().unwrap();
        let path = dir.path().to_str().unwrap();
        let cli = Cli::try_parse_from(["themecheck", "--v4", "-c", "--output", "json", "-z", path]).unwrap();
        assert!(cli.v4 && cli.canary && cli.zip);
        assert_eq!(cli.output, Some(OutputMode::Json));
        assert_eq!(cli.switches().versions.selected(), Some(CheckVersion::V4));
    }

    #[test]
    fn test_missing_path_is_rejected() {
        let res = Cli::try_parse_from(["themecheck", "/definitely/not/here/theme"]);
        assert!(res.is_err());
    }
}
