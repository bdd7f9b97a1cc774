use crate::document::LineRange;
use crate::formatting::ColorMode;
use crate::language::Language;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "proofcheck")]
#[command(about = "Grammar and style checker for plain-text documents", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Increase verbosity level (can be repeated: -v, -vv, -vvv)
    /// -v: Show check progress events
    /// -vv: Show debug information
    /// -vvv: Show all trace information
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (default: nearest .proofcheck.toml, then the user config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a document or a range of its lines
    Check {
        #[command(flatten)]
        document: DocumentArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Stop waiting for the check after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Change the configuration
    Configure {
        /// Language whose rules are being configured
        #[arg(short, long, env = "PROOFCHECK_LANGUAGE")]
        language: Option<String>,

        #[command(flatten)]
        edits: EditArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Send a named host event ("execute" or "configure")
    Trigger {
        /// Event name
        event: String,

        #[command(flatten)]
        document: DocumentArgs,

        #[command(flatten)]
        output: OutputArgs,

        #[command(flatten)]
        edits: EditArgs,
    },

    /// List the rules for a language and whether they are enabled
    Rules {
        /// Language to list rules for
        #[arg(short, long, env = "PROOFCHECK_LANGUAGE")]
        language: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,
    },

    /// Initialize configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

/// Which text to check.
#[derive(Args, Debug, Clone, Default)]
pub struct DocumentArgs {
    /// File to check ("-" or omitted reads standard input)
    pub path: Option<PathBuf>,

    /// Check only these lines, e.g. 3-7 (treated as a selection)
    #[arg(long)]
    pub lines: Option<LineRange>,

    /// Document language, e.g. en or de-DE
    #[arg(short, long, env = "PROOFCHECK_LANGUAGE")]
    pub language: Option<String>,
}

impl DocumentArgs {
    /// The file path, or `None` for standard input.
    pub fn file(&self) -> Option<&PathBuf> {
        self.path.as_ref().filter(|path| path.as_os_str() != "-")
    }
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    pub format: OutputFormat,

    /// When to use colors
    #[arg(long, value_enum, default_value = "auto")]
    pub color: ColorChoice,
}

/// Configuration changes, applied in one configuration session.
#[derive(Args, Debug, Clone, Default)]
pub struct EditArgs {
    /// Rules to switch off (comma-separated ids)
    #[arg(long, value_delimiter = ',')]
    pub disable: Vec<String>,

    /// Rules to switch on (comma-separated ids)
    #[arg(long, value_delimiter = ',')]
    pub enable: Vec<String>,

    /// Your native language
    #[arg(long)]
    pub mother_tongue: Option<Language>,

    /// Language used when a document does not declare one
    #[arg(long)]
    pub default_language: Option<Language>,

    /// Check timeout in seconds to store in the configuration (0 = none)
    #[arg(long)]
    pub set_timeout: Option<u64>,

    /// Start from the default configuration
    #[arg(long)]
    pub reset: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Terminal,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl From<ColorChoice> for ColorMode {
    fn from(choice: ColorChoice) -> Self {
        match choice {
            ColorChoice::Auto => ColorMode::Auto,
            ColorChoice::Always => ColorMode::Always,
            ColorChoice::Never => ColorMode::Never,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parsing_check_command() {
        let cli = Cli::parse_from([
            "proofcheck",
            "check",
            "notes.txt",
            "--lines",
            "2-4",
            "--language",
            "de-DE",
            "--format",
            "json",
            "--timeout",
            "30",
            "-vv",
        ]);

        assert_eq!(cli.verbosity, 2);
        match cli.command {
            Commands::Check {
                document,
                output,
                timeout,
            } => {
                assert_eq!(document.file(), Some(&PathBuf::from("notes.txt")));
                assert_eq!(document.lines, Some(LineRange { first: 2, last: 4 }));
                assert_eq!(document.language.as_deref(), Some("de-DE"));
                assert_eq!(output.format, OutputFormat::Json);
                assert_eq!(timeout, Some(30));
            }
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_dash_means_stdin() {
        let cli = Cli::parse_from(["proofcheck", "check", "-"]);
        match cli.command {
            Commands::Check { document, .. } => assert!(document.file().is_none()),
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_cli_parsing_configure_command() {
        let cli = Cli::parse_from([
            "proofcheck",
            "configure",
            "--disable",
            "WHITESPACE_RULE,WORD_REPEAT_RULE",
            "--mother-tongue",
            "pl",
            "--config",
            "/tmp/proofcheck.toml",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/proofcheck.toml")));
        match cli.command {
            Commands::Configure { edits, .. } => {
                assert_eq!(edits.disable, vec!["WHITESPACE_RULE", "WORD_REPEAT_RULE"]);
                assert_eq!(edits.mother_tongue, Some(Language::Polish));
                assert!(!edits.reset);
            }
            _ => panic!("Expected Configure command"),
        }
    }

    #[test]
    fn test_unknown_mother_tongue_is_rejected() {
        let result = Cli::try_parse_from(["proofcheck", "configure", "--mother-tongue", "xx"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parsing_init_command() {
        let cli = Cli::parse_from(["proofcheck", "init", "--force"]);
        match cli.command {
            Commands::Init { force } => assert!(force),
            _ => panic!("Expected Init command"),
        }
    }

    #[test]
    fn test_invalid_line_range_is_rejected() {
        let result = Cli::try_parse_from(["proofcheck", "check", "a.txt", "--lines", "5-2"]);
        assert!(result.is_err());
    }
}
