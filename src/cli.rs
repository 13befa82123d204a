//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for persona-lens.

use clap::{Parser, Subcommand};

/// persona-lens - Reddit persona card and report renderer
///
/// Takes an analysis bundle (profile, persona attributes, activity) and
/// renders a persona card image plus a cited text report.
#[derive(Parser, Debug)]
#[command(name = "persona-lens")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the persona card and report from an analysis bundle
    Render {
        /// Path to the analysis bundle JSON file
        input: String,

        /// Path to configuration file
        #[arg(short, long, env = "PERSONA_LENS_CONFIG")]
        config: Option<String>,

        /// Output directory (overrides configuration)
        #[arg(short, long)]
        output_dir: Option<String>,

        /// Report format: text or markdown (overrides configuration)
        #[arg(short, long)]
        format: Option<String>,

        /// Reddit profile URL or bare username; must match the bundle
        #[arg(long)]
        profile_url: Option<String>,

        /// Skip the card image
        #[arg(long)]
        no_card: bool,

        /// Skip the text report
        #[arg(long)]
        no_report: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Display version and build information
    Version,
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the current configuration
    Show {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        // Verifies that the CLI definition is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn test_render_command() {
        let cli = Cli::parse_from(["persona-lens", "render", "bundle.json"]);
        match cli.command {
            Commands::Render { input, config, no_card, no_report, .. } => {
                assert_eq!(input, "bundle.json");
                assert!(config.is_none());
                assert!(!no_card);
                assert!(!no_report);
            }
            _ => panic!("Expected Render command"),
        }
    }

    #[test]
    fn test_render_with_options() {
        let cli = Cli::parse_from([
            "persona-lens",
            "render",
            "bundle.json",
            "--output-dir",
            "/tmp/personas",
            "--format",
            "markdown",
            "--no-card",
        ]);
        match cli.command {
            Commands::Render { output_dir, format, no_card, .. } => {
                assert_eq!(output_dir, Some("/tmp/personas".to_string()));
                assert_eq!(format, Some("markdown".to_string()));
                assert!(no_card);
            }
            _ => panic!("Expected Render command"),
        }
    }

    #[test]
    fn test_render_with_profile_url() {
        let cli = Cli::parse_from([
            "persona-lens",
            "render",
            "bundle.json",
            "--profile-url",
            "https://www.reddit.com/user/kojied/",
        ]);
        match cli.command {
            Commands::Render { profile_url, .. } => {
                assert_eq!(
                    profile_url,
                    Some("https://www.reddit.com/user/kojied/".to_string())
                );
            }
            _ => panic!("Expected Render command"),
        }
    }

    #[test]
    fn test_config_show() {
        let cli = Cli::parse_from(["persona-lens", "config", "show"]);
        match cli.command {
            Commands::Config { subcommand: ConfigSubcommand::Show { config } } => {
                assert!(config.is_none());
            }
            _ => panic!("Expected Config Show command"),
        }
    }

    #[test]
    fn test_config_init() {
        let cli = Cli::parse_from(["persona-lens", "config", "init", "--force"]);
        match cli.command {
            Commands::Config { subcommand: ConfigSubcommand::Init { path, force } } => {
                assert!(path.is_none());
                assert!(force);
            }
            _ => panic!("Expected Config Init command"),
        }
    }

    #[test]
    fn test_verbose_flags() {
        let cli = Cli::parse_from(["persona-lens", "-vv", "version"]);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_quiet_flag() {
        let cli = Cli::parse_from(["persona-lens", "--quiet", "version"]);
        assert!(cli.quiet);
    }
}
