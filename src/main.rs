//! persona-lens - Reddit persona card and report renderer
//!
//! This is the main entry point for the persona-lens binary. It loads an
//! analysis bundle, renders the persona card and report, and writes both
//! artifacts to the configured output directory.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};

use persona_lens::cli::{Cli, Commands, ConfigSubcommand};
use persona_lens::config::{self, AppConfig};
use persona_lens::error::{Error, Result};
use persona_lens::fetch::HttpImageFetcher;
use persona_lens::ingest::{self, Bundle};
use persona_lens::logging;
use persona_lens::render::card::CardRenderer;
use persona_lens::render::fonts::FontProvider;
use persona_lens::render::report::{ReportFormat, ReportRenderer};
use persona_lens::version;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    // Commands that don't need full logging use simple setup
    match &cli.command {
        Commands::Version => {
            version::print_version();
            return Ok(());
        }
        Commands::Config { subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            return handle_config_command(subcommand.clone());
        }
        Commands::Render { .. } => {}
    }

    let Commands::Render {
        input,
        config: config_path,
        output_dir,
        format,
        profile_url,
        no_card,
        no_report,
    } = cli.command
    else {
        unreachable!();
    };

    let mut config = AppConfig::load(config_path.as_deref())?;
    if let Some(dir) = output_dir {
        config.output.dir = dir;
    }
    if let Some(format) = format {
        config.output.report_format = format;
    }
    config.validate()?;

    // Guards must be kept alive for the lifetime of the program
    let _log_guards = logging::init_logging(&config.logging, cli.verbose, cli.quiet)?;

    let build = version::build_info();
    info!(version = %build.full_version(), "Starting persona-lens");

    render_bundle(&config, &input, profile_url.as_deref(), no_card, no_report)
}

/// Load the bundle and write the requested artifacts.
fn render_bundle(
    config: &AppConfig,
    input: &str,
    profile_url: Option<&str>,
    no_card: bool,
    no_report: bool,
) -> Result<()> {
    let input_path = Path::new(input);
    let json = fs::read_to_string(input_path).map_err(|e| Error::IoRead {
        path: input_path.to_path_buf(),
        source: e,
    })?;
    let bundle = ingest::parse_bundle(&json, Utc::now())?;

    if let Some(url) = profile_url {
        let expected = ingest::username_from_profile_url(url)?;
        if expected != bundle.profile.username {
            warn!(
                url_username = %expected,
                bundle_username = %bundle.profile.username,
                "Profile URL does not match the bundle username"
            );
        }
    }

    info!(
        username = %bundle.profile.username,
        attributes = bundle.document.present_labels().len(),
        posts = bundle.meta.post_count,
        comments = bundle.meta.comment_count,
        "Bundle loaded"
    );

    let output_dir = config.output_dir();
    fs::create_dir_all(&output_dir).map_err(|e| Error::IoWrite {
        path: output_dir.clone(),
        source: e,
    })?;

    let timestamp = bundle.meta.analyzed_at.format("%Y%m%d_%H%M%S");

    if !no_report {
        let report_path = output_dir.join(format!(
            "persona_{}_{}.{}",
            bundle.profile.username,
            timestamp,
            report_extension(config.report_format()?)
        ));
        write_report(config, &bundle, &report_path)?;
        println!("Report written: {}", report_path.display());
    }

    if !no_card {
        let card_path = output_dir.join(format!(
            "persona_card_{}_{}.png",
            bundle.profile.username, timestamp
        ));
        write_card(config, &bundle, &card_path)?;
        println!("Card written: {}", card_path.display());
    }

    Ok(())
}

fn write_report(config: &AppConfig, bundle: &Bundle, path: &PathBuf) -> Result<()> {
    let renderer = ReportRenderer::new(config.report_format()?);
    let report = renderer.render(
        &bundle.document,
        &bundle.profile,
        &bundle.records,
        &bundle.meta,
    )?;
    fs::write(path, report).map_err(|e| Error::IoWrite {
        path: path.clone(),
        source: e,
    })?;
    info!(path = %path.display(), "Report written");
    Ok(())
}

fn write_card(config: &AppConfig, bundle: &Bundle, path: &PathBuf) -> Result<()> {
    let (regular, bold) = config.font_paths();
    let fonts = FontProvider::load(regular, bold)?;
    let renderer = CardRenderer::new(config.card_style()?, fonts);
    let fetcher = HttpImageFetcher::new(config.avatar.timeout_secs)?;

    let artifact = renderer.render(&bundle.document, &bundle.profile, &fetcher)?;
    let png = CardRenderer::encode_png(&artifact.image)?;
    fs::write(path, png).map_err(|e| Error::IoWrite {
        path: path.clone(),
        source: e,
    })?;
    info!(
        path = %path.display(),
        sections = artifact.sections.len(),
        "Card written"
    );
    Ok(())
}

fn report_extension(format: ReportFormat) -> &'static str {
    match format {
        ReportFormat::Text => "txt",
        ReportFormat::Markdown => "md",
    }
}

/// Handle config subcommands
fn handle_config_command(subcommand: ConfigSubcommand) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show { config } => {
            let cfg = AppConfig::load(config.as_deref())?;
            let toml_str = toml::to_string_pretty(&cfg)?;
            println!("{}", toml_str);
            Ok(())
        }
        ConfigSubcommand::Init { path, force } => config::init_config(path.as_deref(), force),
        ConfigSubcommand::Validate { config } => {
            let cfg = AppConfig::load(config.as_deref())?;
            cfg.validate()?;
            println!("Configuration is valid");
            Ok(())
        }
    }
}
