//! PromptKit - prompt set resolution and composition
//!
//! CLI entry point for listing, composing and rendering prompts.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use tracing::{debug, info};

use promptkit::cli::{Cli, Command, OutputFormat, args_to_map, get_log_path};
use promptkit::config::{Config, Settings};
use promptkit::context::{PromptContext, Source};
use promptkit::render::Renderer;
use promptkit::{ComposeOptions, CompositionOrder};

fn parse_level(level: Option<&str>) -> tracing::Level {
    match level.map(|s| s.to_uppercase()).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    }
}

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Priority: CLI --log-level > config file > default (INFO)
    let level = parse_level(cli_log_level.or(config_log_level));
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    let log_path = get_log_path();
    let log_file = log_path
        .parent()
        .map(fs::create_dir_all)
        .transpose()
        .and_then(|_| fs::File::create(&log_path));

    match log_file {
        Ok(file) => tracing_subscriber::fmt()
            .with_writer(file)
            .with_ansi(false)
            .with_env_filter(filter)
            .init(),
        Err(e) => {
            eprintln!("Warning: cannot write {} ({}), logging to stderr", log_path.display(), e);
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .init()
        }
    }

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(
        prompts_folder = ?config.prompts.prompts_folder,
        prompt_set_folder = ?config.prompts.prompt_set_folder,
        "PromptKit loaded config"
    );

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Sets { format } => cmd_sets(&config.prompts, format),
        Command::Scan { format } => cmd_scan(&config.prompts, format),
        Command::Show {
            path,
            file,
            prompts,
            separator,
            order,
        } => cmd_show(config.prompts, &path, source_for(&path, file, prompts), separator, order),
        Command::Render {
            path,
            file,
            prompts,
            args,
        } => cmd_render(config.prompts, &path, source_for(&path, file, prompts), &args),
        Command::Config => cmd_config(&config),
    }
}

fn source_for(path: &str, file: bool, prompts: bool) -> Source {
    if file {
        Source::File(PathBuf::from(path))
    } else if prompts {
        Source::PromptsFolder
    } else {
        Source::SetFolder
    }
}

fn cmd_sets(settings: &Settings, format: OutputFormat) -> Result<()> {
    let ctx = PromptContext::load(settings.clone(), Source::SetFolder);
    let tree = ctx.tree().ok_or_else(|| eyre!("Set folder source did not produce a tree"))?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(tree)?);
        return Ok(());
    }

    if tree.is_empty() {
        println!("No prompt sets found in {}", settings.prompt_set_folder.display());
        return Ok(());
    }

    for (set_name, buckets) in tree.iter() {
        println!("{}", set_name.bold());
        for (bucket_name, set) in buckets {
            println!("  {}", bucket_name.cyan());
            for (name, entry) in set.prompts.iter() {
                println!("    {} {}", name, format!("({})", entry.format()).dimmed());
            }
        }
    }
    Ok(())
}

fn cmd_scan(settings: &Settings, format: OutputFormat) -> Result<()> {
    let ctx = PromptContext::load(settings.clone(), Source::PromptsFolder);
    let prompts = ctx.prompts().ok_or_else(|| eyre!("Prompts folder source did not produce prompts"))?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&prompts.prompts)?);
        return Ok(());
    }

    if prompts.is_empty() {
        println!("No prompts found in {}", settings.prompts_folder.display());
        return Ok(());
    }

    for (name, entry) in prompts.prompts.iter() {
        let vars = entry.variables();
        let suffix = if vars.is_empty() {
            String::new()
        } else {
            format!(" [{}]", vars.join(", "))
        };
        println!(
            "{} {}{}",
            name.bold(),
            format!("({}, {} bytes)", entry.format(), entry.text().len()).dimmed(),
            suffix.yellow()
        );
    }
    Ok(())
}

fn cmd_show(
    mut settings: Settings,
    path: &str,
    source: Source,
    separator: Option<String>,
    order: Option<CompositionOrder>,
) -> Result<()> {
    if let Some(order) = order {
        settings.order = order;
    }
    let options = ComposeOptions {
        order: settings.order,
        ordered_keys: settings.prompt_order.clone(),
        separator,
    };

    let ctx = PromptContext::load(settings, source);
    let selection = ctx
        .select(path)
        .with_context(|| format!("Failed to select {}", path))?
        .with_options(options);

    println!("{}", selection);
    Ok(())
}

fn cmd_render(settings: Settings, path: &str, source: Source, args: &[(String, String)]) -> Result<()> {
    let ctx = PromptContext::load(settings, source);
    let selection = ctx.select(path).with_context(|| format!("Failed to select {}", path))?;
    let (name, entry) = selection
        .entry()
        .ok_or_else(|| eyre!("'{}' selects a prompt set; render needs a single prompt", path))?;

    let rendered = Renderer::new()
        .render_entry(name, entry, &args_to_map(args))
        .with_context(|| format!("Failed to render {}", path))?;

    println!("{}", rendered);
    Ok(())
}

fn cmd_config(config: &Config) -> Result<()> {
    print!("{}", serde_yaml::to_string(config)?);
    Ok(())
}
