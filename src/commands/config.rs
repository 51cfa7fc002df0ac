use anyhow::Result;
use colored::Colorize;

use crate::core::config::Config;

pub struct ConfigOptions {
    pub snippet_radius: Option<usize>,
    pub max_file_size: Option<u64>,
    pub log_level: Option<String>,
    pub show: bool,
    pub reset: bool,
}

const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

pub async fn run(options: ConfigOptions) -> Result<()> {
    let mut config = Config::load()?;

    if options.reset {
        Config::default().save()?;
        println!("{}", "✓ Configuration reset to defaults".green());
        return Ok(());
    }

    if options.show {
        show_config(&config)?;
        return Ok(());
    }

    let mut updated = false;

    if let Some(radius) = options.snippet_radius {
        config.snippet_radius = radius;
        updated = true;
        println!("{}", "✓ Snippet radius updated".green());
    }

    if let Some(limit) = options.max_file_size {
        // 0 clears the limit
        config.max_file_size = if limit == 0 { None } else { Some(limit) };
        updated = true;
        println!("{}", "✓ Max file size updated".green());
    }

    if let Some(level) = options.log_level {
        let level = level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            println!(
                "{}",
                format!("Error: log level must be one of {}", LOG_LEVELS.join(", ")).red()
            );
            return Ok(());
        }
        config.log_level = Some(level);
        updated = true;
        println!("{}", "✓ Log level updated".green());
    }

    if updated {
        config.save()?;
    } else {
        show_config(&config)?;
    }

    Ok(())
}

fn show_config(config: &Config) -> Result<()> {
    println!("{}", "kwsearch configuration".bold());
    println!();

    println!(
        "  {} {}",
        "Config file:".dimmed(),
        Config::config_path()?.display()
    );
    println!("  {} {}", "Snippet radius:".dimmed(), config.snippet_radius);

    match config.max_file_size {
        Some(limit) => println!("  {} {} bytes", "Max file size:".dimmed(), limit),
        None => println!("  {} {}", "Max file size:".dimmed(), "(unlimited)".yellow()),
    }

    match config.log_level {
        Some(ref level) => println!("  {} {}", "Log level:".dimmed(), level),
        None => println!("  {} {}", "Log level:".dimmed(), "(default: warn)".yellow()),
    }

    println!();
    println!("{}", "Environment variables:".dimmed());

    for var in ["KWSEARCH_SNIPPET_RADIUS", "KWSEARCH_MAX_FILE_SIZE", "RUST_LOG"] {
        if let Ok(value) = std::env::var(var) {
            println!("  {} {}", format!("{}:", var).dimmed(), value);
        }
    }

    Ok(())
}
