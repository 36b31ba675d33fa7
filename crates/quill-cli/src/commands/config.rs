//! Config command handlers

use anyhow::{Context, Result};

use quill_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(output: &Output) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "view_transitions": config.view_transitions,
                    "rerender": config.rerender,
                    "toast_timeout_ms": config.toast_timeout_ms,
                    "seed_samples": config.seed_samples,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            println!("Configuration:");
            println!("  data_dir:         {}", config.data_dir.display());
            println!("  view_transitions: {}", config.view_transitions);
            println!("  rerender:         {:?}", config.rerender);
            println!("  toast_timeout_ms: {}", config.toast_timeout_ms);
            println!("  seed_samples:     {}", config.seed_samples);
            println!(
                "  log_file:         {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", Config::config_file_path().display());
        }
    }

    Ok(())
}
