//! Config command handlers

use anyhow::Result;

use userdir_core::Config;

use crate::output::{Output, OutputFormat};

/// Show the effective configuration
pub fn show(config: &Config, output: &Output) -> Result<()> {
    match output.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Quiet => {
            println!("{}", config.api.base_url);
        }
        OutputFormat::Human => {
            let api = &config.api;
            let pagination = &config.pagination;
            let rules = &config.validation;

            println!("API:");
            println!("  base_url:        {}", api.base_url);
            println!("  timeout_ms:      {}", api.timeout_ms);
            println!("  retry_attempts:  {}", api.retry_attempts);
            println!("  retry_delay_ms:  {}", api.retry_delay_ms);
            println!();
            println!("Pagination:");
            println!("  default_page_size: {}", pagination.default_page_size);
            println!(
                "  page_sizes:        {}",
                pagination
                    .page_sizes
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            println!("  max_visible_pages: {}", pagination.max_visible_pages);
            println!();
            println!("Validation:");
            println!(
                "  name length:       {}..={}",
                rules.min_name_length, rules.max_name_length
            );
            println!("  max email length:  {}", rules.max_email_length);
            println!("  max phone length:  {}", rules.max_phone_length);
            println!("  max website length: {}", rules.max_website_length);
            println!("  max department length: {}", rules.max_department_length);
            println!();
            println!("Config file: {}", Config::config_file_path().display());
        }
    }

    Ok(())
}
