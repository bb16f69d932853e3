use std::fs;

use anyhow::{Context, Result, bail};
use shared::config::ClientConfig;

/// Writes a configuration file with default values in the given format.
///
/// # Errors
/// Returns an error if the format is unsupported or if writing the file fails.
pub fn generate_config(format: &str) -> Result<()> {
    let config = ClientConfig::with_defaults();
    let (file_name, serialized) = match format {
        "yaml" => ("fabricator.yaml", serde_yml::to_string(&config)?),
        "json" => ("fabricator.json", serde_json::to_string_pretty(&config)?),
        _ => bail!("Unsupported format. Use 'yaml' or 'json'."),
    };

    fs::write(file_name, serialized).with_context(|| format!("failed to write {file_name}"))?;
    println!("Configuration file '{file_name}' generated successfully.");
    Ok(())
}
