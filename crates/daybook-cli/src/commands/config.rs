//! Configuration commands.

use std::path::Path;

use crate::config::DaybookConfig;
use crate::error::{CliError, CliResult};

/// Renders the effective configuration as TOML.
fn render(config: &DaybookConfig, path: &Path) -> CliResult<String> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| CliError::config(format!("failed to serialize config: {}", e)))?;
    Ok(format!("# config.toml ({})\n{}", path.display(), toml_str))
}

/// Dump the current configuration to stdout.
pub fn dump(config: &DaybookConfig, path: Option<&Path>) -> CliResult<()> {
    let default_path = DaybookConfig::default_path();
    println!("{}", render(config, path.unwrap_or(&default_path))?);
    Ok(())
}

/// Show the configuration file path.
pub fn path(path: Option<&Path>) -> CliResult<()> {
    match path {
        Some(path) => println!("config: {}", path.display()),
        None => println!("config: {}", DaybookConfig::default_path().display()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_all_sections() {
        let text = render(&DaybookConfig::default(), Path::new("/etc/daybook.toml")).unwrap();
        assert!(text.starts_with("# config.toml (/etc/daybook.toml)\n"));
        assert!(text.contains("header_prefix = \"SC\""));
        assert!(text.contains("[logging]"));
        assert!(text.contains("format = \"compact\""));
        assert!(text.contains("[occurrences]"));
        assert!(text.contains("default_days = 30"));
    }
}
