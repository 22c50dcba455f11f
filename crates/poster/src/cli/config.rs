use dp_domain::config::{Config, ConfigSeverity};

/// Print every config issue.  Returns `false` when any is an error.
pub fn validate(config: &Config, config_path: &str) -> bool {
    let issues = config.validate();

    if issues.is_empty() {
        println!("Config OK ({config_path})");
        return true;
    }

    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();
    let warning_count = issues.len() - error_count;

    for issue in &issues {
        println!("{issue}");
    }
    println!("\n{error_count} error(s), {warning_count} warning(s) in {config_path}");

    error_count == 0
}

/// The resolved config, defaults filled in, as TOML.  Inline secrets are
/// masked.
pub fn render(config: &Config) -> anyhow::Result<String> {
    let mut shown = config.clone();
    if shown.telegram.token.is_some() {
        shown.telegram.token = Some("********".into());
    }
    Ok(toml::to_string_pretty(&shown)?)
}

pub fn show(config: &Config) -> anyhow::Result<()> {
    print!("{}", render(config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_masks_inline_token() {
        let mut config = Config::default();
        config.telegram.token = Some("123:secret".into());
        let out = render(&config).unwrap();
        assert!(!out.contains("123:secret"));
        assert!(out.contains("posting_start_hour = 4"));
    }
}
