//! Configuration commands.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::secret::SecretRef;

/// Dump the current configuration to stdout.
///
/// Literal API keys are redacted; secret references are printed as written.
pub fn dump(config: &ClientConfig) -> ClientResult<()> {
    println!("# config.toml ({})", ClientConfig::default_path().display());
    println!("{}", render_dump(config)?);
    Ok(())
}

/// Serializes `config` with the API key redacted.
pub fn render_dump(config: &ClientConfig) -> ClientResult<String> {
    let mut shown = config.clone();
    shown.lastfm.api_key = shown
        .lastfm
        .api_key
        .as_deref()
        .map(|key| SecretRef::parse(key).redacted());

    toml::to_string_pretty(&shown)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))
}

/// Validate the configuration.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    check(config)?;
    println!("Last.fm API key resolves.");
    println!("Configuration is valid.");
    Ok(())
}

/// Checks every setting that can be wrong, without touching the network.
pub fn check(config: &ClientConfig) -> ClientResult<()> {
    config.lastfm.to_provider_config()?;
    config.display.palette()?;
    config.display.offset()?;

    if config.fetch.max_pages == 0 {
        return Err(ClientError::Config(
            "fetch.max_pages must be at least 1".to_string(),
        ));
    }
    if config.fetch.workers == 0 {
        return Err(ClientError::Config(
            "fetch.workers must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Show the configuration file path.
pub fn path() -> ClientResult<()> {
    let config_path = ClientConfig::default_path();
    println!("config: {}", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ClientConfig {
        let mut config = ClientConfig::default();
        config.lastfm.api_key = Some("literal-key".to_string());
        config
    }

    #[test]
    fn dump_redacts_literal_key() {
        let out = render_dump(&valid()).unwrap();
        assert!(!out.contains("literal-key"));
        assert!(out.contains("api_key = \"<redacted>\""));
        assert!(out.contains("[fetch]"));
    }

    #[test]
    fn dump_keeps_references() {
        let mut config = valid();
        config.lastfm.api_key = Some("env::LASTFM_API_KEY".to_string());
        let out = render_dump(&config).unwrap();
        assert!(out.contains("env::LASTFM_API_KEY"));
    }

    #[test]
    fn check_accepts_valid_config() {
        assert!(check(&valid()).is_ok());
    }

    #[test]
    fn check_rejects_bad_values() {
        let mut config = valid();
        config.display.palette = "rainbow".to_string();
        assert!(check(&config).is_err());

        let mut config = valid();
        config.fetch.workers = 0;
        assert!(check(&config).is_err());

        let mut config = valid();
        config.fetch.max_pages = 0;
        assert!(check(&config).is_err());

        let mut config = valid();
        config.lastfm.base_url = Some("::not a url".to_string());
        assert!(check(&config).is_err());
    }
}
