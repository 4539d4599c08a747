use crate::config::types::{Config, NavigationConfig, NavigatorBackend, OutputConfig, SiteConfig};
use crate::url::SiteScope;
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_output_config(&config.output)?;
    validate_navigation_config(&config.navigation)?;
    Ok(())
}

/// Validates the crawl target
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    validate_domain_string(&config.domain)?;

    let root = Url::parse(&config.root_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root-url: {}", e)))?;

    if root.scheme() != "https" && root.scheme() != "http" {
        return Err(ConfigError::Validation(format!(
            "root-url '{}' must use http or https",
            config.root_url
        )));
    }

    // Child output paths are derived by stripping the root as a string prefix
    if !config.root_url.ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "root-url '{}' must end with '/'",
            config.root_url
        )));
    }

    if !SiteScope::from_site(config).contains(&config.root_url) {
        return Err(ConfigError::Validation(format!(
            "root-url '{}' is not on domain '{}'",
            config.root_url, config.domain
        )));
    }

    Selector::parse(&config.main_content_selector).map_err(|e| {
        ConfigError::Validation(format!(
            "main-content-selector '{}' is not a valid CSS selector: {:?}",
            config.main_content_selector, e
        ))
    })?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates navigator settings
fn validate_navigation_config(config: &NavigationConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.backend == NavigatorBackend::WebDriver {
        let endpoint = Url::parse(&config.webdriver_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid webdriver-url: {}", e)))?;
        if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "webdriver-url '{}' must use http or https",
                config.webdriver_url
            )));
        }
    }

    Ok(())
}

/// Validates a domain string, optionally carrying a `:port` suffix
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    let (host, port) = match domain.split_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (domain, None),
    };

    if let Some(port) = port {
        if port.is_empty() || port.parse::<u16>().is_err() {
            return Err(ConfigError::InvalidPattern(format!(
                "Domain '{}' has an invalid port",
                domain
            )));
        }
    }

    if !host
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if host.starts_with('.') || host.ends_with('.') || host.starts_with('-') || host.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if host.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    if !host.contains('.') {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must contain at least one dot (e.g., 'example.com')",
            domain
        )));
    }

    Ok(())
}
