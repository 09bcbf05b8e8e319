use crate::error::AppError;
use secrecy::SecretString;
use std::env;
use std::time::Duration;
use url::Url;

pub const DEFAULT_PLATFORM_URL: &str = "https://euw1.api.riotgames.com";
pub const DEFAULT_REGIONAL_URL: &str = "https://europe.api.riotgames.com";
const DEFAULT_THROTTLE_MS: u64 = 500;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug)]
pub struct Config {
    pub api_key: SecretString,
    /// Host for summoner lookups (e.g. euw1).
    pub platform_url: Url,
    /// Host for account and match-v5 lookups (e.g. europe).
    pub regional_url: Url,
    /// Minimum spacing between match detail requests.
    pub throttle_interval: Duration,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("RIOT_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AppError::ConfigError("RIOT_API_KEY not found in environment or .env file".to_string())
            })?;

        let platform_url = parse_base_url(
            "RIOT_PLATFORM_URL",
            lookup("RIOT_PLATFORM_URL").as_deref().unwrap_or(DEFAULT_PLATFORM_URL),
        )?;
        let regional_url = parse_base_url(
            "RIOT_REGIONAL_URL",
            lookup("RIOT_REGIONAL_URL").as_deref().unwrap_or(DEFAULT_REGIONAL_URL),
        )?;

        let throttle_ms = parse_number("RIOT_THROTTLE_MS", lookup("RIOT_THROTTLE_MS"), DEFAULT_THROTTLE_MS)?;
        let timeout_secs = parse_number(
            "RIOT_HTTP_TIMEOUT_SECS",
            lookup("RIOT_HTTP_TIMEOUT_SECS"),
            DEFAULT_TIMEOUT_SECS,
        )?;

        Ok(Config {
            api_key: SecretString::from(api_key),
            platform_url,
            regional_url,
            throttle_interval: Duration::from_millis(throttle_ms),
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Point both hosts at the given platform and its regional routing value.
    pub fn with_region(mut self, region: &str) -> Result<Self, AppError> {
        let region = region.trim().to_ascii_lowercase();
        if region.is_empty() || !region.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AppError::ConfigError(format!("Unknown region: {:?}", region)));
        }

        self.platform_url = parse_base_url("--region", &format!("https://{}.api.riotgames.com", region))?;
        self.regional_url = parse_base_url(
            "--region",
            &format!("https://{}.api.riotgames.com", regional_routing(&region)),
        )?;

        Ok(self)
    }
}

/// Maps a platform id to the routing value used by account and match-v5.
pub fn regional_routing(platform: &str) -> &'static str {
    match platform {
        "na1" | "br1" | "la1" | "la2" => "americas",
        "euw1" | "eun1" | "tr1" | "ru" | "me1" => "europe",
        "kr" | "jp1" => "asia",
        "oc1" | "ph2" | "sg2" | "th2" | "tw2" | "vn2" => "sea",
        _ => "americas", // default
    }
}

fn parse_base_url(name: &str, raw: &str) -> Result<Url, AppError> {
    let url = Url::parse(raw)
        .map_err(|e| AppError::ConfigError(format!("{} is not a valid URL ({}): {}", name, raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(AppError::ConfigError(format!(
            "{} must be an http(s) base URL, got {}",
            name, raw
        )));
    }

    Ok(url)
}

fn parse_number(name: &str, raw: Option<String>, default: u64) -> Result<u64, AppError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| AppError::ConfigError(format!("{} must be a whole number, got {:?}", name, value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_the_key_is_set() {
        let config = Config::from_lookup(lookup_from(&[("RIOT_API_KEY", "RGAPI-test")])).unwrap();

        assert_eq!(config.api_key.expose_secret(), "RGAPI-test");
        assert_eq!(config.platform_url.host_str(), Some("euw1.api.riotgames.com"));
        assert_eq!(config.regional_url.host_str(), Some("europe.api.riotgames.com"));
        assert_eq!(config.throttle_interval, Duration::from_millis(500));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn missing_or_blank_key_is_a_config_error() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));

        let err = Config::from_lookup(lookup_from(&[("RIOT_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_lookup(lookup_from(&[
            ("RIOT_API_KEY", "k"),
            ("RIOT_PLATFORM_URL", "http://127.0.0.1:8080"),
            ("RIOT_REGIONAL_URL", "http://127.0.0.1:8081/"),
            ("RIOT_THROTTLE_MS", "1200"),
            ("RIOT_HTTP_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.platform_url.port(), Some(8080));
        assert_eq!(config.regional_url.port(), Some(8081));
        assert_eq!(config.throttle_interval, Duration::from_millis(1200));
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn bad_values_are_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("RIOT_API_KEY", "k"),
            ("RIOT_PLATFORM_URL", "not a url"),
        ]))
        .unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));

        let err = Config::from_lookup(lookup_from(&[
            ("RIOT_API_KEY", "k"),
            ("RIOT_REGIONAL_URL", "mailto:someone@example.com"),
        ]))
        .unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));

        let err = Config::from_lookup(lookup_from(&[
            ("RIOT_API_KEY", "k"),
            ("RIOT_THROTTLE_MS", "fast"),
        ]))
        .unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn region_selects_platform_and_routing_hosts() {
        let config = Config::from_lookup(lookup_from(&[("RIOT_API_KEY", "k")]))
            .unwrap()
            .with_region("KR")
            .unwrap();

        assert_eq!(config.platform_url.host_str(), Some("kr.api.riotgames.com"));
        assert_eq!(config.regional_url.host_str(), Some("asia.api.riotgames.com"));

        let err = Config::from_lookup(lookup_from(&[("RIOT_API_KEY", "k")]))
            .unwrap()
            .with_region("eu west")
            .unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn routing_table() {
        assert_eq!(regional_routing("na1"), "americas");
        assert_eq!(regional_routing("eun1"), "europe");
        assert_eq!(regional_routing("jp1"), "asia");
        assert_eq!(regional_routing("oc1"), "sea");
        assert_eq!(regional_routing("unknown"), "americas");
    }
}
