use std::collections::HashSet;

use super::{types::Config, ConfigError};
use crate::offer::Mode;

/// Last hour of day a synthesized offer may depart at.
const LAST_DEPARTURE_HOUR: u64 = 23;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Synthesis currency is a three-letter uppercase code
/// - Synthesis offer counts and direct probability are in range
/// - Every synthesized departure falls on the requested date
/// - The highest synthesized price fits in a `u32`
/// - Provider ids and names are non-empty and ids are unique
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    let synthesis = &config.search.synthesis;
    if synthesis.currency.len() != 3 || !synthesis.currency.chars().all(|c| c.is_ascii_uppercase())
    {
        return Err(ConfigError::ValidationError(format!(
            "search.synthesis.currency must be a three-letter code, got {:?}",
            synthesis.currency
        )));
    }
    if synthesis.min_offers_per_provider > synthesis.max_offers_per_provider {
        return Err(ConfigError::ValidationError(
            "search.synthesis.min_offers_per_provider exceeds max_offers_per_provider".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&synthesis.direct_probability) {
        return Err(ConfigError::ValidationError(
            "search.synthesis.direct_probability must be between 0 and 1".to_string(),
        ));
    }
    if synthesis.latest_departure_hour() > LAST_DEPARTURE_HOUR {
        return Err(ConfigError::ValidationError(format!(
            "search.synthesis departure hours reach {}:00, past the end of the departure date",
            synthesis.latest_departure_hour()
        )));
    }
    let max_price = [Mode::Flight, Mode::Train]
        .into_iter()
        .map(|mode| synthesis.max_price(mode, config.providers.len()))
        .max()
        .unwrap_or(0);
    if max_price > u64::from(u32::MAX) {
        return Err(ConfigError::ValidationError(format!(
            "search.synthesis price terms allow a price of {}, above {}",
            max_price,
            u32::MAX
        )));
    }

    let mut seen = HashSet::new();
    for provider in &config.providers {
        if provider.id.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "providers.id cannot be empty".to_string(),
            ));
        }
        if provider.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "provider {} has an empty name",
                provider.id
            )));
        }
        if !seen.insert(provider.id.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate provider id: {}",
                provider.id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::NewProvider;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = Config::default();
        config.server.port = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_currency() {
        let mut config = Config::default();
        config.search.synthesis.currency = "inr".to_string();
        assert!(validate_config(&config).is_err());

        config.search.synthesis.currency = "EURO".to_string();
        assert!(validate_config(&config).is_err());

        config.search.synthesis.currency = "USD".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_offer_count_range() {
        let mut config = Config::default();
        config.search.synthesis.min_offers_per_provider = 5;
        config.search.synthesis.max_offers_per_provider = 3;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_direct_probability() {
        let mut config = Config::default();
        config.search.synthesis.direct_probability = 1.5;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_departures_past_midnight_fail() {
        let mut config = Config::default();
        config.search.synthesis.min_offers_per_provider = 6;
        config.search.synthesis.max_offers_per_provider = 6;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("departure hours"));

        // 6 + 4 * 4 + 1 = 23 is still on the same day
        config.search.synthesis.max_offers_per_provider = 5;
        config.search.synthesis.min_offers_per_provider = 5;
        config.search.synthesis.max_departure_jitter_hours = 1;
        assert!(validate_config(&config).is_ok());

        config.search.synthesis.first_departure_hour = 7;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_huge_spacing_fails() {
        let mut config = Config::default();
        config.search.synthesis.departure_spacing_hours = u32::MAX;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_price_overflow_fails() {
        let mut config = Config::default();
        config.search.synthesis.provider_position_increment = u32::MAX;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("price"));

        // A single provider never pays the position increment
        config.providers = vec![NewProvider::new("solo", "Solo", Mode::Flight)];
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_stop_surcharge_overflow_fails() {
        let mut config = Config::default();
        config.search.synthesis.stop_surcharge = u32::MAX / 2;
        config.search.synthesis.connecting_stops = 3;
        assert!(validate_config(&config).is_err());

        // Never charged when every offer is direct
        config.search.synthesis.direct_probability = 1.0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_markup_near_limit() {
        let mut config = Config::default();
        config.search.synthesis.max_markup = u32::MAX;
        assert!(validate_config(&config).is_err());

        config.search.synthesis.max_markup = u32::MAX - 3500 - 500 - 150 * 6;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_duplicate_provider() {
        let mut config = Config::default();
        config.providers = vec![
            NewProvider::new("a", "A", Mode::Flight),
            NewProvider::new("a", "Again", Mode::Train),
        ];
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("duplicate provider id"));
    }

    #[test]
    fn test_validate_empty_provider_id() {
        let mut config = Config::default();
        config.providers = vec![NewProvider::new(" ", "Blank", Mode::Flight)];
        assert!(validate_config(&config).is_err());
    }
}
