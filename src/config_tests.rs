//! Tests for configuration

#[cfg(test)]
mod tests {
    use super::super::config::*;
    use crate::scanner::PricePolicy;
    use crate::types::Category;
    use rust_decimal_macros::dec;

    #[test]
    fn test_safety_config_default() {
        let config = SafetyConfig::default();
        assert_eq!(config.max_trades_per_day, 5);
        assert_eq!(config.cooldown_minutes_between_trades, 30.0);
        assert_eq!(config.require_human_approval_above_usd, dec!(10));
    }

    #[test]
    fn test_safety_config_missing_keys_use_defaults() {
        let toml_str = r#"
max_trades_per_day = 2
"#;
        let config: SafetyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.max_trades_per_day, 2);
        assert_eq!(config.cooldown_minutes_between_trades, 30.0);
        assert_eq!(config.require_human_approval_above_usd, dec!(10));
    }

    #[test]
    fn test_safety_config_deserialize() {
        let toml_str = r#"
max_trades_per_day = 3
cooldown_minutes_between_trades = 45.5
require_human_approval_above_usd = 25
"#;
        let config: SafetyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.max_trades_per_day, 3);
        assert_eq!(config.cooldown_minutes_between_trades, 45.5);
        assert_eq!(config.require_human_approval_above_usd, dec!(25));
    }

    #[test]
    fn test_safety_config_from_json_document() {
        let json = r#"{"max_trades_per_day": 4, "cooldown_minutes_between_trades": 15}"#;
        let config: SafetyConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.max_trades_per_day, 4);
        assert_eq!(config.cooldown_minutes_between_trades, 15.0);
        assert_eq!(config.require_human_approval_above_usd, dec!(10));
    }

    #[test]
    fn test_scanner_config_defaults() {
        let config: ScannerConfig = toml::from_str("").unwrap();
        assert_eq!(config.min_volume, dec!(10000));
        assert_eq!(config.min_liquidity, dec!(1000));
        assert_eq!(config.min_odds, dec!(0.10));
        assert_eq!(config.max_odds, dec!(0.90));
        assert_eq!(config.limit, 20);
        assert_eq!(config.price_policy, PricePolicy::Strict);
        assert!(config.categories.is_empty());
        assert!(config.exclude_categories.is_empty());
    }

    #[test]
    fn test_scanner_config_with_categories() {
        let toml_str = r#"
min_volume = 500
price_policy = "assume_even"
categories = ["politics", "economics"]
exclude_categories = ["sports"]
"#;
        let config: ScannerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.min_volume, dec!(500));
        assert_eq!(config.price_policy, PricePolicy::AssumeEven);

        let filters = config.to_filters();
        assert_eq!(filters.min_volume, dec!(500));
        assert_eq!(filters.odds_range, (dec!(0.10), dec!(0.90)));
        assert!(filters.allowed_categories.contains(&Category::Politics));
        assert!(filters.allowed_categories.contains(&Category::Economics));
        assert!(filters.excluded_categories.contains(&Category::Sports));
        assert!(filters.query.is_none());
    }

    #[test]
    fn test_gamma_config_defaults() {
        let config: GammaConfig = toml::from_str("").unwrap();
        assert_eq!(config.base_url, "https://gamma-api.polymarket.com");
        assert_eq!(config.page_size, 100);
        assert_eq!(config.max_markets, 500);
        assert_eq!(config.timeout_secs, 15);
    }

    #[test]
    fn test_full_config_sections_optional() {
        let toml_str = r#"
[safety]
max_trades_per_day = 1

[state]
path = "data/state.json"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.safety.max_trades_per_day, 1);
        assert_eq!(config.state.path, "data/state.json");
        assert_eq!(config.scanner.limit, 20);
        assert_eq!(config.gamma.page_size, 100);
    }

    #[test]
    fn test_state_path_expansion() {
        let config = StateConfig {
            path: "plain/state.json".to_string(),
        };
        assert_eq!(config.resolved_path(), std::path::PathBuf::from("plain/state.json"));

        if let Some(home) = std::env::var_os("HOME") {
            let config = StateConfig {
                path: "~/state.json".to_string(),
            };
            assert_eq!(config.resolved_path(), std::path::PathBuf::from(home).join("state.json"));
        }
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.scanner.limit, 20);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scanner.toml");
        std::fs::write(
            &path,
            r#"
[scanner]
limit = 7

[safety]
cooldown_minutes_between_trades = 5.0
"#,
        )
        .unwrap();

        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.scanner.limit, 7);
        assert_eq!(config.safety.cooldown_minutes_between_trades, 5.0);
        assert_eq!(config.safety.max_trades_per_day, 5);
    }
}
