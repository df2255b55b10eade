//! Tests for core types

#[cfg(test)]
mod tests {
    use super::super::types::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    #[test]
    fn test_side_serialization() {
        assert_eq!(serde_json::to_string(&Side::Buy).unwrap(), "\"BUY\"");
        assert_eq!(serde_json::to_string(&Side::Sell).unwrap(), "\"SELL\"");
    }

    #[test]
    fn test_outcome_deserialization() {
        let yes: Outcome = serde_json::from_str("\"YES\"").unwrap();
        let no: Outcome = serde_json::from_str("\"NO\"").unwrap();
        assert_eq!(yes, Outcome::Yes);
        assert_eq!(no, Outcome::No);
    }

    #[test]
    fn test_category_round_trips_through_str() {
        for name in [
            "sports", "crypto", "politics", "economics", "geopolitics", "tech", "entertainment", "other",
        ] {
            let category: Category = name.parse().unwrap();
            assert_eq!(category.as_str(), name);
            assert_eq!(serde_json::to_string(&category).unwrap(), format!("\"{}\"", name));
        }
        assert_eq!(" Crypto ".parse::<Category>(), Ok(Category::Crypto));
        assert!("weather".parse::<Category>().is_err());
        assert_eq!(Category::default(), Category::Other);
    }

    #[test]
    fn test_valid_token_ids() {
        assert!(is_valid_token_id("123456789"));
        assert!(is_valid_token_id("0xabc123"));
        assert!(is_valid_token_id("0xABCDEF"));
        assert!(!is_valid_token_id(""));
        assert!(!is_valid_token_id("0x"));
        assert!(!is_valid_token_id("0xxyz"));
        assert!(!is_valid_token_id("abc123"));
        assert!(!is_valid_token_id("12 34"));
    }

    #[test]
    fn test_order_intent_validation() {
        let intent = make_intent(Some(dec!(0.45)), dec!(5));
        assert!(intent.validate().is_ok());

        assert!(make_intent(Some(dec!(0.001)), dec!(5)).validate().is_err());
        assert!(make_intent(Some(dec!(1.0)), dec!(5)).validate().is_err());
        assert!(make_intent(Some(dec!(0.50)), dec!(0)).validate().is_err());

        let mut bad_token = make_intent(None, dec!(5));
        bad_token.token_id = "not-a-token".to_string();
        assert!(bad_token.validate().is_err());
    }

    #[test]
    fn test_market_order_effective_price() {
        let mut intent = make_intent(None, dec!(5));
        assert_eq!(intent.effective_price(), dec!(0.99));
        intent.side = Side::Sell;
        assert_eq!(intent.effective_price(), dec!(0.01));
        intent.price = Some(dec!(0.37));
        assert_eq!(intent.effective_price(), dec!(0.37));
    }

    #[test]
    fn test_intent_into_record() {
        let now = Utc::now();
        let record = make_intent(Some(dec!(0.40)), dec!(7.5)).into_record("market-1", Some("order-9".into()), now);
        assert_eq!(record.market_id, "market-1");
        assert_eq!(record.token_id, "123456");
        assert_eq!(record.price, dec!(0.40));
        assert_eq!(record.size_usd, dec!(7.5));
        assert_eq!(record.timestamp, now);
        assert_eq!(record.order_id.as_deref(), Some("order-9"));
        assert!(!record.id.is_empty());
    }

    #[test]
    fn test_opportunity_helpers() {
        let mut token_ids = BTreeMap::new();
        token_ids.insert("yes".to_string(), "111".to_string());
        token_ids.insert("no".to_string(), "222".to_string());
        let opp = Opportunity {
            question: "Test?".to_string(),
            identifier: "m1".to_string(),
            slug: "test-market".to_string(),
            yes_price: dec!(0.6),
            no_price: dec!(0.4),
            price_source: PriceSource::OutcomePrices,
            volume_total: dec!(100),
            volume_24h: dec!(10),
            liquidity: dec!(50),
            end_time: None,
            token_ids,
            event_title: None,
            category: Category::Other,
            score: None,
        };
        assert_eq!(opp.url(), "https://polymarket.com/event/test-market");
        assert_eq!(opp.token_id(Outcome::Yes), Some("111"));
        assert_eq!(opp.token_id(Outcome::No), Some("222"));
        assert_eq!(opp.score_or_min(), f64::NEG_INFINITY);

        let json = serde_json::to_value(&opp).unwrap();
        assert_eq!(json["price_source"], "outcome_prices");
        assert_eq!(json["category"], "other");
        assert!(json.get("event_title").is_none());
    }

    fn make_intent(price: Option<rust_decimal::Decimal>, size_usd: rust_decimal::Decimal) -> OrderIntent {
        OrderIntent {
            token_id: "123456".to_string(),
            side: Side::Buy,
            outcome: Outcome::Yes,
            price,
            size_usd,
        }
    }
}
