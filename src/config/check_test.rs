// Package config provides tests for configuration loading and checks.
//

#[cfg(test)]
mod tests {
    use crate::config::{check, new_test_config, Config, ConfigTrait, Severity};
    use crate::governor::{Regime, TraceCategory, TraceRateSpec};
    use std::io::Write;
    use std::time::Duration;

    const MINIMAL_YAML: &str = r#"
router:
  env: dev
  transport:
    addr: "127.0.0.1:9950"
  exchanges:
    - exchangeType: mock
"#;

    #[test]
    fn test_test_config_is_clean() {
        assert!(check(&new_test_config()).is_empty());
    }

    #[test]
    fn test_minimal_document_gets_defaults() {
        let cfg = Config::from_yaml(MINIMAL_YAML).unwrap();

        assert_eq!(cfg.router.loss_timeout, Duration::from_secs(15));
        assert_eq!(cfg.router.max_bid_price, 200.0);
        let rates = cfg.traces().rates();
        assert_eq!(
            *rates.get(TraceCategory::AuctionMetric, Regime::Slow),
            TraceRateSpec::new(1000, 100, 5, false)
        );
        assert_eq!(
            *rates.get(TraceCategory::BidMetric, Regime::Normal),
            TraceRateSpec::new(250, 25, 10, false)
        );
        assert!(check(&cfg).is_empty());
    }

    #[test]
    fn test_trace_document_shape() {
        let yaml = r#"
router:
  env: prod
  loss_timeout: 2s
  transport:
    addr: "0.0.0.0:9950"
  traces:
    metrics:
      auction:
        normal: { max: 3, min: 1, mod: 2 }
        slow: { max: 6, min: 2, mod: 2, all: true }
"#;
        let cfg = Config::from_yaml(yaml).unwrap();

        assert!(cfg.is_prod());
        assert_eq!(cfg.router.loss_timeout, Duration::from_secs(2));
        let rates = cfg.traces().rates();
        assert_eq!(
            *rates.get(TraceCategory::AuctionMetric, Regime::Normal),
            TraceRateSpec::new(3, 1, 2, false)
        );
        assert_eq!(
            *rates.get(TraceCategory::AuctionMetric, Regime::Slow),
            TraceRateSpec::new(6, 2, 2, true)
        );
        // Untouched channels keep their defaults.
        assert_eq!(
            *rates.get(TraceCategory::BidMetric, Regime::Slow),
            TraceRateSpec::new(500, 50, 5, false)
        );
    }

    #[test]
    fn test_unparseable_policy_is_a_load_error() {
        let yaml = r#"
router:
  env: dev
  transport: { addr: "127.0.0.1:1" }
  traces:
    metrics:
      auction:
        normal: { max: -1 }
        slow: { max: 1 }
"#;
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_min_above_max_is_an_error() {
        let mut cfg = new_test_config();
        cfg.router.traces.metrics.bid.slow = TraceRateSpec::new(5, 6, 0, false);

        let issues = check(&cfg);

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
        assert_eq!(issues[0].path, "router.traces.metrics.bid.slow");
        assert_eq!(
            issues[0].to_string(),
            "error router.traces.metrics.bid.slow: min 6 is greater than max 5"
        );
    }

    #[test]
    fn test_min_above_unlimited_max_is_only_a_warning() {
        let mut cfg = new_test_config();
        cfg.router.traces.messages.auction.normal = TraceRateSpec::new(0, 6, 0, false);

        let issues = check(&cfg);

        assert!(!issues.is_empty());
        assert!(issues.iter().all(|i| i.severity == Severity::Warning));
    }

    #[test]
    fn test_warnings_do_not_hide_errors() {
        let mut cfg = new_test_config();
        cfg.router.debug = true;
        cfg.router.max_bid_price = f64::NAN;
        cfg.router.transport.addr = "nowhere".to_string();
        cfg.router.exchanges.clear();
        cfg.router.traces.metrics.auction.slow = TraceRateSpec::new(100, 10, 3, true);

        let issues = check(&cfg);
        let errors: Vec<_> = issues.iter().filter(|i| i.is_error()).map(|i| i.path.as_str()).collect();
        let warnings: Vec<_> = issues.iter().filter(|i| !i.is_error()).map(|i| i.path.as_str()).collect();

        assert_eq!(errors, vec!["router.max_bid_price", "router.transport.addr"]);
        assert!(warnings.contains(&"router.debug"));
        assert!(warnings.contains(&"router.exchanges"));
        assert!(warnings.contains(&"router.traces.metrics.auction"));
        assert!(warnings.contains(&"router.traces.metrics.auction.slow"));
    }

    #[test]
    fn test_empty_exchange_type_is_an_error() {
        let mut cfg = new_test_config();
        cfg.router.exchanges[1].exchange_type = " ".to_string();

        let issues = check(&cfg);

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "router.exchanges[1].exchangeType");
    }

    #[test]
    fn test_missing_exchange_file_is_an_error() {
        let mut cfg = new_test_config();
        cfg.router.exchange_configuration = Some("/definitely/not/here.json".into());

        let issues = check(&cfg);

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "router.exchange_configuration");
        assert!(issues[0].is_error());
    }

    #[test]
    fn test_load_resolves_exchange_file_next_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut ex = std::fs::File::create(dir.path().join("exchanges.json")).unwrap();
        write!(ex, r#"[{{"exchangeType": "rubicon"}}]"#).unwrap();
        let cfg_path = dir.path().join("bidrouter.cfg.yaml");
        std::fs::write(
            &cfg_path,
            "router:\n  env: test\n  transport: { addr: \"127.0.0.1:0\" }\n  exchange_configuration: exchanges.json\n",
        )
        .unwrap();

        let mut cfg = Config::load(&cfg_path).unwrap();
        assert!(check(&cfg).is_empty());
        cfg.resolve_exchanges().unwrap();

        assert_eq!(cfg.exchanges().len(), 1);
        assert_eq!(cfg.exchanges()[0].exchange_type, "rubicon");
    }
}
