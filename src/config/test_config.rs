use super::{Config, RouterBox};
use std::time::Duration;

/// Creates a new test configuration.
///
/// Binds the event intake on an ephemeral local port and configures two
/// exchanges; trace limits are the defaults.
pub fn new_test_config() -> Config {
    Config {
        router: RouterBox {
            env: super::TEST.to_string(),
            logs: Some(super::Logs {
                level: Some("debug".to_string()),
            }),
            runtime: Some(super::Runtime { num_cpus: 2 }),
            api: Some(super::Api {
                name: Some("bidrouter".to_string()),
                port: Some("8091".to_string()),
            }),
            transport: super::Transport {
                addr: "127.0.0.1:0".to_string(),
            },
            k8s: Some(super::K8S {
                probe: super::Probe {
                    timeout: Some(Duration::from_secs(5)),
                },
            }),
            loss_timeout: Duration::from_secs(15),
            max_bid_price: 200.0,
            debug: false,
            log_auctions: false,
            log_bids: false,
            slow_mode: super::SlowMode { threshold: 0 },
            exchange_configuration: None,
            exchanges: vec![
                super::Exchange::new("mock"),
                super::Exchange {
                    name: Some("openrtb-east".to_string()),
                    ..super::Exchange::new("openrtb")
                },
            ],
            traces: super::Traces::default(),
        },
    }
}
