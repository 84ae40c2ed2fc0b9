// Integration tests for the router lifecycle over a real intake socket.

use crate::config::new_test_config;
use crate::governor::{Governor, Regime, TraceCategory};
use crate::lifecycle::{LifecycleError, State, ValidationMode};
use crate::support::{running_app, running_app_with, test_app, IntakeClient};

#[tokio::test]
async fn test_events_are_acknowledged_and_sampled() {
    let (t, addr) = running_app().await;
    assert_eq!(t.app.lifecycle().state(), State::Running);

    let mut client = IntakeClient::connect(addr).await;
    assert_eq!(client.send("auction a-1").await, "ack a-1");
    assert_eq!(client.send("bid b-1").await, "ack b-1");
    assert_eq!(client.send("win w-1").await, "err unknown event kind \"win\"");
    assert_eq!(client.send("auction").await, "err missing event id");

    // Both events fall under the per-second floor of the metric channels.
    let stats = t.app.governor().stats();
    assert_eq!(stats.channel(TraceCategory::AuctionMetric).unwrap().admitted, 1);
    assert_eq!(stats.channel(TraceCategory::BidMetric).unwrap().admitted, 1);
    assert_eq!(stats.channel(TraceCategory::AuctionMessage).unwrap().denied, 1);

    t.app.close().await.unwrap();
}

#[tokio::test]
async fn test_non_utf8_ids_are_routed_and_connection_stays_open() {
    let (t, addr) = running_app().await;
    let mut client = IntakeClient::connect(addr).await;

    assert_eq!(
        client.send_raw(b"auction \xc3\x28\xff\nauction ok-1\n").await,
        b"ack \xc3\x28\xff"
    );
    assert_eq!(client.recv_raw().await, b"ack ok-1");
    assert_eq!(client.send_raw(b"\xfe\xfe x\n").await, "err unknown event kind \"\u{FFFD}\u{FFFD}\"".as_bytes());
    assert_eq!(client.send("bid b-1").await, "ack b-1");

    let stats = t.app.governor().stats();
    let auctions = stats.channel(TraceCategory::AuctionMetric).unwrap();
    assert_eq!(auctions.admitted + auctions.denied, 2);

    t.app.close().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_closes_intake_and_is_idempotent() {
    let (t, addr) = running_app().await;
    let mut client = IntakeClient::connect(addr).await;
    assert_eq!(client.send("bid b-1").await, "ack b-1");

    t.app.close().await.unwrap();
    assert_eq!(t.app.lifecycle().state(), State::ShutDown);
    assert!(t.shutdown_token.is_cancelled());
    assert!(client.is_closed().await);
    assert!(tokio::net::TcpStream::connect(addr).await.is_err());

    t.app.close().await.unwrap();
    assert_eq!(t.app.lifecycle().state(), State::ShutDown);
}

#[tokio::test]
async fn test_slow_regime_over_intake() {
    let (t, addr) = running_app().await;
    t.app.regime().set(Regime::Slow);

    let mut client = IntakeClient::connect(addr).await;
    for i in 0..1_200 {
        let id = format!("a-{i}");
        assert_eq!(client.send(&format!("auction {id}")).await, format!("ack {id}"));
    }

    let (_, count) = t.app.governor().window(TraceCategory::AuctionMetric, Regime::Slow);
    assert_eq!(count, 1_000);
    let (_, normal) = t.app.governor().window(TraceCategory::AuctionMetric, Regime::Normal);
    assert_eq!(normal, 0);

    t.app.close().await.unwrap();
}

#[tokio::test]
async fn test_load_monitor_switches_regime() {
    let mut cfg = new_test_config();
    cfg.router.slow_mode.threshold = 5;
    let (t, addr) = running_app_with(cfg).await;
    let mut client = IntakeClient::connect(addr).await;

    for i in 0..10 {
        client.send(&format!("bid b-{i}")).await;
    }
    assert_eq!(t.app.regime().current(), Regime::Normal);

    t.clock.advance(1);
    client.send("bid b-10").await;
    assert_eq!(t.app.regime().current(), Regime::Slow);

    t.clock.advance(1);
    client.send("bid b-11").await;
    assert_eq!(t.app.regime().current(), Regime::Normal);

    t.app.close().await.unwrap();
}

#[tokio::test]
async fn test_busy_transport_fails_start() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let mut cfg = new_test_config();
    cfg.router.transport.addr = taken.local_addr().unwrap().to_string();

    let t = test_app(cfg);
    assert!(t.app.validate(ValidationMode::ValidateErrorsOnly).await.unwrap());

    let err = t.app.start().await.unwrap_err();
    assert!(matches!(err, LifecycleError::Initialization(_)), "{err}");
    assert_eq!(t.app.lifecycle().state(), State::ConfigValidated);

    t.app.close().await.unwrap();
    assert_eq!(t.app.lifecycle().state(), State::ShutDown);
}

#[tokio::test]
async fn test_invalid_config_never_starts() {
    let mut cfg = new_test_config();
    cfg.router.max_bid_price = 0.0;

    let t = test_app(cfg);
    assert!(!t.app.validate(ValidationMode::ValidateErrorsOnly).await.unwrap());
    assert_eq!(t.app.lifecycle().state(), State::Uninitialized);
    assert!(matches!(
        t.app.start().await,
        Err(LifecycleError::NotValidated(State::Uninitialized))
    ));
}
