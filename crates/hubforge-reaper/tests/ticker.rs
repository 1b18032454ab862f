//! Integration tests for the housekeeping ticker and its use with the
//! death watch.
//!
//! Uses tokio's paused clock so sleeps resolve instantly and
//! deterministically.

use std::time::Duration;

use hubforge_protocol::GameId;
use hubforge_reaper::{DeathWatch, TickConfig, TickPolicy, Ticker};

// =========================================================================
// TickConfig
// =========================================================================

#[test]
fn test_default_config_one_second_skip() {
    let cfg = TickConfig::default();
    assert_eq!(cfg.interval, Duration::from_secs(1));
    assert_eq!(cfg.policy, TickPolicy::Skip);
}

#[test]
fn test_validated_zero_interval_clamped() {
    let cfg = TickConfig::with_interval(Duration::ZERO).validated();
    assert_eq!(cfg.interval, TickConfig::MIN_INTERVAL);
}

#[test]
fn test_validated_normal_interval_unchanged() {
    let cfg = TickConfig::with_interval(Duration::from_millis(250)).validated();
    assert_eq!(cfg.interval, Duration::from_millis(250));
}

// =========================================================================
// Ticker
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_tick_first_fires_after_one_interval() {
    let start = tokio::time::Instant::now();
    let mut ticker = Ticker::new(TickConfig::with_interval(Duration::from_millis(100)));

    let at = ticker.tick().await;

    assert_eq!(at - start.into_std(), Duration::from_millis(100));
    assert!(start.elapsed() >= Duration::from_millis(100));
    assert_eq!(ticker.tick_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_tick_returns_increasing_instants() {
    let mut ticker = Ticker::new(TickConfig::with_interval(Duration::from_millis(50)));

    let a = ticker.tick().await;
    let b = ticker.tick().await;
    let c = ticker.tick().await;

    assert_eq!(b - a, Duration::from_millis(50));
    assert_eq!(c - b, Duration::from_millis(50));
    assert_eq!(ticker.tick_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_period_reports_configured_interval() {
    let ticker = Ticker::new(TickConfig::with_interval(Duration::from_millis(20)));
    assert_eq!(ticker.period(), Duration::from_millis(20));
    assert_eq!(ticker.tick_count(), 0);
}

// =========================================================================
// Integration: select! loop driving a death watch
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_select_loop_reaps_on_first_tick_past_grace() {
    let mut ticker = Ticker::new(TickConfig::with_interval(Duration::from_secs(1)));
    let mut watch = DeathWatch::new(Duration::from_millis(2_500));
    let (tx, mut rx) = tokio::sync::mpsc::channel::<&str>(4);

    // Enqueue at the time of the first tick, like the router does.
    let t1 = ticker.tick().await;
    watch.watch(GameId::from("g1"), t1);

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(10)).await;
        tx.send("stop").await.ok();
    });

    let mut reaped_at_tick = None;
    loop {
        tokio::select! {
            Some(cmd) = rx.recv() => {
                assert_eq!(cmd, "stop");
                break;
            }
            now = ticker.tick() => {
                let reaped = watch.sweep(now);
                if !reaped.is_empty() {
                    assert_eq!(reaped, vec![GameId::from("g1")]);
                    reaped_at_tick = Some(ticker.tick_count());
                }
            }
        }
    }

    // Enqueued at tick 1, grace 2.5s: ticks 2 and 3 are early, tick 4 is the
    // first at or past expiry.
    assert_eq!(reaped_at_tick, Some(4));
    assert!(watch.is_empty());
}
