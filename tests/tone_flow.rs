//! End-to-end tone flow: edits in, tones out, under a paused clock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use toneform::config::{RemoteProvider, StalePolicy};
use toneform::remote::{self, RemoteClassifier, ToneRequest};
use toneform::{Tone, ToneBreaker, ToneConfig, ToneError, ToneOrchestrator, ToneSession};

/// Answers `intense` after five seconds for any text mentioning "slow",
/// `calm` immediately for everything else.
#[derive(Default)]
struct LatencyRemote {
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl RemoteClassifier for LatencyRemote {
    fn name(&self) -> &str {
        "latency"
    }

    async fn classify(&self, request: &ToneRequest) -> toneform::Result<String> {
        self.seen
            .lock()
            .expect("lock")
            .push(request.text.clone());
        if request.text.contains("slow") {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("intense".into())
        } else {
            Ok("calm".into())
        }
    }
}

struct RateLimitedRemote;

#[async_trait]
impl RemoteClassifier for RateLimitedRemote {
    fn name(&self) -> &str {
        "rate-limited"
    }

    async fn classify(&self, _request: &ToneRequest) -> toneform::Result<String> {
        Err(ToneError::ProviderError(
            "HTTP 503: RESOURCE_EXHAUSTED: quota".into(),
        ))
    }
}

fn orchestrator(remote: Arc<dyn RemoteClassifier>, policy: StalePolicy) -> ToneOrchestrator {
    let config = ToneConfig {
        stale_policy: policy,
        ..ToneConfig::default()
    };
    ToneOrchestrator::new(ToneBreaker::new(remote, config.quarantine()), &config)
}

/// Schedules a slow classification, lets it start, then a fast one that
/// resolves first. Returns the tone seen after the fast result and the
/// tone after both have resolved.
async fn race(policy: StalePolicy) -> (Tone, Tone) {
    let remote = Arc::new(LatencyRemote::default());
    let orch = orchestrator(remote.clone(), policy);
    let mut rx = orch.subscribe();

    orch.on_text_changed("slow words arriving");
    // Timer fires at 1s; the remote call is now in flight.
    tokio::time::sleep(Duration::from_millis(1_100)).await;
    assert_eq!(remote.seen.lock().expect("lock").len(), 1);

    orch.on_text_changed("fast words arriving");
    rx.changed().await.expect("fast result");
    let after_fast = *rx.borrow_and_update();

    tokio::time::sleep(Duration::from_secs(10)).await;
    let settled = orch.current_tone();
    (after_fast, settled)
}

#[tokio::test(start_paused = true)]
async fn slow_stale_result_overwrites_by_default() {
    let (after_fast, settled) = race(StalePolicy::LastResolvedWins).await;
    assert_eq!(after_fast, Tone::Calm);
    assert_eq!(settled, Tone::Intense);
}

#[tokio::test(start_paused = true)]
async fn ignore_stale_keeps_newest_result() {
    let (after_fast, settled) = race(StalePolicy::IgnoreStale).await;
    assert_eq!(after_fast, Tone::Calm);
    assert_eq!(settled, Tone::Calm);
}

#[tokio::test(start_paused = true)]
async fn in_flight_call_survives_new_edits() {
    let remote = Arc::new(LatencyRemote::default());
    let orch = orchestrator(remote.clone(), StalePolicy::LastResolvedWins);

    orch.on_text_changed("slow words arriving");
    tokio::time::sleep(Duration::from_millis(1_100)).await;

    // Too short: cancels nothing in flight, schedules nothing new.
    orch.on_text_changed("ok");
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(orch.current_tone(), Tone::Intense);
    assert_eq!(remote.seen.lock().expect("lock").len(), 1);
}

#[tokio::test(start_paused = true)]
async fn resource_exhausted_message_quarantines() {
    let orch = orchestrator(Arc::new(RateLimitedRemote), StalePolicy::LastResolvedWins);
    let mut rx = orch.subscribe();

    orch.on_text_changed("so happy today");
    rx.changed().await.expect("tone");
    assert_eq!(*rx.borrow(), Tone::Playful);
    assert!(
        orch.breaker()
            .state()
            .is_quarantined(tokio::time::Instant::now())
    );
}

#[tokio::test(start_paused = true)]
async fn offline_session_follows_heuristic_rules() {
    let config = ToneConfig {
        remote: toneform::config::RemoteConfig {
            provider: RemoteProvider::Offline,
            ..Default::default()
        },
        ..ToneConfig::default()
    };
    let remote = remote::from_config(&config.remote).expect("remote");
    let mut session = ToneSession::new(&config, remote).expect("session");
    let mut rx = session.subscribe();

    for (text, expected) in [
        ("WOW!!!", Tone::Intense),
        ("quiet peace now", Tone::Calm),
        ("so happy today", Tone::Playful),
        ("The quarterly report is attached.", Tone::Serious),
    ] {
        session.input(text);
        rx.changed().await.expect("tone");
        assert_eq!(*rx.borrow_and_update(), expected, "text: {text}");
        assert_eq!(session.text(), text);
        assert_eq!(session.characters().len(), text.chars().count());
    }
}

#[tokio::test(start_paused = true)]
async fn unchanged_prefix_keeps_identity_across_edits() {
    let config = ToneConfig::default();
    let mut session =
        ToneSession::new(&config, Arc::new(remote::OfflineClassifier)).expect("session");

    session.input("hello");
    let ids: Vec<_> = session.characters().iter().map(|r| r.id().clone()).collect();

    session.input("help");
    let after: Vec<_> = session.characters().iter().map(|r| r.id().clone()).collect();
    assert_eq!(after[..3], ids[..3]);
    assert_ne!(after[3], ids[3]);
    assert_eq!(after.len(), 4);
}
