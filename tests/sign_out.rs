mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use authportal::config::FlowSettings;
use authportal::models::SignOutResult;
use authportal::portal::{Navigation, SignOutSequencer, SignOutState};
use authportal::utils::error_messages::SIGN_OUT_FAILED;
use tokio::time::Instant;
use url::Url;

use common::{first_factor, harness, FakeVerifier};

const SETTLE: Duration = Duration::from_millis(2000);

fn verifier(safe: Option<bool>) -> Arc<FakeVerifier> {
    Arc::new(FakeVerifier {
        sign_out_result: safe.map(|safe_target_url| SignOutResult { safe_target_url }),
        ..Default::default()
    })
}

#[tokio::test(start_paused = true)]
async fn safe_target_is_followed_after_settle_delay() {
    let verifier = verifier(Some(true));
    let h = harness(verifier.clone(), FlowSettings::default());
    let mut sequencer = SignOutSequencer::new(h.context.clone());

    let started = Instant::now();
    let navigation = sequencer.sign_out(Some("https://partner.example/app")).await;

    let expected = Navigation::External(Url::parse("https://partner.example/app").unwrap());
    assert!(started.elapsed() >= SETTLE);
    assert_eq!(navigation, Some(expected.clone()));
    assert_eq!(h.navigator.visited(), vec![expected]);
    assert_eq!(sequencer.state(), SignOutState::Done);
    assert!(h.notifications.errors().is_empty());
}

#[tokio::test(start_paused = true)]
async fn unsafe_target_goes_to_first_factor() {
    let verifier = verifier(Some(false));
    let h = harness(verifier.clone(), FlowSettings::default());
    let mut sequencer = SignOutSequencer::new(h.context.clone());

    let started = Instant::now();
    sequencer.sign_out(Some("https://evil.example/phish")).await;

    assert!(started.elapsed() >= SETTLE);
    assert_eq!(h.navigator.visited(), vec![first_factor()]);
    assert_eq!(
        verifier.sign_out_targets.lock().unwrap().as_slice(),
        [Some("https://evil.example/phish".to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn safe_flag_without_target_goes_to_first_factor() {
    let verifier = verifier(Some(true));
    let h = harness(verifier.clone(), FlowSettings::default());
    let mut sequencer = SignOutSequencer::new(h.context.clone());

    assert_eq!(sequencer.mount("").await, Some(first_factor()));
    assert_eq!(verifier.sign_out_targets.lock().unwrap().as_slice(), [None::<String>]);
}

#[tokio::test(start_paused = true)]
async fn target_read_from_query() {
    let verifier = verifier(Some(true));
    let h = harness(verifier.clone(), FlowSettings::default());
    let mut sequencer = SignOutSequencer::new(h.context.clone());

    let navigation = sequencer.mount("?rd=https%3A%2F%2Fapp.example.com%2Fhome").await;

    assert_eq!(
        navigation,
        Some(Navigation::External(Url::parse("https://app.example.com/home").unwrap()))
    );
}

#[tokio::test(start_paused = true)]
async fn failure_notifies_and_still_navigates() {
    let verifier = verifier(None);
    let h = harness(verifier.clone(), FlowSettings::default());
    let mut sequencer = SignOutSequencer::new(h.context.clone());

    let started = Instant::now();
    let navigation = sequencer.sign_out(Some("https://partner.example/app")).await;

    assert!(started.elapsed() >= SETTLE);
    assert_eq!(navigation, Some(first_factor()));
    assert_eq!(h.notifications.errors(), vec![SIGN_OUT_FAILED]);
    assert_eq!(h.navigator.visited().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn teardown_before_timer_prevents_navigation() {
    let verifier = verifier(Some(true));
    let h = harness(verifier.clone(), FlowSettings::default());
    let mut sequencer = SignOutSequencer::new(h.context.clone());

    let liveness = sequencer.liveness();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        liveness.cancel();
    });

    let navigation = sequencer.sign_out(Some("https://partner.example/app")).await;

    assert_eq!(navigation, None);
    assert_eq!(sequencer.state(), SignOutState::Settling);
    assert!(h.navigator.visited().is_empty());

    // Nothing fires later either.
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(h.navigator.visited().is_empty());
}

#[tokio::test(start_paused = true)]
async fn sign_out_runs_once() {
    let verifier = verifier(Some(false));
    let h = harness(verifier.clone(), FlowSettings::default());
    let mut sequencer = SignOutSequencer::new(h.context.clone());

    sequencer.sign_out(None).await;
    assert_eq!(sequencer.sign_out(None).await, None);

    assert_eq!(verifier.sign_out_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.navigator.visited(), vec![first_factor()]);
}

#[tokio::test(start_paused = true)]
async fn custom_settle_delay() {
    let verifier = verifier(Some(false));
    let settings = FlowSettings {
        settle_delay: Duration::from_millis(250),
        ..FlowSettings::default()
    };
    let h = harness(verifier.clone(), settings);
    let mut sequencer = SignOutSequencer::new(h.context.clone());

    let started = Instant::now();
    sequencer.sign_out(None).await;

    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(250) && elapsed < SETTLE);
}
