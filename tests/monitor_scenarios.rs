//! End-to-end monitor loop scenarios on a paused clock.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;

use natwatch::actions::{Action, ActionError, ActionRegistry, FanoutDispatcher};
use natwatch::config::validation::ValidationError;
use natwatch::config::{CheckConfig, SocketKind};
use natwatch::health::{CheckError, Monitor, Verdict};
use natwatch::lifecycle::Shutdown;

mod common;
use common::{drain, RecordingAction, ScriptedProber, Step};

fn check(threshold: u32) -> CheckConfig {
    CheckConfig {
        target: "192.0.2.1".into(),
        interval_ms: 100,
        timeout_ms: 50,
        failure_threshold: threshold,
        socket: SocketKind::Raw,
    }
}

fn registry_with(name: &str, action: Arc<dyn Action>) -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    registry.register(name, Some(action)).unwrap();
    registry
}

#[tokio::test(start_paused = true)]
async fn test_fires_at_samples_three_and_seven() {
    use Step::{Fail, Reply};

    let prober = ScriptedProber::new(vec![Fail, Fail, Fail, Reply, Fail, Fail, Fail]);
    let (action, mut fired) = RecordingAction::new(prober.clone());
    let monitor = Monitor::from_config(
        &check(3),
        prober.clone(),
        FanoutDispatcher::new(registry_with("record", action)),
    )
    .unwrap();

    let shutdown = Shutdown::new();
    let task = tokio::spawn(monitor.run(shutdown.subscribe()));

    // Ticks at 0, 100, ..., 600ms.
    tokio::time::sleep(Duration::from_millis(650)).await;
    shutdown.trigger();
    task.await.unwrap();

    assert_eq!(prober.calls(), 7);
    let at: Vec<usize> = drain(&mut fired).into_iter().map(|(at, _)| at).collect();
    assert_eq!(at, vec![3, 7]);
}

#[tokio::test(start_paused = true)]
async fn test_threshold_one_fires_on_first_failure() {
    let prober = ScriptedProber::new(vec![Step::Fail]);
    let (action, mut fired) = RecordingAction::new(prober.clone());
    let mut monitor = Monitor::from_config(
        &check(1),
        prober.clone(),
        FanoutDispatcher::new(registry_with("record", action)),
    )
    .unwrap();

    assert_eq!(monitor.tick().await, Verdict::Tripped);
    tokio::task::yield_now().await;

    let (at, cause) = fired.recv().await.unwrap();
    assert_eq!(at, 1);
    assert!(matches!(cause, CheckError::Probe(_)));
    assert_eq!(monitor.tracker().consecutive_failures(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_sustained_outage_fires_once_per_run() {
    let prober = ScriptedProber::new(vec![Step::Fail; 7]);
    let (action, mut fired) = RecordingAction::new(prober.clone());
    let mut monitor = Monitor::from_config(
        &check(3),
        prober.clone(),
        FanoutDispatcher::new(registry_with("record", action)),
    )
    .unwrap();

    for _ in 0..7 {
        monitor.tick().await;
        tokio::task::yield_now().await;
    }

    let at: Vec<usize> = drain(&mut fired).into_iter().map(|(at, _)| at).collect();
    assert_eq!(at, vec![3, 6]);
    assert_eq!(monitor.tracker().consecutive_failures(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_late_probe_result_is_discarded() {
    let prober = ScriptedProber::new(vec![Step::SlowReply(Duration::from_millis(200))]);
    let (action, mut fired) = RecordingAction::new(prober.clone());
    let mut monitor = Monitor::from_config(
        &check(2),
        prober.clone(),
        FanoutDispatcher::new(registry_with("record", action)),
    )
    .unwrap();

    assert_eq!(monitor.tick().await, Verdict::Failing { consecutive: 1 });
    assert_eq!(prober.completed(), 0);

    // The abandoned probe finishes on its own; the tracker is unaffected.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(prober.completed(), 1);
    assert_eq!(monitor.tracker().consecutive_failures(), 1);
    assert!(drain(&mut fired).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_timeout_cause_reaches_actions() {
    let prober = ScriptedProber::new(vec![Step::SlowReply(Duration::from_secs(1))]);
    let (action, mut fired) = RecordingAction::new(prober.clone());
    let mut monitor = Monitor::from_config(
        &check(1),
        prober.clone(),
        FanoutDispatcher::new(registry_with("record", action)),
    )
    .unwrap();

    assert_eq!(monitor.tick().await, Verdict::Tripped);
    let (_, cause) = fired.recv().await.unwrap();
    assert_eq!(cause, CheckError::Timeout(Duration::from_millis(50)));
}

struct StuckAction {
    started: Arc<AtomicUsize>,
}

#[async_trait]
impl Action for StuckAction {
    async fn trigger(&self, _cause: CheckError) -> Result<(), ActionError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_action_does_not_stall_probing() {
    let prober = ScriptedProber::new(vec![Step::Fail; 10]);
    let started = Arc::new(AtomicUsize::new(0));
    let action = Arc::new(StuckAction {
        started: started.clone(),
    });
    let monitor = Monitor::from_config(
        &check(1),
        prober.clone(),
        FanoutDispatcher::new(registry_with("stuck", action)),
    )
    .unwrap();

    let shutdown = Shutdown::new();
    let task = tokio::spawn(monitor.run(shutdown.subscribe()));

    tokio::time::sleep(Duration::from_millis(550)).await;
    shutdown.trigger();
    task.await.unwrap();

    // Six ticks (0..=500ms), each tripping and starting an action that never ends.
    assert_eq!(prober.calls(), 6);
    assert_eq!(started.load(Ordering::SeqCst), 6);
}

#[test]
fn test_zero_threshold_rejected() {
    let prober = ScriptedProber::new(vec![]);
    let result = Monitor::from_config(
        &check(0),
        prober,
        FanoutDispatcher::new(ActionRegistry::new()),
    );
    assert!(matches!(result, Err(ValidationError::ZeroThreshold)));
}

#[test]
fn test_zero_interval_rejected() {
    let prober = ScriptedProber::new(vec![]);
    let mut config = check(3);
    config.interval_ms = 0;

    let result = Monitor::from_config(
        &config,
        prober,
        FanoutDispatcher::new(ActionRegistry::new()),
    );
    assert!(matches!(result, Err(ValidationError::ZeroInterval)));
}
