//! Shared test doubles for monitor and dispatcher tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use tokio::sync::mpsc;

use natwatch::actions::{Action, ActionError};
use natwatch::health::CheckError;
use natwatch::probe::{ProbeError, Prober};

/// One scripted probe outcome.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum Step {
    Reply,
    Fail,
    /// Reply, but only after the given delay.
    SlowReply(Duration),
}

/// Prober replaying a fixed script; replies once the script runs out.
pub struct ScriptedProber {
    script: Vec<Step>,
    calls: AtomicUsize,
    completed: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedProber {
    pub fn new(script: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        })
    }

    /// Probes started so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Probes that ran to completion, including ones the sampler gave up on.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, target: &str, _timeout: Duration) -> Result<(), ProbeError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.script.get(index).cloned().unwrap_or(Step::Reply);

        let result = match step {
            Step::Reply => Ok(()),
            Step::Fail => Err(ProbeError::NoAddress(target.to_string())),
            Step::SlowReply(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        };
        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }
}

/// Action reporting every trigger on a channel, tagged with how many
/// probes had been started at that moment.
pub struct RecordingAction {
    prober: Arc<ScriptedProber>,
    tx: mpsc::UnboundedSender<(usize, CheckError)>,
}

#[allow(dead_code)]
impl RecordingAction {
    pub fn new(
        prober: Arc<ScriptedProber>,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<(usize, CheckError)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { prober, tx }), rx)
    }
}

#[async_trait]
impl Action for RecordingAction {
    async fn trigger(&self, cause: CheckError) -> Result<(), ActionError> {
        let _ = self.tx.send((self.prober.calls(), cause));
        Ok(())
    }
}

/// Drain everything currently queued on `rx`.
#[allow(dead_code)]
pub fn drain<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> Vec<T> {
    let mut items = Vec::new();
    while let Ok(item) = rx.try_recv() {
        items.push(item);
    }
    items
}
