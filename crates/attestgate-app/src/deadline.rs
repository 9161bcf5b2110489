//! Optional wall-clock deadline around one evaluation.

use attestgate_domain::{Evaluation, PolicyError, PolicyModule, RuleEngine, evaluate};
use serde_json::Value;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("policy evaluation timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("policy evaluation thread exited without a result")]
    Aborted,

    #[error("failed to start policy evaluation thread")]
    Spawn(#[source] std::io::Error),
}

impl VerifyError {
    pub fn is_denied(&self) -> bool {
        matches!(self, VerifyError::Policy(e) if e.is_denied())
    }
}

/// Run [`evaluate`], giving up after `timeout` when one is set.
///
/// With a deadline the evaluation runs on its own thread. An expired evaluation is
/// abandoned, not interrupted: the thread finishes in the background and its result is
/// dropped.
pub fn evaluate_with_deadline<E>(
    engine: E,
    record: Value,
    modules: Vec<PolicyModule>,
    timeout: Option<Duration>,
) -> Result<Evaluation, VerifyError>
where
    E: RuleEngine + Send + 'static,
{
    let Some(limit) = timeout else {
        return Ok(evaluate(&engine, &record, &modules)?);
    };

    let (tx, rx) = mpsc::channel();
    std::thread::Builder::new()
        .name("attestgate-eval".to_string())
        .spawn(move || {
            // The receiver is gone once the deadline passed.
            let _ = tx.send(evaluate(&engine, &record, &modules));
        })
        .map_err(VerifyError::Spawn)?;

    match rx.recv_timeout(limit) {
        Ok(result) => Ok(result?),
        Err(RecvTimeoutError::Timeout) => {
            warn!(timeout_ms = limit.as_millis() as u64, "policy evaluation deadline expired");
            Err(VerifyError::Timeout(limit))
        }
        Err(RecvTimeoutError::Disconnected) => Err(VerifyError::Aborted),
    }
}
