//! Single-producer, single-consumer channel carrying session outcomes from the
//! puzzle to its host.
//!
//! Outcomes travel in their `PM_RESULT` wire form, the same payload an embedded
//! puzzle page posts to its host. Delivery is fire-and-forget: the puzzle never
//! waits on, or learns about, what the host does with an outcome.

use pathmem_types::{BridgeDecodeError, BridgeMessage, SessionOutcome};
use tokio::sync::mpsc;

/// Create a connected emitter/receiver pair.
#[must_use]
pub fn result_channel() -> (ResultEmitter, ResultReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ResultEmitter { tx }, ResultReceiver { rx })
}

/// Puzzle side. Not `Clone`: one producer per channel.
#[derive(Debug)]
pub struct ResultEmitter {
    tx: mpsc::UnboundedSender<String>,
}

impl ResultEmitter {
    pub fn emit(&self, outcome: SessionOutcome) {
        tracing::info!(
            level = outcome.level,
            score = outcome.score,
            lives_remaining = outcome.lives_remaining,
            won = outcome.won,
            "Emitting session outcome"
        );
        self.send(BridgeMessage::encode(&outcome));
    }

    /// Entry point for hosts that embed an external puzzle and receive its
    /// messages raw.
    ///
    /// Returns `Ok(false)` for messages that are not session results; those are
    /// not forwarded.
    pub fn relay(&self, raw: &str) -> Result<bool, BridgeDecodeError> {
        if BridgeMessage::decode(raw)?.is_none() {
            return Ok(false);
        }
        self.send(raw.to_string());
        Ok(true)
    }

    fn send(&self, message: String) {
        if self.tx.send(message).is_err() {
            tracing::warn!("Result receiver dropped; session outcome discarded");
        }
    }
}

/// Host side.
#[derive(Debug)]
pub struct ResultReceiver {
    rx: mpsc::UnboundedReceiver<String>,
}

impl ResultReceiver {
    /// Wait for the next outcome. `None` once the emitter is gone and the queue is drained.
    pub async fn recv(&mut self) -> Option<SessionOutcome> {
        while let Some(raw) = self.rx.recv().await {
            if let Some(outcome) = decode(&raw) {
                return Some(outcome);
            }
        }
        None
    }

    pub fn try_recv(&mut self) -> Option<SessionOutcome> {
        while let Ok(raw) = self.rx.try_recv() {
            if let Some(outcome) = decode(&raw) {
                return Some(outcome);
            }
        }
        None
    }
}

fn decode(raw: &str) -> Option<SessionOutcome> {
    match BridgeMessage::decode(raw) {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(error = %e, "Dropping undecodable result message");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(won: bool) -> SessionOutcome {
        SessionOutcome {
            level: 2,
            score: 450,
            lives_remaining: if won { 3 } else { 0 },
            won,
        }
    }

    #[tokio::test]
    async fn delivers_in_order_then_closes() {
        let (emitter, mut receiver) = result_channel();
        emitter.emit(outcome(true));
        emitter.emit(outcome(false));
        drop(emitter);

        assert_eq!(receiver.recv().await, Some(outcome(true)));
        assert_eq!(receiver.recv().await, Some(outcome(false)));
        assert_eq!(receiver.recv().await, None);
    }

    #[test]
    fn emit_without_receiver_is_harmless() {
        let (emitter, receiver) = result_channel();
        drop(receiver);
        emitter.emit(outcome(true));
    }

    #[test]
    fn relay_filters_foreign_messages() {
        let (emitter, mut receiver) = result_channel();
        assert!(!emitter.relay(r#"{"type":"RESIZE","width":10}"#).unwrap());
        assert!(
            emitter
                .relay(r#"{"type":"PM_RESULT","level":2,"score":450,"livesRemaining":3,"won":true}"#)
                .unwrap()
        );
        assert!(emitter.relay("{").is_err());
        assert_eq!(receiver.try_recv(), Some(outcome(true)));
        assert_eq!(receiver.try_recv(), None);
    }

    #[test]
    fn emitted_outcomes_travel_as_result_messages() {
        let (emitter, mut receiver) = result_channel();
        emitter.emit(outcome(false));

        let raw = receiver.rx.try_recv().unwrap();
        let wire: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(wire["type"], "PM_RESULT");
        assert_eq!(wire["livesRemaining"], 0);
        assert_eq!(wire["won"], false);
        assert_eq!(BridgeMessage::decode(&raw).unwrap(), Some(outcome(false)));
    }
}
