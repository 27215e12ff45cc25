//! Radio frequency sources
//!
//! The session polls the configured backend once per second. Polls run on
//! worker tasks, so replies can arrive out of order; [`RadioPoller`] stamps
//! each poll with a generation and only lets the newest result through.

pub mod flrig;
pub mod rigctld;

use crate::error::Result;
use crate::settings::{Settings, RIG_FLRIG, RIG_RIGCTLD};

pub use flrig::Flrig;
pub use rigctld::Rigctld;

#[derive(Debug, Clone)]
pub enum RadioClient {
    Rigctld(Rigctld),
    Flrig(Flrig),
}

impl RadioClient {
    /// Backend selected by `userigcontrol`, or `None` when rig control is off
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        match settings.userigcontrol {
            RIG_RIGCTLD => Some(RadioClient::Rigctld(Rigctld::new(&settings.rig_address()))),
            RIG_FLRIG => Some(RadioClient::Flrig(Flrig::new(
                &settings.rigcontrolip,
                &settings.rigcontrolport,
            ))),
            _ => None,
        }
    }

    /// Current VFO frequency in Hz, as the backend reports it
    pub async fn frequency(&self) -> Result<String> {
        match self {
            RadioClient::Rigctld(rig) => rig.frequency().await,
            RadioClient::Flrig(rig) => rig.frequency().await,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RadioClient::Rigctld(_) => "rigctld",
            RadioClient::Flrig(_) => "flrig",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioStatus {
    /// No rig control configured
    Disabled,
    Online,
    Offline,
}

impl std::fmt::Display for RadioStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RadioStatus::Disabled => write!(f, "Radio: off"),
            RadioStatus::Online => write!(f, "Radio: online"),
            RadioStatus::Offline => write!(f, "Radio: OFFLINE"),
        }
    }
}

/// Outcome of one poll, tagged with the generation it was issued under
#[derive(Debug)]
pub struct PollResult {
    pub generation: u64,
    pub reading: Result<String>,
}

/// Latest-wins bookkeeping for in-flight polls
#[derive(Debug, Default)]
pub struct RadioPoller {
    issued: u64,
    applied: u64,
}

impl RadioPoller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation for a poll about to be dispatched
    pub fn next_generation(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Whether a result may be applied. Accepting it retires every older poll.
    pub fn accept(&mut self, generation: u64) -> bool {
        if generation <= self.applied {
            log::debug!(
                "Discarding stale radio poll {} (applied {})",
                generation,
                self.applied
            );
            return false;
        }
        self.applied = generation;
        true
    }
}

/// Dispatch a poll onto a worker task; the result comes back on `tx`
pub fn spawn_poll(
    radio: RadioClient,
    generation: u64,
    tx: tokio::sync::mpsc::UnboundedSender<PollResult>,
) {
    tokio::spawn(async move {
        let reading = radio.frequency().await;
        // The receiver is gone only when the session is shutting down
        let _ = tx.send(PollResult { generation, reading });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_poll_wins() {
        let mut poller = RadioPoller::new();
        let first = poller.next_generation();
        let second = poller.next_generation();
        assert!(second > first);

        // Second reply arrives before the first
        assert!(poller.accept(second));
        assert!(!poller.accept(first));
        assert!(!poller.accept(second));

        let third = poller.next_generation();
        assert!(poller.accept(third));
    }

    #[test]
    fn test_backend_from_settings() {
        let mut settings = Settings::default();
        assert!(RadioClient::from_settings(&settings).is_none());

        settings.userigcontrol = RIG_RIGCTLD;
        assert_eq!(RadioClient::from_settings(&settings).unwrap().name(), "rigctld");

        settings.userigcontrol = RIG_FLRIG;
        assert_eq!(RadioClient::from_settings(&settings).unwrap().name(), "flrig");
    }

    #[tokio::test]
    async fn test_spawned_poll_reports_back() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        spawn_poll(RadioClient::Rigctld(Rigctld::new(&addr)), 7, tx);

        let result = rx.recv().await.unwrap();
        assert_eq!(result.generation, 7);
        assert!(result.reading.is_err());
    }
}
