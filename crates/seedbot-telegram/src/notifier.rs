//! Finished-download notifications.
//!
//! The notifier polls the daemon on a fixed period and tells the authorized
//! chat about every torrent that reaches 100%. Each torrent id is reported at
//! most once per process: ids are remembered forever, so a torrent that drops
//! below 100% (re-verification, for example) and finishes again stays silent.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use seedbot_transmission::{DaemonClient, TorrentId, TorrentRecord};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::messenger::Messenger;

/// Outcome of a single poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The daemon could not be reached; nothing changed.
    Skipped,
    /// The daemon was polled and these torrents were newly reported.
    Checked { notified: Vec<TorrentId> },
}

/// Polls the daemon and reports finished torrents to one chat.
pub struct FinishedNotifier {
    daemon: Arc<dyn DaemonClient>,
    messenger: Arc<dyn Messenger>,
    chat_id: i64,
    notified: HashSet<TorrentId>,
}

impl FinishedNotifier {
    pub fn new(daemon: Arc<dyn DaemonClient>, messenger: Arc<dyn Messenger>, chat_id: i64) -> Self {
        Self {
            daemon,
            messenger,
            chat_id,
            notified: HashSet::new(),
        }
    }

    /// Number of torrents reported so far.
    pub fn notified_count(&self) -> usize {
        self.notified.len()
    }

    /// Whether `id` has already been reported.
    pub fn was_notified(&self, id: TorrentId) -> bool {
        self.notified.contains(&id)
    }

    /// Run one poll cycle.
    pub async fn poll_once(&mut self) -> PollOutcome {
        let torrents = match self.daemon.list().await {
            Ok(torrents) => torrents,
            Err(e) => {
                error!(error = %e, "Failed to fetch torrents for notifications");
                return PollOutcome::Skipped;
            }
        };

        let mut notified = Vec::new();
        for torrent in torrents.iter().filter(|t| t.is_finished()) {
            // insert() is false for ids already reported
            if !self.notified.insert(torrent.id) {
                continue;
            }

            let text = finished_message(torrent);
            match self.messenger.send_text(self.chat_id, &text).await {
                Ok(()) => info!(torrent_id = torrent.id, name = %torrent.name, "Finished notification sent"),
                Err(e) => warn!(torrent_id = torrent.id, error = %e, "Failed to send finished notification"),
            }
            notified.push(torrent.id);
        }

        PollOutcome::Checked { notified }
    }

    /// Poll every `period` until `shutdown` flips to true.
    ///
    /// Cycles run inside this one task, so a slow daemon call delays the next
    /// cycle instead of overlapping it; ticks missed meanwhile are dropped.
    pub async fn run(mut self, period: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately; wait a full period like a timer would.
        ticker.tick().await;

        debug!(period_secs = period.as_secs(), "Starting finished-torrent notifier");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let PollOutcome::Checked { notified } = self.poll_once().await {
                        if !notified.is_empty() {
                            debug!(count = notified.len(), total = self.notified.len(), "Notified finished torrents");
                        }
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("Notifier received shutdown signal");
                        break;
                    }
                }
            }
        }

        debug!("Finished-torrent notifier stopped");
    }
}

/// Text sent when a torrent finishes.
pub fn finished_message(torrent: &TorrentRecord) -> String {
    format!("✅ Torrent finished:\n{}\nID: {}", torrent.name, torrent.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use seedbot_transmission::TorrentStatus;

    #[test]
    fn test_finished_message() {
        let torrent = TorrentRecord {
            id: 9,
            name: "ubuntu.iso".to_string(),
            percent_done: 1.0,
            status: TorrentStatus::Seeding,
            download_dir: "/downloads".to_string(),
            files: Vec::new(),
        };
        assert_eq!(finished_message(&torrent), "✅ Torrent finished:\nubuntu.iso\nID: 9");
    }
}
