//! Torrent records as reported by the daemon.

use serde::{Deserialize, Serialize};

/// Daemon-local torrent identifier.
pub type TorrentId = i64;

/// Transmission activity status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum TorrentStatus {
    Stopped,
    QueuedToVerify,
    Verifying,
    QueuedToDownload,
    Downloading,
    QueuedToSeed,
    Seeding,
    /// A code this client does not know about.
    Unknown(i64),
}

impl From<i64> for TorrentStatus {
    fn from(code: i64) -> Self {
        match code {
            0 => TorrentStatus::Stopped,
            1 => TorrentStatus::QueuedToVerify,
            2 => TorrentStatus::Verifying,
            3 => TorrentStatus::QueuedToDownload,
            4 => TorrentStatus::Downloading,
            5 => TorrentStatus::QueuedToSeed,
            6 => TorrentStatus::Seeding,
            other => TorrentStatus::Unknown(other),
        }
    }
}

impl From<TorrentStatus> for i64 {
    fn from(status: TorrentStatus) -> Self {
        match status {
            TorrentStatus::Stopped => 0,
            TorrentStatus::QueuedToVerify => 1,
            TorrentStatus::Verifying => 2,
            TorrentStatus::QueuedToDownload => 3,
            TorrentStatus::Downloading => 4,
            TorrentStatus::QueuedToSeed => 5,
            TorrentStatus::Seeding => 6,
            TorrentStatus::Unknown(code) => code,
        }
    }
}

/// A file inside a torrent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TorrentFile {
    pub name: String,
    #[serde(default)]
    pub length: u64,
    #[serde(default)]
    pub bytes_completed: u64,
}

/// Read-only snapshot of one torrent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TorrentRecord {
    pub id: TorrentId,
    pub name: String,
    /// Completion fraction in `[0, 1]`.
    pub percent_done: f64,
    pub status: TorrentStatus,
    #[serde(default)]
    pub download_dir: String,
    #[serde(default)]
    pub files: Vec<TorrentFile>,
}

impl TorrentRecord {
    /// Fields requested from `torrent-get`.
    pub const FIELDS: [&'static str; 6] =
        ["id", "name", "percentDone", "status", "downloadDir", "files"];

    /// A torrent is finished once it is fully downloaded.
    pub fn is_finished(&self) -> bool {
        self.percent_done == 1.0
    }
}

/// Torrent created (or found already present) by `torrent-add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddedTorrent {
    pub id: TorrentId,
    pub name: String,
    #[serde(default)]
    pub hash_string: String,
}
