//! Transmission daemon access for Seedbot.
//!
//! [`DaemonClient`] is the seam the bot talks to; [`TransmissionClient`]
//! implements it over Transmission's JSON RPC endpoint.

pub mod client;
pub mod error;
pub mod types;

pub use client::{DaemonClient, TransmissionClient};
pub use error::{DaemonError, Result};
pub use types::{AddedTorrent, TorrentFile, TorrentId, TorrentRecord, TorrentStatus};
