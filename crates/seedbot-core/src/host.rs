//! Host status collection for the `/status` command.

use async_trait::async_trait;
use sysinfo::System;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{CoreError, Result};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Snapshot of the host's health.
#[derive(Debug, Clone, PartialEq)]
pub struct HostStatus {
    /// One-minute load average.
    pub load_one: f64,
    pub mem_used_mb: u64,
    pub mem_total_mb: u64,
    pub uptime_secs: u64,
    /// Trimmed output of the status shell command (uptime and root disk usage).
    pub report: String,
}

/// Source of host status snapshots.
#[async_trait]
pub trait HostProbe: Send + Sync {
    /// Collect a fresh snapshot.
    async fn collect(&self) -> Result<HostStatus>;
}

/// Probe backed by `sysinfo` and a shell command.
#[derive(Debug, Clone)]
pub struct SystemProbe {
    status_command: String,
}

impl SystemProbe {
    pub fn new(status_command: impl Into<String>) -> Self {
        Self {
            status_command: status_command.into(),
        }
    }

    async fn run_status_command(&self) -> Result<String> {
        debug!(command = %self.status_command, "Running status command");

        let output = Command::new("sh")
            .arg("-c")
            .arg(&self.status_command)
            .output()
            .await
            .map_err(|e| CoreError::HostQuery(format!("failed to run status command: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(status = %output.status, stderr = %stderr.trim(), "Status command failed");
            return Err(CoreError::HostQuery(format!(
                "status command exited with {}",
                output.status
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl HostProbe for SystemProbe {
    async fn collect(&self) -> Result<HostStatus> {
        let report = self.run_status_command().await?;

        let mut sys = System::new();
        sys.refresh_memory();
        let total = sys.total_memory();
        let used = total.saturating_sub(sys.free_memory());

        Ok(HostStatus {
            load_one: System::load_average().one,
            mem_used_mb: used / BYTES_PER_MB,
            mem_total_mb: total / BYTES_PER_MB,
            uptime_secs: System::uptime(),
            report,
        })
    }
}

/// Render the `/status` reply.
pub fn format_status_report(status: &HostStatus) -> String {
    let mut text = format!(
        "📊 System status\n🧠 Load: {:.2}\n💾 RAM: {} / {} MB\n⏱ Uptime: {}",
        status.load_one,
        status.mem_used_mb,
        status.mem_total_mb,
        format_uptime(status.uptime_secs),
    );
    if !status.report.is_empty() {
        text.push_str("\n\n");
        text.push_str(&status.report);
    }
    text
}

fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HostStatus {
        HostStatus {
            load_one: 0.4567,
            mem_used_mb: 312,
            mem_total_mb: 3792,
            uptime_secs: 3 * 86_400 + 4 * 3_600 + 5 * 60 + 9,
            report: "/dev/root  29G  7.1G  21G  26% /".to_string(),
        }
    }

    #[test]
    fn test_format_status_report() {
        let text = format_status_report(&sample());
        assert!(text.starts_with("📊 System status"));
        assert!(text.contains("🧠 Load: 0.46"));
        assert!(text.contains("💾 RAM: 312 / 3792 MB"));
        assert!(text.contains("⏱ Uptime: 3d 4h 5m"));
        assert!(text.ends_with("\n\n/dev/root  29G  7.1G  21G  26% /"));
    }

    #[test]
    fn test_format_without_shell_output() {
        let status = HostStatus {
            report: String::new(),
            ..sample()
        };
        assert!(format_status_report(&status).ends_with("3d 4h 5m"));
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(59), "0m");
        assert_eq!(format_uptime(3_660), "1h 1m");
        assert_eq!(format_uptime(90_000), "1d 1h 0m");
    }

    #[tokio::test]
    async fn test_probe_runs_command() {
        let probe = SystemProbe::new("echo disk-ok");
        let status = probe.collect().await.unwrap();
        assert_eq!(status.report, "disk-ok");
        assert!(status.mem_used_mb <= status.mem_total_mb);
    }

    #[tokio::test]
    async fn test_probe_failing_command() {
        let probe = SystemProbe::new("exit 3");
        let err = probe.collect().await.unwrap_err();
        assert!(matches!(err, CoreError::HostQuery(_)));
    }
}
