//! Audit logging for cache lifecycle events
//!
//! Appends JSON lines to `<state dir>/offcache/audit.log`, one per install or
//! activation, so a deploy history can be reconstructed later.

use crate::cache::{ActivateReport, InstallReport};
use crate::config::{schema::Config, ConfigManager};
use chrono::Utc;
use serde::Serialize;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

#[derive(Serialize)]
struct AuditEntry<'a, T: ?Sized> {
    timestamp: String,
    event: &'a str,
    data: &'a T,
}

/// File-based audit logger that appends JSON lines
pub struct AuditLog {
    enabled: bool,
    path: PathBuf,
}

impl AuditLog {
    /// Create a new audit logger from config
    pub fn new(config: &Config) -> Self {
        Self {
            enabled: config.general.audit_log,
            path: ConfigManager::audit_log_path(),
        }
    }

    /// Record a finished install
    pub async fn install_completed(&self, report: &InstallReport) {
        self.log("install.completed", report).await;
    }

    /// Record a finished activation
    pub async fn activate_completed(&self, report: &ActivateReport) {
        self.log("activate.completed", report).await;
    }

    /// Log an audit event as a JSON line
    ///
    /// IO and serialization failures are logged and dropped.
    pub async fn log<T: Serialize + ?Sized>(&self, event: &str, data: &T) {
        if !self.enabled {
            return;
        }

        let entry = AuditEntry {
            timestamp: Utc::now().to_rfc3339(),
            event,
            data,
        };

        let mut line = match serde_json::to_string(&entry) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize audit event: {}", e);
                return;
            }
        };
        line.push('\n');

        if let Err(e) = self.append(&line).await {
            warn!("Failed to write audit log {}: {}", self.path.display(), e);
        }
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Generation;
    use tempfile::TempDir;

    fn test_audit_log(dir: &TempDir, enabled: bool) -> AuditLog {
        AuditLog {
            enabled,
            path: dir.path().join("logs").join("audit.log"),
        }
    }

    #[tokio::test]
    async fn records_install_report() {
        let dir = TempDir::new().unwrap();
        let audit = test_audit_log(&dir, true);

        let report = InstallReport {
            generation: Generation::new("v3").unwrap(),
            stored: vec!["/".into()],
            failed: vec![("/hero.webp".into(), "status 404".into())],
            abandoned: None,
        };
        audit.install_completed(&report).await;

        let content = tokio::fs::read_to_string(&audit.path).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(content.trim()).unwrap();

        assert_eq!(parsed["event"], "install.completed");
        assert_eq!(parsed["data"]["generation"], "v3");
        assert_eq!(parsed["data"]["failed"][0][0], "/hero.webp");
        assert!(parsed["timestamp"].is_string());
    }

    #[tokio::test]
    async fn appends_multiple_lines() {
        let dir = TempDir::new().unwrap();
        let audit = test_audit_log(&dir, true);

        let report = ActivateReport {
            generation: Generation::new("v2").unwrap(),
            deleted: vec!["v1".into()],
            failed: vec![],
            listing_error: None,
        };
        audit.activate_completed(&report).await;
        audit.log("custom.event", &serde_json::json!({})).await;

        let content = tokio::fs::read_to_string(&audit.path).await.unwrap();
        let lines: Vec<&str> = content.trim().lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("activate.completed"));
    }

    #[tokio::test]
    async fn skips_when_disabled() {
        let dir = TempDir::new().unwrap();
        let audit = test_audit_log(&dir, false);

        audit.log("should.not.appear", &serde_json::json!({})).await;

        assert!(!audit.path.exists());
    }
}
