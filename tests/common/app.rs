//! Session factory for integration tests.

use image::RgbaImage;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use paletti::models::{AppConfig, DebounceConfig, ExportConfig, QuantizeConfig};
use paletti::services::{LedgerStats, Notice, Rendered, Session, SessionStatus};

/// Upper bound for anything a test waits on
pub const WAIT: Duration = Duration::from_secs(10);

/// Session with a scratch directory for input and output files
pub struct TestSession {
    pub session: Session,
    pub dir: TempDir,
}

impl TestSession {
    /// Session with a short quiet period and unoptimized export
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self {
            session: Session::start(config),
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    /// Path inside the scratch directory
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Save `img` as PNG in the scratch directory
    pub fn write_png(&self, name: &str, img: &RgbaImage) -> PathBuf {
        let path = self.path(name);
        img.save(&path).expect("Failed to write fixture PNG");
        path
    }

    /// Write `img` and load it into the session
    pub async fn load(&self, img: &RgbaImage) -> Arc<Rendered> {
        let path = self.write_png("input.png", img);
        self.session
            .load_from_path(&path)
            .await
            .expect("Failed to load fixture")
    }

    /// Wait until the published result satisfies `pred`
    pub async fn wait_for(&self, pred: impl FnMut(&Option<Arc<Rendered>>) -> bool) -> Arc<Rendered> {
        let mut rx = self.session.results();
        let result = tokio::time::timeout(WAIT, rx.wait_for(pred))
            .await
            .expect("Timed out waiting for a result")
            .expect("Session dropped its result channel");
        result.clone().expect("Predicate accepted an empty slot")
    }

    pub async fn status(&self) -> SessionStatus {
        self.session.status().await.expect("Session closed")
    }

    /// Close the session and return the final ledger counters
    pub async fn close(self) -> LedgerStats {
        let ledger = self.session.ledger().clone();
        self.session.close().await.expect("Session already closed");
        ledger.stats()
    }
}

impl Default for TestSession {
    fn default() -> Self {
        Self::new()
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        quantize: QuantizeConfig {
            default_colors: 6,
            min_colors: 2,
            max_colors: 32,
            monochrome: false,
        },
        debounce: DebounceConfig {
            quiet_period_ms: 50,
        },
        export: ExportConfig {
            swatch_size: 8,
            optimize: false,
        },
    }
}

/// Next notice, failing the test if none arrives in time
pub async fn next_notice(rx: &mut tokio::sync::broadcast::Receiver<Notice>) -> Notice {
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("Timed out waiting for a notice")
        .expect("Notice channel closed")
}
