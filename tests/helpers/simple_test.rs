//! Simple test infrastructure for environment-backed tests
//!
//! Tests using [`TestEnv`] mutate process-global state and must be marked
//! `#[serial]`.

use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;

use super::test_data::SETTINGS_KEYS;

static INIT: Once = Once::new();

/// Initialize test environment
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// Temporary directory plus scoped environment variables
///
/// Every settings key is removed on creation and again on drop, and the
/// working directory is restored if it was changed.
pub struct TestEnv {
    pub temp_dir: TempDir,
    original_dir: Option<PathBuf>,
}

impl TestEnv {
    pub fn new() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        init_test_env();
        clear_settings_vars();
        Ok(Self {
            temp_dir: tempfile::tempdir()?,
            original_dir: None,
        })
    }

    pub fn set(&self, key: &str, value: &str) -> &Self {
        std::env::set_var(key, value);
        self
    }

    pub fn set_all(&self, pairs: &[(&str, &str)]) -> &Self {
        for (key, value) in pairs {
            std::env::set_var(key, value);
        }
        self
    }

    pub fn remove(&self, key: &str) -> &Self {
        std::env::remove_var(key);
        self
    }

    /// Path of `.env` inside the temporary directory
    pub fn dotenv_path(&self) -> PathBuf {
        self.temp_dir.path().join(".env")
    }

    pub fn write_dotenv(&self, contents: &str) -> PathBuf {
        let path = self.dotenv_path();
        std::fs::write(&path, contents).expect("Failed to write .env");
        path
    }

    /// Run the rest of the test from inside the temporary directory
    pub fn enter(&mut self) {
        if self.original_dir.is_none() {
            self.original_dir = Some(std::env::current_dir().expect("Failed to get current directory"));
        }
        std::env::set_current_dir(self.temp_dir.path()).expect("Failed to set current directory");
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }
}

impl Drop for TestEnv {
    fn drop(&mut self) {
        clear_settings_vars();
        if let Some(dir) = self.original_dir.take() {
            let _ = std::env::set_current_dir(dir);
        }
    }
}

fn clear_settings_vars() {
    for key in SETTINGS_KEYS {
        std::env::remove_var(key);
    }
}
