//! Mock platform client for testing.
//!
//! `MockPlatform` implements [`PlatformClient`] and records every call for
//! later assertion. Individual manifests can be told to fail by path
//! substring, configured before the run starts.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use rigger::platform::{MockPlatform, PlatformClient};
//!
//! let mut platform = MockPlatform::new();
//! platform.fail_delete_on("db.yaml");
//!
//! platform.apply(Path::new("web.yaml.inj")).unwrap();
//! assert!(platform.delete(Path::new("db.yaml.inj")).is_err());
//!
//! assert_eq!(platform.apply_count("web.yaml"), 1);
//! assert_eq!(platform.deleted().len(), 1);
//! ```

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use super::PlatformClient;
use crate::error::{Result, RiggerError};

/// Records platform calls and fails the ones it was configured to fail.
/// Failed calls are still recorded, so tests can assert an attempt was
/// made.
#[derive(Debug, Default)]
pub struct MockPlatform {
    applied: RefCell<Vec<PathBuf>>,
    checked: RefCell<Vec<PathBuf>>,
    deleted: RefCell<Vec<PathBuf>>,
    apply_failures: Vec<String>,
    check_failures: Vec<String>,
    delete_failures: Vec<String>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail apply calls whose manifest path contains `needle`.
    pub fn fail_apply_on(&mut self, needle: &str) {
        self.apply_failures.push(needle.to_string());
    }

    /// Fail check calls whose manifest path contains `needle`.
    pub fn fail_check_on(&mut self, needle: &str) {
        self.check_failures.push(needle.to_string());
    }

    /// Fail delete calls whose manifest path contains `needle`.
    pub fn fail_delete_on(&mut self, needle: &str) {
        self.delete_failures.push(needle.to_string());
    }

    /// Manifests passed to apply, in call order.
    pub fn applied(&self) -> Vec<PathBuf> {
        self.applied.borrow().clone()
    }

    /// Manifests passed to check, in call order.
    pub fn checked(&self) -> Vec<PathBuf> {
        self.checked.borrow().clone()
    }

    /// Manifests passed to delete, in call order.
    pub fn deleted(&self) -> Vec<PathBuf> {
        self.deleted.borrow().clone()
    }

    /// Number of apply calls whose path contains `needle`.
    pub fn apply_count(&self, needle: &str) -> usize {
        count_matching(&self.applied.borrow(), needle)
    }

    /// Number of delete calls whose path contains `needle`.
    pub fn delete_count(&self, needle: &str) -> usize {
        count_matching(&self.deleted.borrow(), needle)
    }

    /// Position of the first apply call whose path contains `needle`.
    pub fn apply_position(&self, needle: &str) -> Option<usize> {
        self.applied
            .borrow()
            .iter()
            .position(|p| p.to_string_lossy().contains(needle))
    }

    fn hits(failures: &[String], manifest: &Path) -> bool {
        let path = manifest.to_string_lossy();
        failures.iter().any(|needle| path.contains(needle.as_str()))
    }

    fn failure(action: &str, manifest: &Path) -> RiggerError {
        RiggerError::CommandFailed {
            command: format!("{action} {}", manifest.display()),
            code: Some(1),
        }
    }
}

fn count_matching(calls: &[PathBuf], needle: &str) -> usize {
    calls
        .iter()
        .filter(|p| p.to_string_lossy().contains(needle))
        .count()
}

impl PlatformClient for MockPlatform {
    fn apply(&self, manifest: &Path) -> Result<()> {
        self.applied.borrow_mut().push(manifest.to_path_buf());
        if Self::hits(&self.apply_failures, manifest) {
            return Err(Self::failure("apply", manifest));
        }
        Ok(())
    }

    fn check(&self, manifest: &Path) -> Result<()> {
        self.checked.borrow_mut().push(manifest.to_path_buf());
        if Self::hits(&self.check_failures, manifest) {
            return Err(RiggerError::NotReady {
                path: manifest.to_path_buf(),
                message: "configured to fail".to_string(),
            });
        }
        Ok(())
    }

    fn delete(&self, manifest: &Path) -> Result<()> {
        self.deleted.borrow_mut().push(manifest.to_path_buf());
        if Self::hits(&self.delete_failures, manifest) {
            return Err(Self::failure("delete", manifest));
        }
        Ok(())
    }
}
