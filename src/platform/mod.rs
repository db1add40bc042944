//! Platform clients: the boundary between orchestration and the cluster.
//!
//! The engine never shells out on its own. Everything it needs from the
//! outside world is three primitives over a rendered manifest file, and
//! [`PlatformClient`] is the seam where those primitives plug in. The real
//! implementation drives `kubectl`; [`MockPlatform`] records calls for
//! tests.

pub mod kubectl;
pub mod mock;

pub use kubectl::KubectlClient;
pub use mock::MockPlatform;

use std::path::Path;

use crate::error::Result;

/// External primitives the orchestration engine drives.
///
/// All three take the path of a rendered manifest. Implementations decide
/// what submitting, readiness and removal mean for their platform.
pub trait PlatformClient {
    /// Submit the manifest, creating or updating its resources.
    fn apply(&self, manifest: &Path) -> Result<()>;

    /// Block until the manifest's resources report ready, within the
    /// implementation's retry bounds.
    fn check(&self, manifest: &Path) -> Result<()>;

    /// Remove the manifest's resources.
    fn delete(&self, manifest: &Path) -> Result<()>;
}
