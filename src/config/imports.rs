//! Import closure resolution.
//!
//! A configuration file can import other configuration files, which can in
//! turn import more. [`resolve_closure`] walks that graph breadth-first and
//! returns every imported file exactly once, in discovery order.
//!
//! Import paths are resolved relative to the directory of the file declaring
//! them, never the process working directory: imports form a tree rooted at
//! arbitrary directories, and a package must render the same no matter where
//! the entry file lives.

use std::collections::{HashSet, VecDeque};
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::config::loader::load_config_file;
use crate::error::Result;

/// Compute the transitive closure of files imported by the entry config.
///
/// The returned list excludes the entry file itself. Every file appears at
/// most once even when reached through several import chains, so a diamond
/// of imports is read and parsed a single time.
///
/// # Errors
///
/// An unreadable or malformed file anywhere in the closure aborts resolution;
/// later stages depend on the exact set of visited files, so no partial
/// closure is returned.
pub fn resolve_closure(entry: &Path) -> Result<Vec<PathBuf>> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    seen.insert(normalize_path(entry));

    let mut queue: VecDeque<PathBuf> = VecDeque::new();
    enqueue_imports(entry, &mut queue, &mut seen)?;

    let mut closure = Vec::new();
    while let Some(file) = queue.pop_front() {
        enqueue_imports(&file, &mut queue, &mut seen)?;
        closure.push(file);
    }

    debug!("resolved import closure of {}: {:?}", entry.display(), closure);
    Ok(closure)
}

/// Parse one file's imports and enqueue any not seen before, resolved
/// against the file's own directory.
fn enqueue_imports(
    file: &Path,
    queue: &mut VecDeque<PathBuf>,
    seen: &mut HashSet<PathBuf>,
) -> Result<()> {
    let config = load_config_file(file)?;
    let dir = file.parent().unwrap_or_else(|| Path::new(""));
    for import in &config.imports {
        let resolved = normalize_path(&dir.join(import.path()));
        if seen.insert(resolved.clone()) {
            queue.push_back(resolved);
        }
    }
    Ok(())
}

/// Lexically normalize a path: drop `.` segments and collapse `..` against
/// preceding normal segments, so the same file reached through different
/// import chains compares equal.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    parts.iter().map(|c| c.as_os_str()).collect()
}
