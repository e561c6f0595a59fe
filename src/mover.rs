//! Copy-then-delete file transfer that never overwrites.
//!
//! A move opens the source, refuses an existing destination, streams every
//! byte into a freshly created destination file and only then removes the
//! source. A copy that fails partway leaves the partial destination in place
//! and keeps the source.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur while moving a single file.
#[derive(Debug)]
pub enum MoveError {
    /// The source file could not be opened for reading.
    OpenSource { path: PathBuf, source: io::Error },
    /// Something already exists at the destination path.
    DestinationExists { path: PathBuf },
    /// Checking the destination failed for a reason other than "not found".
    Stat { path: PathBuf, source: io::Error },
    /// The destination file could not be created.
    CreateDestination { path: PathBuf, source: io::Error },
    /// Copying the contents failed; the partial destination is left behind.
    Copy {
        source_path: PathBuf,
        destination: PathBuf,
        source: io::Error,
    },
    /// The copy completed but the source could not be removed, so the file
    /// now exists in both places.
    RemoveSource {
        path: PathBuf,
        destination: PathBuf,
        source: io::Error,
    },
}

impl MoveError {
    /// Returns true when a complete copy exists at the destination.
    pub fn left_duplicate(&self) -> bool {
        matches!(self, Self::RemoveSource { .. })
    }
}

impl std::fmt::Display for MoveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenSource { path, source } => {
                write!(f, "Failed to open source file {}: {}", path.display(), source)
            }
            Self::DestinationExists { path } => {
                write!(f, "Destination file already exists: {}", path.display())
            }
            Self::Stat { path, source } => {
                write!(f, "Failed to check destination {}: {}", path.display(), source)
            }
            Self::CreateDestination { path, source } => {
                write!(
                    f,
                    "Failed to create destination file {}: {}",
                    path.display(),
                    source
                )
            }
            Self::Copy {
                source_path,
                destination,
                source,
            } => {
                write!(
                    f,
                    "Failed to copy {} to {}: {}",
                    source_path.display(),
                    destination.display(),
                    source
                )
            }
            Self::RemoveSource {
                path,
                destination,
                source,
            } => {
                write!(
                    f,
                    "Copied to {} but failed to remove source {}: {}",
                    destination.display(),
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for MoveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::OpenSource { source, .. }
            | Self::Stat { source, .. }
            | Self::CreateDestination { source, .. }
            | Self::Copy { source, .. }
            | Self::RemoveSource { source, .. } => Some(source),
            Self::DestinationExists { .. } => None,
        }
    }
}

/// Result type for move operations.
pub type MoveResult<T> = Result<T, MoveError>;

/// Checks that nothing exists at `destination`.
///
/// Used both before a real move and by dry runs to report collisions.
pub fn ensure_vacant(destination: &Path) -> MoveResult<()> {
    match fs::symlink_metadata(destination) {
        Ok(_) => Err(MoveError::DestinationExists {
            path: destination.to_path_buf(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(MoveError::Stat {
            path: destination.to_path_buf(),
            source: e,
        }),
    }
}

/// Moves `source` to `destination` by copying then deleting.
///
/// Returns the number of bytes copied.
///
/// # Examples
///
/// ```no_run
/// use datesort::mover::move_file;
/// use std::path::Path;
///
/// match move_file(Path::new("/in/AB2024C05D17.mp4"), Path::new("/out/AB2024C05D17.mp4")) {
///     Ok(bytes) => println!("Moved {} bytes", bytes),
///     Err(e) => eprintln!("Move failed: {}", e),
/// }
/// ```
pub fn move_file(source: &Path, destination: &Path) -> MoveResult<u64> {
    let mut source_file = File::open(source).map_err(|e| MoveError::OpenSource {
        path: source.to_path_buf(),
        source: e,
    })?;

    ensure_vacant(destination)?;

    // create_new also rejects a destination created after the check
    let mut destination_file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => MoveError::DestinationExists {
                path: destination.to_path_buf(),
            },
            _ => MoveError::CreateDestination {
                path: destination.to_path_buf(),
                source: e,
            },
        })?;

    let copy_error = |e: io::Error| MoveError::Copy {
        source_path: source.to_path_buf(),
        destination: destination.to_path_buf(),
        source: e,
    };
    let bytes = io::copy(&mut source_file, &mut destination_file).map_err(copy_error)?;
    destination_file.sync_all().map_err(copy_error)?;

    drop(source_file);
    drop(destination_file);

    fs::remove_file(source).map_err(|e| MoveError::RemoveSource {
        path: source.to_path_buf(),
        destination: destination.to_path_buf(),
        source: e,
    })?;

    Ok(bytes)
}
