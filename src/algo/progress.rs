//! Progress callbacks for long-running algorithms.
//!
//! # Example
//!
//! ```
//! use halfmesh::algo::Progress;
//! use halfmesh::algo::simplify::{simplify_with_progress, SimplifyOptions};
//! use halfmesh::mesh::TriMesh;
//!
//! let progress = Progress::new(|current, total, message| {
//!     eprintln!("[{current}/{total}] {message}");
//! });
//!
//! let mesh = TriMesh::new();
//! let options = SimplifyOptions::with_target_ratio(0.5);
//! let simplified = simplify_with_progress(&mesh, &options, &progress).unwrap();
//! assert!(simplified.is_empty());
//! ```

/// A progress callback that receives updates during long-running operations.
///
/// The callback receives the current step, the expected number of steps, and
/// a short description of the work. `current` may overshoot `total` when an
/// algorithm finishes more work than it asked for.
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// A reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}
