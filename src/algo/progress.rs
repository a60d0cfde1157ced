//! Progress reporting and cooperative cancellation.
//!
//! Long-running operations talk to their caller through a [`ProgressChannel`]:
//! they announce how many steps they will take, report each finished step,
//! poll for cancellation and finally close the channel. [`Progress`] is the
//! stock implementation, forwarding every update to a callback and reading
//! cancellation from a [`CancelToken`].
//!
//! # Example
//!
//! ```
//! use vertsnap::algo::progress::{CancelToken, Progress, ProgressChannel};
//!
//! let token = CancelToken::new();
//! let progress = Progress::new(|current, total, message| {
//!     println!("[{}/{}] {}", current, total, message);
//! })
//! .with_cancel(token.clone());
//!
//! progress.begin_progress(2, "Working ...");
//! progress.report_progress(1);
//! token.cancel();
//! assert!(progress.is_cancelled());
//! progress.end_progress();
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Channel through which an operation reports progress and learns about
/// cancellation.
pub trait ProgressChannel {
    /// Start a new run of `total` steps.
    fn begin_progress(&self, total: usize, status: &str);

    /// Report that `current` steps have finished.
    fn report_progress(&self, current: usize);

    /// Whether the caller asked the operation to stop.
    fn is_cancelled(&self) -> bool;

    /// Close the run, whether it finished or stopped early.
    fn end_progress(&self);
}

/// A shareable cancellation flag.
///
/// Clones observe the same flag, so one clone can be handed to the operation
/// and another kept by whoever may cancel it (possibly on another thread).
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation was requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// A progress callback that receives updates during long-running operations.
///
/// The callback receives:
/// - `current`: Number of finished steps
/// - `total`: Total number of steps
/// - `message`: Status text given when the run began, or `"cancelled"` when
///   the run ended early
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
    cancel: Option<CancelToken>,
    total: AtomicUsize,
    current: AtomicUsize,
    status: Mutex<String>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
            cancel: None,
            total: AtomicUsize::new(0),
            current: AtomicUsize::new(0),
            status: Mutex::new(String::new()),
        }
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }

    /// Attach a cancellation token.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Report progress directly to the callback.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    fn emit(&self, current: usize, message: Option<&str>) {
        let total = self.total.load(Ordering::Relaxed);
        match message {
            Some(message) => self.report(current, total, message),
            None => {
                let status = self.status.lock().unwrap_or_else(|e| e.into_inner());
                self.report(current, total, &status);
            }
        }
    }
}

impl ProgressChannel for Progress {
    fn begin_progress(&self, total: usize, status: &str) {
        self.total.store(total, Ordering::Relaxed);
        self.current.store(0, Ordering::Relaxed);
        {
            let mut guard = self.status.lock().unwrap_or_else(|e| e.into_inner());
            guard.clear();
            guard.push_str(status);
        }
        self.emit(0, None);
    }

    fn report_progress(&self, current: usize) {
        self.current.store(current, Ordering::Relaxed);
        self.emit(current, None);
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    fn end_progress(&self) {
        let current = self.current.load(Ordering::Relaxed);
        if current < self.total.load(Ordering::Relaxed) {
            self.emit(current, Some("cancelled"));
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progress")
            .field("cancel", &self.cancel)
            .field("total", &self.total)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}
