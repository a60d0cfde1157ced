//! Mesh processing algorithms.
//!
//! - **Snapping**: move vertices onto the closest vertex of a reference
//!   surface ([`snap`])
//! - **Progress**: step reporting and cooperative cancellation shared by
//!   long-running operations ([`progress`])

pub mod progress;
pub mod snap;

pub use progress::{CancelToken, Progress, ProgressChannel};
