//! Session-keyed progress store.
//!
//! The tracker is constructed by the process entry point and shared via
//! `Arc` with every session runner. Pollers read the latest snapshot
//! per session; writers replace it.

mod tracker;

pub use tracker::ProgressTracker;
