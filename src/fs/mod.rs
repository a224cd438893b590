//! Filesystem helpers.
//!
//! Generated issue files and saved configuration are written atomically so a
//! crash never leaves a half-written document behind.

pub mod atomic;

pub use atomic::{atomic_write, atomic_write_file};
