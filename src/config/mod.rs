//! Configuration for the shared watch layer.
//!
//! The core owns no CLI, environment variables, or config files;
//! callers construct a [`WatchConfig`] (or take the defaults) and hand
//! it over at construction time.

mod watch;
pub use watch::*;
