mod event;
mod store;
mod watcher;
pub use event::*;
pub use store::*;
pub use watcher::*;
