// Reflow lifecycle: the host environment seam, the in-memory document, the block
// registry and its coordinator, the resize debounce, and the async driver task.

pub mod coordinator;
pub mod debounce;
pub mod document;
pub mod driver;
pub mod environment;

pub use coordinator::{Coordinator, ReflowReport, TextBlock};
pub use document::{Document, ElementSpec, ElementWidth};
pub use driver::{spawn_driver, ReflowHandle};
pub use environment::ReadyState;
