//! Page host abstraction and the headless implementation.

pub mod headless;
pub mod host;

pub use headless::{EvaluatedScript, HeadlessPage};
pub use host::PageHost;
