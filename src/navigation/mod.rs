//! Navigation: address resolution, published state, and the controller.

pub mod address;
pub mod controller;
pub mod state;

pub use address::{AddressKind, AddressResolver, KNOWN_TLDS};
pub use controller::Navigator;
pub use state::NavigationState;
