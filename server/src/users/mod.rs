//! User replica maintained from upstream lifecycle events.

pub mod events;
pub mod queries;
pub mod types;

pub use types::User;
