//! Actor identity and roles.
//!
//! Session handling is out of scope for this service; see [`identity`] for
//! the trusted-header boundary.

pub mod identity;
pub mod roles;

pub use identity::ActorIdentity;
pub use roles::Role;
