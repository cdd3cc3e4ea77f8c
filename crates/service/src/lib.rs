//! Service layer for fieldarea.
//!
//! The session store orchestrates saving, loading and repairing sessions against an
//! object store on behalf of the signed-in user.

mod error;
mod identity;
mod session_store;
#[cfg(test)]
mod tests;

pub use error::ServiceError;
pub use identity::{IdentityProvider, StaticIdentity};
pub use session_store::SessionStore;
