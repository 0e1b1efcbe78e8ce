//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod post_store;
mod user_store;

#[cfg(test)]
pub use post_store::MockPostStore;
pub use post_store::{FixturePostStore, PostStore, PostStoreError};
#[cfg(test)]
pub use user_store::MockUserStore;
pub use user_store::{FixtureUserStore, UserStore, UserStoreError};
