//! Storage layer: trait boundaries for the persistence collaborators and
//! their Postgres implementations.
//!
//! The auth subsystem only ever talks to these traits, which keeps it
//! testable against the in-memory store shipped in `mediaflow-test-utils`.

pub mod profiles;
pub mod roles;
pub mod users;

pub use profiles::{PgProfileStore, ProfileStore};
pub use roles::{PgRoleStore, RoleStore};
pub use users::{PgUserStore, UserStore};
