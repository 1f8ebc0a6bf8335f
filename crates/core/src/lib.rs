//! Domain types shared by the dispatch service crates.
//!
//! - [`roles`] -- the closed [`Role`](roles::Role) enumeration.
//! - [`users`] -- credential and user records plus the [`UserStore`](users::UserStore)
//!   persistence interface.
//! - [`error`] -- domain-level error type.

pub mod error;
pub mod roles;
pub mod types;
pub mod users;
