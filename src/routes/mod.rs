//! Router Module Index
//!
//! Routes are grouped by the access tier the `AccessPolicy` assigns to their paths. The
//! grouping is organisational; enforcement happens in the `access_control` middleware,
//! which consults the policy table for every request.

/// Routes open to anonymous callers.
pub mod public;

/// Routes that need any authenticated principal.
pub mod authenticated;

/// Routes that need the `ADMIN` role.
pub mod admin;
