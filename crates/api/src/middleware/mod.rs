//! Request middleware.

pub mod identity;

pub use identity::{AuthUser, USER_ID_HEADER, identity_middleware};
