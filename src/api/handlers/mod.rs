//! Route handlers for the identity-provider API.

pub mod health;
pub mod transfer;
