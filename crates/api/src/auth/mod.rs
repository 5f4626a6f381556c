//! Authentication primitives: JWT claims, token generation and validation.

pub mod jwt;
