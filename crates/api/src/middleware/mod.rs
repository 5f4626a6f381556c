//! Request middleware: authentication extraction and access guards.

pub mod auth;
