//! External delivery channels for notifications.
//!
//! Email is the only channel today; the notification router in the API
//! server fans domain events out to it.

pub mod email;
