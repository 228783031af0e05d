//! Terminal output for the nobu CLI.
//!
//! Status lines go to stderr so they never mix with anything piped from
//! stdout.

mod messages;

pub use messages::{info, server_banner, success, warning};
