//! Request handlers.
//!
//! Each handler turns a parsed [`Request`](crate::http::request::Request)
//! into a [`Response`](crate::http::response::Response). Handlers never
//! return errors: every failure is mapped to a status code on the spot.

pub mod echo;
pub mod files;
pub mod user_agent;

pub use echo::echo;
pub use files::{WriteLocks, read_file, write_file};
pub use user_agent::user_agent;
