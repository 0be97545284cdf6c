//! Sparrow - a minimal HTTP/1.1 server on raw TCP
//!
//! Parses requests straight off the socket, routes them to a handful of
//! handlers (echo, user-agent reflection, file read and write) and writes
//! the response back before closing the connection.

pub mod config;
pub mod handlers;
pub mod http;
pub mod router;
pub mod server;
