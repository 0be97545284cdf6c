//! HTTP protocol implementation.
//!
//! Just enough HTTP/1.1 to answer one request per connection, written
//! directly against the byte stream.
//!
//! # Architecture
//!
//! - **`connection`**: reads a request off the stream, routes it, writes the response
//! - **`parser`**: turns a byte buffer into a [`request::Request`]
//! - **`request`**: HTTP request representation
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: serializes and writes responses to the client
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Single read, or buffer until complete
//!        └──────┬──────┘
//!               │ Request parsed        (malformed → 400, skip Processing)
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Router picks a handler
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               ▼
//!            Closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sparrow::http::connection::{Connection, ReadSettings};
//! use sparrow::router::Router;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:4221").await?;
//!     let router = Arc::new(Router::new("/tmp"));
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let router = Arc::clone(&router);
//!         tokio::spawn(async move {
//!             let mut conn = Connection::new(socket, router, ReadSettings::default());
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
