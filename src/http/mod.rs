//! HTTP transport
//!
//! The dispatcher talks to the network through the [`Transport`] trait so the
//! HTTP stack can be swapped out. [`HttpTransport`] is the reqwest-backed
//! implementation used by default.
//!
//! # Wire format
//!
//! - Read requests put the signed query string on the URL
//! - Write requests send the same string as a form-encoded body
//! - Every request carries the `Authorization` token
//! - The response body is parsed as JSON regardless of HTTP status; the API
//!   reports failures through the `code` field of the body

mod client;

pub use client::{ApiRequest, HttpTransport, Transport};
