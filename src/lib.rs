//! Turnstile - In-Process Request Admission
//!
//! This crate implements the request admission layer of an HTTP
//! microservice: every inbound request is checked against a per-key budget
//! before it reaches business logic. Two admission algorithms (fixed window
//! and token bucket) sit behind one pluggable backend contract, selected by
//! configuration, with partition keys derived from the client address, the
//! endpoint, or both. State is in-memory and process-local; cross-process
//! coordination is out of scope.

pub mod config;
pub mod error;
pub mod filter;
pub mod ratelimit;
