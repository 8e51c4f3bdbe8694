//! Client tests against a local HTTP responder
//!
//! These tests exercise the real reqwest clients over a loopback socket
//! instead of reaching the public services.

pub mod responder;
