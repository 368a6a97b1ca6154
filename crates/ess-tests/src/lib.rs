//! Shared helpers for the integration tests and benchmarks.
//!
//! The workspace has no write path, so test inputs are assembled here
//! byte by byte. [`fixture`] is the only module; everything in it builds
//! wire bytes and none of it goes through the decoder.

pub mod fixture;
