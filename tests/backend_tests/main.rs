//! Backend test suite
//!
//! Contract checks for the in-memory store, plus the shared contract run
//! against both shipped stores.

mod memory_tests;
