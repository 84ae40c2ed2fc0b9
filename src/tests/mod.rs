//! Integration tests for the bid router.
//!
//! End-to-end cases driving the full application: sampling under load,
//! lifecycle over a real intake socket, and the admin API.

mod cases_router_lifecycle_test;

pub mod support;
