//! Integration tests for Site-Ripple
//!
//! These tests use wiremock to create mock HTTP servers and drive full
//! crawls end-to-end.

mod common;
mod crawl_tests;
mod report_tests;
