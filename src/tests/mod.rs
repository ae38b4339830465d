//! Endpoint tests: the full router against an in-memory store.

mod scan_endpoint_tests;
