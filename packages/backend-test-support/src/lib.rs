//! Test support shared by the backend's unit and integration tests.
//!
//! Currently this is the unified tracing initialization; both test harnesses
//! install it through `ctor` so log output follows `TEST_LOG`/`RUST_LOG`.

pub mod logging;
