//! Unit tests for async_runtime

mod abort_test;
mod timers_test;
