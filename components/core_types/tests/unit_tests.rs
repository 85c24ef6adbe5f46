//! Integration test runner for unit tests
//! This file makes cargo test discover the unit test modules

#[path = "unit/test_error.rs"]
mod test_error;

#[path = "unit/test_history.rs"]
mod test_history;

#[path = "unit/test_value.rs"]
mod test_value;
