//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that drives the scheduler end to end
//! against the mock board and link. All tests run on the host with no
//! real hardware required.

mod acquisition_tests;
mod command_tests;
mod mock_board;
mod status_tests;
