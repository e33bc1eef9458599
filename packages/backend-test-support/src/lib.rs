//! Shared test support utilities.
//!
//! Currently this crate only carries the unified logging initialization used
//! by unit and integration tests across the workspace.

pub mod test_logging;
