//! Test case table
//!
//! Static data mapping stimulus step identifiers to the REST request that
//! triggers them. The table lives in YAML, not in code.

mod cases;
mod descriptor;

pub use cases::TestCaseTable;
pub use descriptor::*;
