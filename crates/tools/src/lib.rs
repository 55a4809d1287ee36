//! Library side of the experiment tools: sweep planning and result
//! collection, kept out of the binaries so both are unit-testable.

pub mod collect;
pub mod sweep;
