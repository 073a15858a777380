//! Flora aggregation pipeline.
//!
//! Lists local herb metadata files, loads them, enriches each entry from its
//! source repository, and writes one rendered document per herb plus a
//! consolidated `flora.json` summary.

pub mod emit;
pub mod lister;
pub mod loader;
pub mod pipeline;
pub mod render;
