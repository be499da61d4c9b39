//! Read-optimized mirrors of committed customer state.

pub mod read_cache;
