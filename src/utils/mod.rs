// src/utils/mod.rs

pub mod snapshot_cache;
