// linkkeeper shared type definitions
// Each submodule defines types used across the crate.

pub mod archive;
pub mod errors;
pub mod item;
pub mod settings;
