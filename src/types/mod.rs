// Linkbook shared type definitions
// Each submodule defines types used across the engine and its host wiring.

pub mod errors;
pub mod link;
pub mod relocation;
pub mod settings;
pub mod tree;
