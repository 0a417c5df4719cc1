// Linkbook engine managers
// Managers hold the ordering logic: position allocation, tree compilation, relocation, deletion.

pub mod cascade_delete;
pub mod linkbook_manager;
pub mod position_allocator;
pub mod relocation;
pub mod relocation_commit;
pub mod tree_compiler;
