// linkkeeper state managers
// Managers own the live item tree and the per-root category files.

pub mod category_store;
pub mod item_tree;
