pub mod fixtures;
pub mod memory_store;

#[allow(unused_imports)]
pub use fixtures::{package_target, write_raw_target, BuildTree};
#[allow(unused_imports)]
pub use memory_store::MemoryReleaseStore;
