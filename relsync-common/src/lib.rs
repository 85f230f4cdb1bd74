// relsync-common/src/lib.rs
pub mod config;
pub mod error;
pub mod model;
pub mod plan;
pub mod store;

// Re-export key types
pub use config::{Config, Credentials};
pub use error::{RelsyncError, Result};
pub use model::{Manifest, Release, RemoteAsset, Target};
pub use store::ReleaseStore;
