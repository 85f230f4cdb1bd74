// relsync-net/src/lib.rs
pub mod github;
pub mod validation;

pub use github::GithubReleaseClient;
pub use validation::validate_url;
