// relsync-io/src/lib.rs
//! Synchronous IO operations for relsync (filesystem, json, checksums, archives, process)

pub mod archive;
pub mod checksum;
pub mod fs;
pub mod json_io;
pub mod process;

pub use archive::compress_single_file;
pub use checksum::sha256_file;
pub use fs::{atomic_write_file, remove_file_if_exists};
pub use json_io::{read_json, write_json_pretty};
pub use process::{run_command, run_command_inherit};
