mod registry;
mod settings;

pub use registry::*;
pub use settings::*;

use std::path::PathBuf;
use std::{env, io};

/// Resolve a relative path against the working directory.
pub fn normalize_path(path: &str) -> io::Result<PathBuf> {
    let path_buf = PathBuf::from(path);

    Ok(if path_buf.is_absolute() {
        path_buf
    } else {
        env::current_dir()?.join(path_buf)
    })
}
