use std::env;
use std::fs;
use std::io;
use std::path::{
    Path,
    PathBuf,
};

use log::info;

/// Name of the scratch directory next to the executable.
pub const TMP_DIR_NAME: &str = "tmp";

/// Make sure `dir` exists as a directory, creating it and any missing parents.
pub fn check_and_create_dir(dir: &Path) -> io::Result<()> {
    match fs::metadata(dir) {
        Ok(v) => {
            if !v.is_dir() {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} exists and is not a directory", dir.display()),
                    ));
            }
            info!("directory already exists: {}", dir.display());
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir)?;
            info!("directory created: {}", dir.display());
        },
        Err(e) => {
            return Err(e);
        },
    };
    Ok(())
}

/// Create the scratch directory used for spooling large request bodies.
///
/// It lives next to the running executable rather than in the system temporary directory,
/// which is often too small for multi-gigabyte uploads.
pub fn prepare_tmp_dir() -> io::Result<PathBuf> {
    let exe = env::current_exe()?;
    info!("current executable path: {}", exe.display());
    let base = match exe.parent() {
        Some(v) => v.to_path_buf(),
        None => {
            return Err(io::Error::new(io::ErrorKind::NotFound, "executable has no parent directory"));
        },
    };
    let tmp_dir = base.join(TMP_DIR_NAME);
    check_and_create_dir(&tmp_dir)?;
    Ok(tmp_dir)
}
