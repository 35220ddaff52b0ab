//! The store is one flat directory. Only its direct children are visible, and of those only
//! regular files take part in listing, download and delete.
//!
//! ## Concurrency
//!
//! A single [RwLock] covers the whole directory. [Store::upload] and [Store::delete] hold it
//! exclusively for the full mutation (create and copy, or stat and remove). [Store::list] and
//! the validation part of [Store::open] share it.
//!
//! The lock orders mutations; it is not what prevents two uploads of the same name from both
//! succeeding. The destination is always created with `create_new`, so the filesystem refuses
//! the second creation even if something outside the lock got there first.
//!
//! A slow uploader keeps the exclusive lock for the duration of its transfer, stalling other
//! uploads and deletes until it finishes or the connection drops.
//!
//! A handle returned by [Store::open] is used after the lock is released. On unix the handle
//! stays readable after a concurrent [Store::delete] unlinks the name. On Windows the delete
//! fails instead while the file is open. Platforms offering neither would need removal
//! deferred until the last handle closes.
//!
//! Nothing here protects against other processes writing to the same directory.
use std::fs::{
    self,
    File,
    OpenOptions,
};
use std::io::{
    self,
    Read,
    Write,
};
use std::path::PathBuf;
use std::sync::{
    PoisonError,
    RwLock,
    RwLockReadGuard,
    RwLockWriteGuard,
};
use std::time::{
    SystemTime,
    UNIX_EPOCH,
};

use chrono::{
    DateTime,
    Local,
};
use log::{debug, info};
use url::form_urlencoded;

use crate::error::{
    Result,
    StoreError,
};
use crate::name::{
    is_special,
    safe_file_name,
};
use crate::size::human_readable_size;

/// Size of the intermediate buffer used when copying upload data to disk.
pub const COPY_BUFFER_SIZE: usize = 1024 * 1024;

/// Format used for every timestamp shown to clients.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Immutable settings handed to the [Store] at construction.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding the files. Must exist.
    pub root: PathBuf,
    /// Upload cap in bytes, enforced by the request layer.
    pub max_upload_size: u64,
    /// Whether clients may delete files.
    pub delete_enabled: bool,
    /// Scheme, host and port used to build links, e.g. `http://myhost:8080`.
    pub base_url: String,
}

impl StoreConfig {
    pub fn max_upload_size_human(&self) -> String {
        human_readable_size(self.max_upload_size)
    }
}

/// One regular file in a listing.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub name: String,
    pub size: u64,
    pub size_human: String,
    pub modified: SystemTime,
    pub modified_display: String,
    pub download_link: String,
    pub curl: String,
}

pub struct Store {
    config: StoreConfig,
    lock: RwLock<()>,
}

/// Render a point in time the way all pages show it.
pub fn format_time(t: SystemTime) -> String {
    let dt: DateTime<Local> = t.into();
    dt.format(TIME_FORMAT).to_string()
}

impl Store {

    pub fn new(config: StoreConfig) -> Store {
        Store {
            config,
            lock: RwLock::new(()),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // The lock guards no data, so a panic while holding it leaves nothing inconsistent.
    fn shared(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn exclusive(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Map a sanitized name to its location. Names that only make sense as directories
    /// resolve to the root itself.
    fn resolve(&self, safe_name: &str) -> PathBuf {
        if is_special(safe_name) {
            return self.config.root.clone();
        }
        self.config.root.join(safe_name)
    }

    /// Link under which a file of the given name can be downloaded.
    pub fn download_link(&self, name: &str) -> String {
        let query: String = form_urlencoded::Serializer::new(String::new())
            .append_pair("file", name)
            .finish();
        format!("{}/download?{}", self.config.base_url.trim_end_matches('/'), query)
    }

    fn entry_for(&self, name: String, size: u64, modified: SystemTime) -> FileEntry {
        let download_link = self.download_link(&name);
        let curl = format!("curl -L -o '{}' '{}'", &name, &download_link);
        FileEntry {
            size_human: human_readable_size(size),
            modified_display: format_time(modified),
            name,
            size,
            modified,
            download_link,
            curl,
        }
    }

    fn unavailable(&self, e: io::Error) -> StoreError {
        StoreError::DirectoryUnavailable {
            path: self.config.root.clone(),
            source: e,
        }
    }

    /// List the regular files directly inside the root, most recently modified first.
    ///
    /// Entries with identical modification times are ordered by name.
    pub fn list(&self) -> Result<Vec<FileEntry>> {
        let _guard = self.shared();

        let dir = fs::read_dir(&self.config.root).map_err(|e| self.unavailable(e))?;
        let mut entries: Vec<FileEntry> = vec!();
        for entry in dir {
            let entry = entry.map_err(|e| self.unavailable(e))?;
            let meta = match entry.metadata() {
                Ok(v) => v,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    continue;
                },
                Err(e) => {
                    return Err(self.unavailable(e));
                },
            };
            if !meta.is_file() {
                continue;
            }
            // Names that are not valid UTF-8 cannot be addressed by download or delete.
            let name = match entry.file_name().into_string() {
                Ok(v) => v,
                Err(v) => {
                    debug!("skipping non UTF-8 name {:?}", v);
                    continue;
                },
            };
            let modified = meta.modified().unwrap_or(UNIX_EPOCH);
            entries.push(self.entry_for(name, meta.len(), modified));
        }

        entries.sort_by(|a, b| {
            b.modified.cmp(&a.modified).then_with(|| a.name.cmp(&b.name))
        });
        debug!("listed {} files in {:?}", entries.len(), &self.config.root);
        Ok(entries)
    }

    /// Store the contents of `src` under the base name of `name`.
    ///
    /// Fails with [StoreError::AlreadyExists] without touching the disk if the name is taken.
    /// Data is copied through a buffer of [COPY_BUFFER_SIZE] bytes. If reading or writing
    /// fails midway the partially written file is left in place.
    ///
    /// The size of `src` is not limited here.
    ///
    /// # Arguments
    ///
    /// * `name` - File name proposed by the client.
    /// * `src` - Content to store.
    pub fn upload(&self, name: &str, mut src: impl Read) -> Result<u64> {
        let safe_name = safe_file_name(name);
        let _guard = self.exclusive();

        let path = self.resolve(&safe_name);
        if fs::symlink_metadata(&path).is_ok() {
            return Err(StoreError::AlreadyExists(safe_name));
        }

        let mut dst = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(v) => v,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(StoreError::AlreadyExists(safe_name));
            },
            Err(e) => {
                return Err(StoreError::WriteFailed {
                    name: safe_name,
                    source: e,
                });
            },
        };
        debug!("created {:?}", &path);

        let mut buf = vec![0u8; COPY_BUFFER_SIZE];
        let mut total_size: u64 = 0;
        loop {
            let n = match src.read(&mut buf[..]) {
                Ok(0) => break,
                Ok(v) => v,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(StoreError::WriteFailed {
                        name: safe_name,
                        source: e,
                    });
                },
            };
            if let Err(e) = dst.write_all(&buf[..n]) {
                return Err(StoreError::WriteFailed {
                    name: safe_name,
                    source: e,
                });
            }
            total_size += n as u64;
        }

        info!("stored {} ({} bytes)", &safe_name, total_size);
        Ok(total_size)
    }

    /// Validate that `safe_name` is an existing regular file and return its path.
    fn check_file(&self, safe_name: &str) -> Result<PathBuf> {
        let path = self.resolve(safe_name);
        let meta = match fs::metadata(&path) {
            Ok(v) => v,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(safe_name.to_string()));
            },
            Err(e) => {
                return Err(StoreError::Io {
                    name: safe_name.to_string(),
                    source: e,
                });
            },
        };
        if meta.is_dir() {
            return Err(StoreError::IsDirectory(safe_name.to_string()));
        }
        if !meta.is_file() {
            return Err(StoreError::Io {
                name: safe_name.to_string(),
                source: io::Error::new(io::ErrorKind::Other, "not a regular file"),
            });
        }
        Ok(path)
    }

    /// Remove the file with the base name of `name`.
    pub fn delete(&self, name: &str) -> Result<()> {
        let safe_name = safe_file_name(name);
        let _guard = self.exclusive();

        let path = self.check_file(&safe_name)?;
        match fs::remove_file(&path) {
            Ok(()) => {},
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(safe_name));
            },
            Err(e) => {
                return Err(StoreError::Io {
                    name: safe_name,
                    source: e,
                });
            },
        };
        info!("deleted {:?}", &path);
        Ok(())
    }

    /// Open the file with the base name of `name` for reading.
    ///
    /// The lock is only held while validating and opening; the returned handle is read
    /// without it. See the module documentation for what happens on a concurrent delete.
    pub fn open(&self, name: &str) -> Result<File> {
        let safe_name = safe_file_name(name);
        let _guard = self.shared();

        let path = self.check_file(&safe_name)?;
        match File::open(&path) {
            Ok(f) => {
                debug!("opened {:?} for reading", &path);
                Ok(f)
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(safe_name))
            },
            Err(e) => {
                Err(StoreError::Io {
                    name: safe_name,
                    source: e,
                })
            },
        }
    }
}
