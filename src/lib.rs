#![crate_name = "fsrv"]

//! fsrv is a minimal HTTP file server for ad-hoc sharing of files over a local network.
//!
//! All files live in a single flat directory, the _store_. Clients can list, upload, download
//! and (if enabled) delete files through a few plain HTML pages or with `curl`. There is no
//! authentication and no state besides the files themselves.
//!
//! ## Running the daemon
//!
//! The fsrv daemon will listen to all ip addresses on port 8080 by default, and store and
//! serve files from `./store`, creating it if needed. See `cargo run -- --help` for the
//! options.
//!
//! ## Endpoints
//!
//! | Method | Path | |
//! |---|---|---|
//! | GET | `/` or `/files` | file list |
//! | GET | `/toUpload` | upload form |
//! | POST | `/upload` | multipart upload, field `file` |
//! | GET | `/download?file=NAME` | file content as attachment |
//! | GET | `/del?file=NAME` | delete, only with `--delete` |
//!
//! ## Uploading content
//!
//! With a server running on `localhost:8080`:
//!
//! ``` ignore,
//! curl -F 'file=@/path/report.txt' http://localhost:8080/upload
//! ```
//!
//! An upload never replaces an existing file of the same name.

/// Command line settings.
pub mod arg;

/// Errors surfaced by store operations.
pub mod error;

/// Sanitizing of client supplied file names.
pub mod name;

/// HTML rendering.
pub mod page;

/// Encapsulates an incoming remote request.
pub mod request;

/// Encapsulates an outgoing response to remote.
pub mod response;

/// Worker threads serving requests.
pub mod server;

/// Directory bootstrap at startup.
pub mod setup;

/// Human readable byte counts.
pub mod size;

/// The file store and its concurrency rules.
pub mod store;
