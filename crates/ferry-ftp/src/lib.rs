//! # ferry-ftp
//!
//! FTP transfer client for `ferry-core`. [`FtpClient`] drives a blocking
//! `suppaftp` session from async code: each command runs on Tokio's blocking
//! pool, and a mutex around the session keeps commands on the single control
//! connection strictly one at a time.
//!
//! ```no_run
//! use ferry_core::AdapterOptions;
//!
//! # async fn demo(options: AdapterOptions) -> ferry_core::Result<()> {
//! let adapter = ferry_ftp::connect(options)?;
//! adapter.create_file("hello.txt", "Hello!").await?;
//! println!("{}", adapter.get_file_location("hello.txt"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod client;

pub use client::{FtpClient, DEFAULT_CHUNK_SIZE};

use ferry_core::{AdapterOptions, StorageAdapter};
use std::sync::Arc;

/// Build a [`StorageAdapter`] over a fresh [`FtpClient`]
///
/// The FTP session starts connecting before this returns.
///
/// # Errors
/// Returns [`ferry_core::Error::MissingOption`] if `ftp.host` or `http.host`
/// is absent
pub fn connect(options: AdapterOptions) -> ferry_core::Result<StorageAdapter> {
    StorageAdapter::new(options, Arc::new(FtpClient::new()))
}
