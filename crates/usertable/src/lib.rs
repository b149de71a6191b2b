//! `usertable` - A minimal user table served over a REST API
//!
//! This library provides the record store, the HTTP API service in front of
//! it, a typed client for that API, and the client-side view model used by
//! the terminal commands.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod server;
pub mod storage;
pub mod ui;
pub mod user;

pub use client::ApiClient;
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use storage::Storage;
pub use user::{User, UserFields, UserInput};
