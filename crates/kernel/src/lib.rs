//! Folio kernel library.
//!
//! Page catalog, block model, archive import, storage, and the HTTP API.
//! The `folio` binary wires these together from [`config::Config`].

pub mod archive;
pub mod catalog;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod media;
pub mod models;
pub mod projection;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
