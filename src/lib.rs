// ── cotab ─────────────────────────────────────────────────────────────────────
//
// Tab status and presence reconciliation for a collaborative text editor.
//
// The models (`session`, `buffer`, `user`, `folder`) are small observable
// stand-ins for the collaboration runtime.  `ui::label::TabLabel` subscribes
// to them and keeps each tab's icon, title colour, title and "changed by"
// dots consistent with whatever order their notifications arrive in.
//
// Everything here is single-threaded and free of `unsafe`.
#![deny(unsafe_code)]

pub mod app;
pub mod buffer;
pub mod commands;
pub mod config;
pub mod document;
pub mod error;
pub mod folder;
pub mod script;
pub mod session;
pub mod signal;
pub mod theme;
pub mod ui;
pub mod user;

pub use error::{CotabError, Result};
