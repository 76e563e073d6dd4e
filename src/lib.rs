#![deny(missing_docs)]
//! A tiny record store for "students", kept in a single JSON file and served over a REST API.
//!
//! This crate provides the storage and command layers themselves, as well as a
//! [`studentdb-server`] and [`studentdb-client`] executable that can be used to interact with
//! them.
//!
//! ## Document
//! All state lives in one [`Document`]: `{ "students": [ ... ] }`. Each [`Student`] is an
//! ordered map of fields with an integer `id`. The document is always read in full and written
//! back in full; there are no indexes and no partial writes.
//!
//! ## Store
//! The [`Store`] trait abstracts reading and writing the whole document.
//! [`JsonFileStore`] keeps it in a pretty-printed JSON file (`storage.json` by default),
//! [`MemoryStore`] keeps it in memory.
//!
//! ## Commands
//! Four operations are supported on the document, see [`Command`]:
//!
//! - `select` every student
//! - `include` (insert) new students at the end of the list
//! - `update` one field of a student, the new value is always a string
//! - `exclude` (delete) every student with a given id
//!
//! Commands can be built directly or parsed from their textual form, e.g.
//! `update students set name = "Anna" where id=17`. The [`Interpreter`] executes them against
//! a store.
//!
//! ## REST facade
//! [`StudentServer`] maps `GET/POST /students` and `GET/PUT/DELETE /students/:id` onto commands
//! and [`StudentClient`] is the matching blocking HTTP client.
//!
//! ## Known limitations
//! Student ids are the creation time in milliseconds and are never checked for uniqueness.
//! A PUT with several fields runs one update per field; other requests may run in between and a
//! failure part way leaves the earlier fields updated.
//!
//! [`studentdb-server`]: ./studentdb-server.rs
//! [`studentdb-client`]: ./studentdb-client.rs

pub use client::StudentClient;
pub use command::{Command, Outcome};
pub use document::{Document, Student};
pub use error::{DbError, Result};
pub use interpreter::Interpreter;
pub use server::StudentServer;
pub use store::{JsonFileStore, MemoryStore, Store};

mod client;
pub mod command;
mod document;
mod error;
mod interpreter;
mod server;
pub mod store;
