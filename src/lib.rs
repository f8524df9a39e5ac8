//! Pinned dependency vendoring.
//!
//! Reads a JSON manifest of git and mercurial dependencies and brings each
//! one to its pinned revision under `_vendor/src`, next to a `.env` file
//! that puts `_vendor` on `GOPATH`.
//!
//! The public API is organised into layers:
//!
//! - **[`manifest`]**: parse and validate the dependency manifest
//! - **[`resources`]**: idempotent `check + apply` checkouts per VCS
//! - **[`vendor`]** and **[`env_hint`]**: the on-disk layout around them
//! - **[`commands`]**: the install run that ties it together
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod env_hint;
pub mod error;
pub mod exec;
pub mod logging;
pub mod manifest;
pub mod resources;
pub mod vendor;
