//! # git-pear
//!
//! Pair programming identities for git commits.
//!
//! This crate provides functionality to:
//! - Merge several developers' names into one `user.name`
//! - Derive a combined plus-addressed `user.email`
//! - Remember each developer's full name and email in `~/.pearrc`
//! - Install a `prepare-commit-msg` hook that appends `Co-authored-by` trailers
//!
//! ## Usage
//!
//! ```bash
//! # Pair with a colleague
//! pear deva devb
//!
//! # Show the current pair
//! pear
//!
//! # Go back to solo
//! pear --unset
//! ```
//!
//! ## Modules
//!
//! - [`cli`] - Command-line interface and main entry point
//! - [`config`] - Developer registry file
//! - [`pair`] - Key normalization, reconciliation and email formatting
//! - [`git`] - Git command wrappers
//! - [`hook`] - `prepare-commit-msg` hook management
//! - [`augment`] - Co-author trailers in commit messages
//! - [`prompt`] - User input abstractions
//! - [`error`] - Error type

pub mod augment;
pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod hook;
pub mod pair;
pub mod prompt;

pub use error::{Error, Result};
