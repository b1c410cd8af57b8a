//! Input Bridge - terminal keystrokes to a shared database mailbox
//!
//! This library captures keypresses from an interactive terminal, normalizes
//! them into a small command vocabulary, and publishes the most recent
//! command into a single-row table that a game engine polls.

pub mod capture;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod keys;
pub mod publisher;
