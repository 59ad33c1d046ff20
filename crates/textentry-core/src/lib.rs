// SPDX-License-Identifier: MIT
//
// Core types and error definitions shared by the text entry bridge crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::TextEntryConfig;
pub use error::{Result, TextEntryError};
pub use types::{Capitalisation, ImeAction, Key, KeyboardType};
