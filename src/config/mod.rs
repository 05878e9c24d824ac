//! Application configuration module
//!
//! Handles environment variables and application-wide constants.

mod constants;
mod settings;

pub use constants::*;
pub use settings::{CloudinaryConfig, ClerkConfig, Config, SmtpConfig};
