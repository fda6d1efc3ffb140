//! Token service module
//!
//! Refresh tokens are bearer credentials, so they are minted from the OS
//! CSPRNG only and encoded with the unpadded URL-safe base64 alphabet.

mod generator;

pub use generator::{SecureTokenGenerator, TokenGenerator, DEFAULT_TOKEN_BYTES};
