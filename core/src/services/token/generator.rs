//! Secure refresh-token generation

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::{rngs::OsRng, RngCore};

use crate::errors::{DomainError, DomainResult};

/// Default refresh token entropy in bytes (43 characters once encoded)
pub const DEFAULT_TOKEN_BYTES: usize = 32;

/// Source of opaque bearer tokens
pub trait TokenGenerator: Send + Sync {
    /// Produce a new URL-safe token
    fn generate(&self) -> DomainResult<String>;
}

/// Token generator backed by the operating system CSPRNG
///
/// Draws `byte_length` bytes from `OsRng` and encodes them as unpadded
/// URL-safe base64, so tokens can travel in headers and query strings as is.
/// There is no fallback: if the OS cannot supply entropy the
/// caller gets `DomainError::TokenGeneration`.
#[derive(Debug, Clone, Copy)]
pub struct SecureTokenGenerator {
    byte_length: usize,
}

impl SecureTokenGenerator {
    /// Create a generator producing `byte_length` random bytes per token
    ///
    /// # Returns
    /// * `Err(DomainError::Validation)` - `byte_length` is zero
    pub fn new(byte_length: usize) -> DomainResult<Self> {
        if byte_length == 0 {
            return Err(DomainError::Validation {
                message: "Token byte length must be positive".to_string(),
            });
        }
        Ok(Self { byte_length })
    }

    /// Number of random bytes behind each token
    pub fn byte_length(&self) -> usize {
        self.byte_length
    }

    /// Length of the encoded token in characters
    pub fn encoded_length(&self) -> usize {
        (self.byte_length * 4).div_ceil(3)
    }
}

impl Default for SecureTokenGenerator {
    fn default() -> Self {
        Self {
            byte_length: DEFAULT_TOKEN_BYTES,
        }
    }
}

impl TokenGenerator for SecureTokenGenerator {
    fn generate(&self) -> DomainResult<String> {
        let mut bytes = vec![0u8; self.byte_length];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| {
                tracing::error!(error = %e, "OS random source failed");
                DomainError::TokenGeneration {
                    message: e.to_string(),
                }
            })?;
        Ok(URL_SAFE_NO_PAD.encode(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_token_shape() {
        let generator = SecureTokenGenerator::default();
        let token = generator.generate().unwrap();

        assert_eq!(generator.byte_length(), 32);
        assert_eq!(token.len(), 43);
        assert_eq!(token.len(), generator.encoded_length());
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert!(!token.contains('='));
    }

    #[test]
    fn test_custom_length_decodes_back_to_bytes() {
        let generator = SecureTokenGenerator::new(16).unwrap();
        let token = generator.generate().unwrap();

        let decoded = URL_SAFE_NO_PAD.decode(&token).unwrap();
        assert_eq!(decoded.len(), 16);
        assert_eq!(token.len(), 22);
    }

    #[test]
    fn test_zero_length_rejected() {
        let err = SecureTokenGenerator::new(0).unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[test]
    fn test_tokens_do_not_repeat() {
        let generator = SecureTokenGenerator::default();
        let tokens: HashSet<String> = (0..1000).map(|_| generator.generate().unwrap()).collect();
        assert_eq!(tokens.len(), 1000);
    }
}
