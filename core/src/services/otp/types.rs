//! Types for OTP lifecycle operations

use crate::domain::entities::OtpRecord;

/// Input for creating an OTP record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOtp {
    /// Recipient address
    pub email: String,
    /// Passcode value
    pub otp: String,
    /// Lifetime in seconds; the service default applies when `None`
    pub ttl: Option<u64>,
}

impl CreateOtp {
    pub fn new(email: impl Into<String>, otp: impl Into<String>, ttl: u64) -> Self {
        Self {
            email: email.into(),
            otp: otp.into(),
            ttl: Some(ttl),
        }
    }
}

/// Outcome of resolving an input that may be either an id or an email
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The input matched a record id
    ById(OtpRecord),
    /// No id matched; the input matched a record email
    ByEmail(OtpRecord),
    /// Nothing matched
    NotFound,
}

impl Resolution {
    /// The resolved record, if any
    pub fn into_record(self) -> Option<OtpRecord> {
        match self {
            Resolution::ById(record) | Resolution::ByEmail(record) => Some(record),
            Resolution::NotFound => None,
        }
    }

    /// Short label for logs
    pub fn path(&self) -> &'static str {
        match self {
            Resolution::ById(_) => "id",
            Resolution::ByEmail(_) => "email",
            Resolution::NotFound => "none",
        }
    }
}
