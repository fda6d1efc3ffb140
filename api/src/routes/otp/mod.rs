//! OTP route handlers
//!
//! - `POST   /otp`             create
//! - `GET    /otp/{idOrEmail}` read
//! - `DELETE /otp/{idOrEmail}` delete
//! - `POST   /otp/refresh`     rotate the refresh token

pub mod create;
pub mod delete;
pub mod read;
pub mod refresh;

use std::sync::Arc;

use otp_core::repositories::OtpRepository;
use otp_core::services::otp::OtpService;

/// Application state that holds shared services
pub struct AppState<R>
where
    R: OtpRepository,
{
    pub otp_service: Arc<OtpService<R>>,
}

impl<R: OtpRepository> AppState<R> {
    pub fn new(otp_service: Arc<OtpService<R>>) -> Self {
        Self { otp_service }
    }
}
