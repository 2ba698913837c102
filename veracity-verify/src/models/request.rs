//! Verification request payload

use std::sync::Arc;
use veracity_common::{Error, Result};

/// One image submitted for verification
///
/// Immutable once constructed. The image bytes are reference-counted so the
/// leaf checks can run on separate tasks without copying the payload.
#[derive(Debug, Clone)]
pub struct VerificationRequest {
    image: Arc<[u8]>,
    image_name: String,
    user_id: String,
}

impl VerificationRequest {
    /// Build a request, rejecting an empty payload or a blank user id
    pub fn new(
        image: impl Into<Arc<[u8]>>,
        image_name: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Result<Self> {
        let image = image.into();
        let user_id = user_id.into();

        if image.is_empty() {
            return Err(Error::InvalidInput("Image payload is empty".to_string()));
        }
        if user_id.trim().is_empty() {
            return Err(Error::InvalidInput("userId is required".to_string()));
        }

        Ok(Self {
            image,
            image_name: image_name.into(),
            user_id: user_id.trim().to_string(),
        })
    }

    pub fn image(&self) -> &Arc<[u8]> {
        &self.image
    }

    /// Original file name as sent by the client (advisory only)
    pub fn image_name(&self) -> &str {
        &self.image_name
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}
