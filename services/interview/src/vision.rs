//! HTTP implementation of the frame analyzer against the vision service.
//!
//! The service receives one frame as multipart form data and answers with
//! the classification record the aggregator consumes. Failures here are
//! retryable by the frame's submitter; they never touch session state.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use mockdrill_core::analyzer::{FrameAnalyzer, FrameClassification};

/// Per-request bound on the vision call, matching the reference
/// deployment's client timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct VisionAnalyzer {
    client: Client,
    base_url: String,
}

impl VisionAnalyzer {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/ml/check_face", self.base_url)
    }
}

#[async_trait]
impl FrameAnalyzer for VisionAnalyzer {
    async fn classify(&self, image: &[u8]) -> Result<FrameClassification> {
        let part = Part::bytes(image.to_vec())
            .file_name("frame.jpg")
            .mime_str("image/jpeg")
            .context("Failed to build multipart image part")?;
        let form = Form::new().part("image", part);

        let classification = self
            .client
            .post(self.endpoint())
            .timeout(REQUEST_TIMEOUT)
            .multipart(form)
            .send()
            .await
            .context("Vision service unreachable")?
            .error_for_status()
            .context("Vision service rejected the frame")?
            .json::<FrameClassification>()
            .await
            .context("Vision service returned a malformed classification")?;

        Ok(classification)
    }
}
