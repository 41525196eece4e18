//! The frame analyzer seam: one proctoring image in, one classification
//! record out. The core never looks at pixels; it consumes whatever the
//! external vision service concluded about the frame.

use anyhow::Result;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::proctor::Severity;

/// What the vision service concluded about a single frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameClassification {
    pub num_faces: u32,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub mobile_detected: bool,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub cheating_score: f32,
    #[serde(default)]
    pub message: String,
}

impl FrameClassification {
    /// A clean single-face frame with no findings. Convenient base for
    /// tests and for detectors that only report anomalies.
    pub fn normal() -> Self {
        Self {
            num_faces: 1,
            severity: Severity::Low,
            mobile_detected: false,
            issues: Vec::new(),
            cheating_score: 0.0,
            message: String::new(),
        }
    }
}

/// Contract for the external computer-vision collaborator. Treated as a
/// pure function per call; a failure surfaces to the frame's submitter as
/// a retryable error and never terminates the session.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait FrameAnalyzer: Send + Sync {
    async fn classify(&self, image: &[u8]) -> Result<FrameClassification>;
}
