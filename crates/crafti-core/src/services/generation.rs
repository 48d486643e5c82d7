//! Component generation service

use crate::demo;
use crate::error::{Error, GenerationError, Result};
use crate::types::{Generation, Message};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// Backend that turns a transcript into a component
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, transcript: &[Message]) -> Result<Generation>;
}

/// Stand-in backend: waits a fixed delay and returns the demo artifact
pub struct CannedGenerationService {
    delay: Duration,
}

impl CannedGenerationService {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl GenerationService for CannedGenerationService {
    async fn generate(&self, transcript: &[Message]) -> Result<Generation> {
        debug!(
            "Simulating generation over {} messages ({:?})",
            transcript.len(),
            self.delay
        );
        tokio::time::sleep(self.delay).await;
        Ok(Generation {
            reply: demo::DEMO_REPLY.to_string(),
            artifact: demo::demo_artifact(),
        })
    }
}

/// Timeout and retry bounds around a generation call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub timeout: Duration,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: 2,
        }
    }
}

/// Run `service.generate` with a per-attempt timeout, retrying until
/// `max_attempts` is exhausted. The last error is returned.
pub async fn generate_with_retry(
    service: &dyn GenerationService,
    transcript: &[Message],
    policy: RetryPolicy,
) -> Result<Generation> {
    let attempts = policy.max_attempts.max(1);
    let mut last_error = Error::Generation(GenerationError::Failed("no attempt made".to_string()));

    for attempt in 1..=attempts {
        match tokio::time::timeout(policy.timeout, service.generate(transcript)).await {
            Ok(Ok(generation)) => return Ok(generation),
            Ok(Err(e)) => {
                warn!("Generation attempt {}/{} failed: {}", attempt, attempts, e);
                last_error = e;
            }
            Err(_) => {
                let ms = policy.timeout.as_millis() as u64;
                warn!("Generation attempt {}/{} timed out after {} ms", attempt, attempts, ms);
                last_error = Error::Generation(GenerationError::Timeout(ms));
            }
        }
    }

    Err(last_error)
}
