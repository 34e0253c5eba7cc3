// crates/rollout-gate-aws/src/clients.rs
// ============================================================================
// Module: AWS Clients
// Description: Shared SDK configuration, service clients, and blocking runtime.
// Purpose: Drive async SDK calls from the synchronous collaborator ports.
// Dependencies: aws-config, aws-sdk-{config,codedeploy,lambda}, tokio
// ============================================================================

//! ## Overview
//! The collaborator ports are synchronous, one call per invocation. Each call
//! blocks on the SDK future through [`block_on_with_runtime`], which reuses an
//! ambient multi-thread runtime when one exists and otherwise falls back to
//! the runtime owned by [`AwsClients`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_sdk_config::error::DisplayErrorContext;
use aws_sdk_config::error::SdkError;
use rollout_gate_config::AwsConfig;
use rollout_gate_core::ReportError;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::runtime::Runtime;
use tokio::runtime::RuntimeFlavor;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while building or driving AWS clients.
#[derive(Debug, Error)]
pub enum AwsError {
    /// AWS settings failed validation.
    #[error("aws config invalid: {0}")]
    Invalid(String),
    /// The blocking runtime could not be created or driven.
    #[error("aws runtime error: {0}")]
    Runtime(String),
}

// ============================================================================
// SECTION: Runtime Helpers
// ============================================================================

/// Blocks on an SDK future using a compatible runtime.
pub(crate) fn block_on_with_runtime<F, T>(runtime: &Runtime, future: F) -> Result<T, AwsError>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    if let Ok(handle) = Handle::try_current() {
        if matches!(handle.runtime_flavor(), RuntimeFlavor::MultiThread) {
            return Ok(tokio::task::block_in_place(|| handle.block_on(future)));
        }
        let (tx, rx) = std::sync::mpsc::sync_channel(1);
        std::thread::spawn(move || {
            let result = Runtime::new()
                .map_err(|err| AwsError::Runtime(err.to_string()))
                .map(|runtime| runtime.block_on(future));
            let _ = tx.send(result);
        });
        return rx
            .recv()
            .unwrap_or_else(|_| Err(AwsError::Runtime("aws worker thread join failed".to_string())));
    }

    Ok(runtime.block_on(future))
}

/// Classifies an SDK failure: service rejections versus transport failures.
pub(crate) fn classify_report_error<E, R>(err: &SdkError<E, R>) -> ReportError
where
    E: StdError + 'static,
    R: fmt::Debug,
{
    let detail = DisplayErrorContext(err).to_string();
    if matches!(err, SdkError::ServiceError(_)) {
        ReportError::Rejected(detail)
    } else {
        ReportError::Transport(detail)
    }
}

// ============================================================================
// SECTION: Clients
// ============================================================================

/// AWS service clients sharing one SDK configuration and runtime.
pub struct AwsClients {
    /// AWS Config client.
    pub(crate) config: aws_sdk_config::Client,
    /// CodeDeploy client.
    pub(crate) codedeploy: aws_sdk_codedeploy::Client,
    /// Lambda client.
    pub(crate) lambda: aws_sdk_lambda::Client,
    /// Tokio runtime for blocking SDK operations.
    runtime: Option<Arc<Runtime>>,
}

impl Drop for AwsClients {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            let _ = std::thread::spawn(move || drop(runtime));
        }
    }
}

impl AwsClients {
    /// Loads the shared SDK configuration and builds every client.
    ///
    /// # Errors
    ///
    /// Returns [`AwsError`] when settings are invalid or the runtime fails.
    pub fn new(settings: &AwsConfig) -> Result<Self, AwsError> {
        settings.validate().map_err(|err| AwsError::Invalid(err.to_string()))?;
        let runtime = Runtime::new().map_err(|err| AwsError::Runtime(err.to_string()))?;
        let region = settings.region.clone();
        let endpoint = settings.endpoint.clone();
        let shared_config = block_on_with_runtime(&runtime, async {
            let mut loader = aws_config::defaults(BehaviorVersion::latest());
            if let Some(region) = region {
                loader = loader.region(Region::new(region));
            }
            if let Some(endpoint) = endpoint {
                loader = loader.endpoint_url(endpoint);
            }
            loader.load().await
        })?;
        Ok(Self {
            config: aws_sdk_config::Client::new(&shared_config),
            codedeploy: aws_sdk_codedeploy::Client::new(&shared_config),
            lambda: aws_sdk_lambda::Client::new(&shared_config),
            runtime: Some(Arc::new(runtime)),
        })
    }

    /// Returns the runtime or an error if shut down.
    pub(crate) fn runtime(&self) -> Result<&Runtime, AwsError> {
        self.runtime
            .as_ref()
            .map(AsRef::as_ref)
            .ok_or_else(|| AwsError::Runtime("aws runtime closed".to_string()))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use std::io;

    use super::*;

    #[test]
    fn service_errors_are_rejections() {
        let err = SdkError::<io::Error, ()>::service_error(io::Error::other("token expired"), ());
        assert!(matches!(classify_report_error(&err), ReportError::Rejected(_)));
    }

    #[test]
    fn construction_failures_are_transport_errors() {
        let err = SdkError::<io::Error, ()>::construction_failure("no region");
        assert!(matches!(classify_report_error(&err), ReportError::Transport(_)));
    }

    #[test]
    fn blocks_without_ambient_runtime() {
        let runtime = Runtime::new().unwrap();
        assert_eq!(block_on_with_runtime(&runtime, async { 7 }).unwrap(), 7);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn blocks_inside_current_thread_runtime() {
        let runtime = Arc::new(Runtime::new().unwrap());
        let value = block_on_with_runtime(&runtime, async { "ok" }).unwrap();
        assert_eq!(value, "ok");
        std::thread::spawn(move || drop(runtime)).join().unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn blocks_inside_multi_thread_runtime() {
        let runtime = Arc::new(Runtime::new().unwrap());
        let value = block_on_with_runtime(&runtime, async { 11 }).unwrap();
        assert_eq!(value, 11);
        std::thread::spawn(move || drop(runtime)).join().unwrap();
    }
}
