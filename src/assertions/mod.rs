//! Response assertions and the test case error taxonomy
//!
//! Test cases return `CaseResult<T>`; the runner classifies the error
//! variant instead of catching panics.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Debug;
use thiserror::Error;

use crate::http::{ApiResponse, TransportError, BODY_PREVIEW_CHARS};
use crate::models::{Envelope, ErrorBody, TestStatus};
use crate::utils::truncate;

/// Expected-versus-actual mismatch
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct AssertionFailure(pub String);

/// Why a test case did not pass
#[derive(Error, Debug)]
pub enum CaseError {
    #[error(transparent)]
    Assertion(#[from] AssertionFailure),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("{0}")]
    Unexpected(String),
}

impl CaseError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        CaseError::Unexpected(message.into())
    }

    /// Assertion mismatches fail the case; anything else is an error
    pub fn status(&self) -> TestStatus {
        match self {
            CaseError::Assertion(_) => TestStatus::Failed,
            CaseError::Transport(_) | CaseError::Unexpected(_) => TestStatus::Error,
        }
    }
}

impl From<serde_json::Error> for CaseError {
    fn from(e: serde_json::Error) -> Self {
        CaseError::Unexpected(format!("Invalid response body: {e}"))
    }
}

pub type CaseResult<T> = Result<T, CaseError>;

/// Require `expected_status`; the failure text carries the API's message when available
pub fn assert_success(response: &ApiResponse, expected_status: u16) -> CaseResult<()> {
    if response.status == expected_status {
        return Ok(());
    }

    let mut message = format!(
        "Expected status {expected_status}, got {}",
        response.status
    );
    if !response.body.is_empty() {
        let detail = match serde_json::from_str::<ErrorBody>(&response.body) {
            Ok(ErrorBody {
                message: Some(text),
            }) => text,
            _ => truncate(&response.body, BODY_PREVIEW_CHARS),
        };
        message.push_str(&format!(" - {detail}"));
    }

    Err(AssertionFailure(message).into())
}

/// Require an error status; the body is not interpreted
pub fn assert_error(response: &ApiResponse, expected_status: u16) -> CaseResult<()> {
    if response.status != expected_status {
        return Err(AssertionFailure(format!(
            "Expected error status {expected_status}, got {}",
            response.status
        ))
        .into());
    }
    Ok(())
}

/// Pull `data.id` out of the standard envelope
pub fn extract_id(response: &ApiResponse) -> CaseResult<String> {
    let value: Value = response.json()?;
    value
        .get("data")
        .and_then(|data| data.get("id"))
        .and_then(|id| match id {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .ok_or_else(|| CaseError::unexpected("Could not extract ID from response"))
}

/// Decode the envelope's `data` into `T`
pub fn decode_data<T: DeserializeOwned>(response: &ApiResponse) -> CaseResult<T> {
    let envelope: Envelope<T> = response.json()?;
    Ok(envelope.data)
}

/// Equality check producing an assertion failure
pub fn expect_eq<T: PartialEq + Debug>(what: &str, actual: T, expected: T) -> CaseResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(AssertionFailure(format!("{what}: expected {expected:?}, got {actual:?}")).into())
    }
}

/// Boolean check producing an assertion failure
pub fn ensure(condition: bool, message: impl Into<String>) -> CaseResult<()> {
    if condition {
        Ok(())
    } else {
        Err(AssertionFailure(message.into()).into())
    }
}
