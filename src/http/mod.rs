//! HTTP client module for the metering API
//!
//! Provides the retrying, tenant-scoped client used by every test case.

mod client;

pub use reqwest::Method;

pub use client::{
    ApiClient, ApiResponse, RequestOptions, TransportError, BODY_PREVIEW_CHARS,
    EVENTS_TENANT_HEADER,
};
