//! Dataset API client
//!
//! HTTP client for submitting temporary image URLs to the Roboflow dataset
//! upload endpoint.

pub mod client;
pub mod endpoints;
pub mod uploader;

pub use client::{DatasetUploadService, HttpResponse, ReqwestUploadService};
pub use uploader::{interpret_response, DatasetUploader};
