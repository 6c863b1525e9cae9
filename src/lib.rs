#![allow(clippy::doc_markdown)] // Allow technical terms like PDF4me, reqwest in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # PDF4me Client
//!
//! Asynchronous job-submission-and-polling client for the PDF4me document
//! API.
//!
//! ## Overview
//!
//! Every PDF4me operation (convert, merge, watermark, OCR, barcode, ...) has
//! the same shape: POST a JSON body carrying base64 document content, then
//! either receive the result immediately (`200`) or receive `202 Accepted`
//! with a `Location` header and poll that URL until the result is ready.
//!
//! This crate implements that protocol once, in [`AsyncJobClient`], and
//! describes individual operations as data in [`operations`].
//!
//! ## Module Organization
//!
//! - [`client`] - Submission, classification and the poll loop
//! - [`state_machine`] - Per-job lifecycle (`submitted` → `polling` → `done_*`)
//! - [`policy`] - Poll budget and delay schedule
//! - [`transport`] - HTTP seam with the reqwest implementation
//! - [`operations`] / [`payload`] - Operation catalog and request builder
//! - [`config`] / [`credentials`] - Layered configuration and API key handling
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured `tracing` setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf4me_client::{AsyncJobClient, ClientConfig, Operation, PayloadBuilder};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = AsyncJobClient::new(&ClientConfig::load()?)?;
//!
//! let request = PayloadBuilder::for_operation(Operation::GetPdfMetadata)
//!     .document(std::fs::read("invoice.pdf")?)
//!     .build();
//!
//! let metadata = client.execute(&request, &CancellationToken::new()).await?.json()?;
//! println!("{metadata:#}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! Client behaviour is tested against scripted transports on a paused tokio
//! clock, so the default ten-second poll delay costs nothing. The reqwest
//! transport is tested against `wiremock`.

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod job;
pub mod logging;
pub mod operations;
pub mod payload;
pub mod policy;
pub mod poll;
pub mod state_machine;
pub mod transport;

pub use client::AsyncJobClient;
pub use config::{BackoffStrategy, ClientConfig, PollingConfig};
pub use credentials::Credentials;
pub use error::{ClientError, ClientResult};
pub use job::{JobOutput, JobRequest, JobResponse, ResultKind};
pub use operations::Operation;
pub use payload::PayloadBuilder;
pub use policy::{ExponentialBackoff, FixedDelay, PollPolicy};
pub use poll::PollState;
pub use state_machine::{JobEvent, JobState, JobStateMachine};
pub use transport::{HttpTransport, RawResponse, ReqwestTransport};
