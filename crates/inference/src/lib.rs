//! Remote inference client for Maitre.
//!
//! The generation backend executes requests as asynchronously-completed
//! jobs: a submission either returns the result directly or returns a job
//! id which is then polled to completion. [`JobPollClient`] implements the
//! polling protocol — adaptive schedule, hard wall-clock budget, typed
//! terminal errors — on top of a pluggable [`JobTransport`].

pub mod client;
pub mod http;
pub mod wire;

pub use client::JobPollClient;
pub use http::HttpJobTransport;
pub use wire::{JobState, JobStatusReply, JobTransport, SubmitReply};
