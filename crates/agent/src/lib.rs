//! The response orchestrator — the heart of Maitre.
//!
//! Every guest message flows through the same pipeline:
//!
//! 1. **Classify** the query (intent bucket + language + decoding profile)
//! 2. **Look up** the two-tier response cache (greetings skip this)
//! 3. On a miss, **assemble** a bounded slice of the tenant's catalog
//! 4. **Generate** a reply via the job-based remote backend
//! 5. **Store** cacheable replies and return the text
//!
//! The orchestrator never fails: any internal error degrades to a fixed
//! apologetic message, and every degradation is published on the event bus.

pub mod classifier;
pub mod context;
pub mod responder;

pub use classifier::QueryClassifier;
pub use context::{ContextAssembler, NO_CATALOG_DATA};
pub use responder::Responder;
