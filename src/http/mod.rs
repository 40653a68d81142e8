//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, envelope conversion)
//!     → request.rs (RequestEnvelope)
//!     → [dispatch subsystem fans out to adapters]
//!         → client.rs (outbound calls to backends)
//!     → response.rs (ResponseTriple → wire response)
//!     → Send to client
//! ```

pub mod client;
pub mod request;
pub mod response;
pub mod server;

pub use client::{HttpClient, HttpError, RequestOptions};
pub use request::RequestEnvelope;
pub use response::{ResponseTriple, NO_ADAPTERS_BODY};
pub use server::ComposerServer;
