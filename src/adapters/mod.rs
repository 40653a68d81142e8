//! Built-in adapters.
//!
//! # Data Flow
//! ```text
//! RequestEnvelope
//!     → upstream.rs (rewrite onto backend base URL)
//!     → http::client (outbound call)
//!     → ResponseTriple
//! ```

pub mod upstream;

pub use upstream::UpstreamAdapter;
