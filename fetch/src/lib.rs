//! Random-sample listing and concurrent, failure-tolerant detail fetching.
//!
//! # Pipeline
//!
//! 1. **Listing** - [`ListingClient::random_sample`] reads the collection size and
//!    pulls one page of reference handles at a random offset
//! 2. **Placeholders** - [`placeholders`] builds the loading batch shown while
//!    details are in flight
//! 3. **Details** - [`fetch_details`] retrieves every record concurrently, each
//!    under its own timeout, and settles the whole batch
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`detail`] | Bounded-concurrency detail fetcher |
//! | [`listing`] | Upstream listing client |
//! | [`options`] | Fetch options and their defaults |
//! | [`sink`] | Diagnostic sinks (tracing, in-memory) |
//! | [`error`] | Per-item and listing error types |
//! | `http` | Internal: shared client construction and JSON GET |
//!
//! # Error Handling
//!
//! Per-item failures never reach the caller: they degrade the item to
//! `image: None` and are recorded as a [`DiagnosticEvent`] in the sink the
//! caller passes in. Listing failures are a separate domain and are returned
//! as [`ListingError`].
//!
//! [`DiagnosticEvent`]: randex_types::DiagnosticEvent

pub mod detail;
pub mod error;
mod http;
pub mod listing;
pub mod options;
pub mod sink;

pub use detail::{fetch_details, placeholders};
pub use error::{FetchError, ListingError, OptionsError};
pub use http::{ClientOptions, build_client};
pub use listing::ListingClient;
pub use options::FetchOptions;
pub use sink::{MemorySink, TracingSink};
