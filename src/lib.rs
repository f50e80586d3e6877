//! Rust client library for the Yelp Fusion REST API.
//!
//! Public API layers:
//! - [`YelpClient`]/[`BlockingYelpClient`]: one method per API endpoint,
//!   returning the decoded JSON payload or an [`Error`].
//! - [`Params`]/[`ParamValue`]: open, ordered query-parameter mapping, so
//!   new vendor parameters pass through without a crate release.
//! - [`Error`]/[`ApiError`]: unified error type; API-reported failures keep
//!   their machine-readable code alongside the rendered message.
//!
//! ```no_run
//! use yelp_client::{Params, YelpClient};
//!
//! # async fn run() -> Result<(), yelp_client::Error> {
//! let client = YelpClient::new("API_KEY");
//! let params = Params::new()
//!     .with("term", "ice cream")
//!     .with("location", "austin, tx")
//!     .with("sort_by", "rating")
//!     .with("limit", 5);
//! let businesses = client.search(&params).await?;
//! # Ok(())
//! # }
//! ```

mod blocking_client;
mod client;
mod endpoints;
mod error;
mod params;

/// Blocking Yelp API client.
pub use blocking_client::BlockingYelpClient;
/// Async Yelp API client.
pub use client::{DEFAULT_BASE_URL, YelpClient};
/// Static endpoint registry.
pub use endpoints::{EndpointDefinition, endpoints};
/// Error types returned by all client operations.
pub use error::{ApiError, Error};
/// Query-parameter mapping and value model.
pub use params::{ParamValue, Params};
