//! kquery: fetch benchmark rows from Elasticsearch through its SQL endpoint
//!
//! ```no_run
//! # async fn run() -> kquery::Result<()> {
//! use kquery::{FetchRequest, QueryClient};
//!
//! let client = QueryClient::new("http://localhost:9200", 30_000, "df-dlfw-trtis-benchmarks-*")?;
//! let rows = client
//!     .fetch_results(
//!         &FetchRequest::new(["s_model", "d_infer_per_sec"])
//!             .filter("s_model", "resnet50")
//!             .filter("batch", 8)
//!             .start_date("2020-01-01"),
//!     )
//!     .await?;
//! client.close();
//! # let _ = rows;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod sql;

pub use client::{FetchRequest, QueryClient};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use sql::{FilterValue, Filters, Rows};
