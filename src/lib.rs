//! Client-side adapter for SQL data APIs.
//!
//! The crate turns plain parameter values into the API's typed parameter
//! encoding, assembles `executeStatement` / `batchExecuteStatement`
//! requests, and hydrates the type-tagged, column-oriented records that come
//! back into plain values or label-keyed rows. The network call itself sits
//! behind the [`RdsDataApi`] trait.
//!
//! ```rust,no_run
//! use data_api_client::prelude::*;
//!
//! # async fn demo<T: RdsDataApi>(transport: T) -> Result<(), DataApiError> {
//! let client = DataApiClient::new(
//!     ClientConfig::builder()
//!         .secret_arn("arn:aws:secretsmanager:us-east-1:123456789012:secret:db")
//!         .resource_arn("arn:aws:rds:us-east-1:123456789012:cluster:app")
//!         .database("app")
//!         .build()?,
//!     transport,
//! );
//!
//! let users = client
//!     .sql("SELECT id, name FROM users WHERE active = :active")
//!     .params(params! { "active" => true })
//!     .execute()
//!     .await?;
//! # let _ = users;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod escape;
pub mod params;
pub mod prelude;
pub mod query;
pub mod query_builder;
pub mod results;
pub mod transport;
pub mod types;
pub mod wire;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use client::DataApiClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{DataApiError, Result, TransportError};
pub use escape::{format_sql, ident, literal};
pub use query::QueryRequest;
pub use results::{CustomDbRow, QueryResult, Records};
pub use transport::RdsDataApi;
pub use types::{ParamValue, RowValues, TypeHint};
