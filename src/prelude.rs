//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::client::DataApiClient;
pub use crate::config::{ClientConfig, ClientConfigBuilder};
pub use crate::error::DataApiError;
pub use crate::escape::{format_sql, ident, literal};
pub use crate::params;
pub use crate::query::QueryRequest;
pub use crate::query_builder::QueryBuilder;
pub use crate::results::{CustomDbRow, QueryResult, Records};
pub use crate::transport::RdsDataApi;
pub use crate::types::{ParamValue, RowValues, TypeHint};
pub use crate::wire::{ColumnMetadata, Field, SqlParameter};
