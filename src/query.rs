//! Query inputs and their assembly into outbound requests.

use serde_json::{Map, Value as JsonValue};

use crate::config::ClientConfig;
use crate::error::DataApiError;
use crate::params::{ParameterSet, annotate_params, normalize_params};
use crate::types::ParamValue;
use crate::wire::{BatchExecuteStatementRequest, ExecuteStatementRequest};

/// Keys the assembler sets itself; copies of them in `extra` are dropped.
const MANAGED_KEYS: &[&str] = &[
    "sql",
    "database",
    "parameters",
    "parameterSets",
    "hydrateColumnNames",
];

/// Everything a single `query` call can carry.
///
/// Only `sql` is required. Unset options fall back to the client
/// configuration:
/// ```rust
/// use data_api_client::prelude::*;
///
/// let req = QueryRequest::new("SELECT * FROM users WHERE id = :id")
///     .with_params(params! { "id" => 7 })
///     .with_database("app");
/// # let _ = req;
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryRequest {
    /// The SQL text
    pub sql: String,
    /// A record, a list of records, or a list of lists for batches
    pub parameters: Option<ParamValue>,
    /// Overrides the configured default database
    pub database: Option<String>,
    /// Overrides the configured hydration mode
    pub hydrate_column_names: Option<bool>,
    /// Return column metadata with the result
    pub include_result_metadata: Option<bool>,
    pub transaction_id: Option<String>,
    pub schema: Option<String>,
    pub continue_after_timeout: Option<bool>,
    /// Further top-level request fields, passed through as-is
    pub extra: Map<String, JsonValue>,
}

impl QueryRequest {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: impl Into<ParamValue>) -> Self {
        self.parameters = Some(params.into());
        self
    }

    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    #[must_use]
    pub fn with_hydrate_column_names(mut self, hydrate: bool) -> Self {
        self.hydrate_column_names = Some(hydrate);
        self
    }

    /// Read the options-object call form:
    /// `{"sql": .., "parameters": .., "database": .., "hydrateColumnNames": .., ..}`.
    ///
    /// A bare JSON string is taken as the SQL text. Unknown keys are kept in
    /// `extra`.
    ///
    /// # Errors
    /// Returns `DataApiError::QueryError` when no SQL string is present or a
    /// known option has the wrong type.
    pub fn from_json(value: &JsonValue) -> Result<Self, DataApiError> {
        let obj = match value {
            JsonValue::String(sql) => return Ok(QueryRequest::new(sql.as_str())),
            JsonValue::Object(obj) => obj,
            _ => return Err(missing_sql()),
        };

        let mut rest = obj.clone();
        let sql = match rest.remove("sql") {
            Some(JsonValue::String(sql)) => sql,
            _ => return Err(missing_sql()),
        };

        let parameters = match rest.remove("parameters") {
            None | Some(JsonValue::Null) => None,
            Some(params) => Some(ParamValue::from(params)),
        };
        let database = take_string(&mut rest, "database")?;
        let hydrate_column_names = take_bool(&mut rest, "hydrateColumnNames")?;
        let include_result_metadata = take_bool(&mut rest, "includeResultMetadata")?;
        let transaction_id = take_string(&mut rest, "transactionId")?;
        let schema = take_string(&mut rest, "schema")?;
        let continue_after_timeout = take_bool(&mut rest, "continueAfterTimeout")?;

        Ok(QueryRequest {
            sql,
            parameters,
            database,
            hydrate_column_names,
            include_result_metadata,
            transaction_id,
            schema,
            continue_after_timeout,
            extra: rest,
        })
    }
}

impl From<&str> for QueryRequest {
    fn from(sql: &str) -> Self {
        QueryRequest::new(sql)
    }
}

impl From<String> for QueryRequest {
    fn from(sql: String) -> Self {
        QueryRequest::new(sql)
    }
}

impl<P: Into<ParamValue>> From<(&str, P)> for QueryRequest {
    fn from((sql, params): (&str, P)) -> Self {
        QueryRequest::new(sql).with_params(params)
    }
}

fn missing_sql() -> DataApiError {
    DataApiError::QueryError("No 'sql' statement provided.".to_string())
}

fn take_string(
    obj: &mut Map<String, JsonValue>,
    key: &str,
) -> Result<Option<String>, DataApiError> {
    match obj.remove(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s)),
        Some(_) => Err(DataApiError::QueryError(format!(
            "'{key}' string value required"
        ))),
    }
}

fn take_bool(obj: &mut Map<String, JsonValue>, key: &str) -> Result<Option<bool>, DataApiError> {
    match obj.remove(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Bool(b)) => Ok(Some(b)),
        Some(_) => Err(DataApiError::QueryError(format!(
            "'{key}' must be a boolean."
        ))),
    }
}

/// An outbound request, ready for the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum AssembledRequest {
    Single {
        request: ExecuteStatementRequest,
        /// Key records by column label
        hydrate: bool,
        /// Hand column metadata back to the caller
        include_meta: bool,
    },
    Batch(BatchExecuteStatementRequest),
}

impl AssembledRequest {
    #[must_use]
    pub fn is_batch(&self) -> bool {
        matches!(self, AssembledRequest::Batch(_))
    }
}

/// Merge a query with the client configuration into one request.
///
/// Precedence: per-call `database` and `hydrateColumnNames` beat the
/// configured defaults; `secretArn`/`resourceArn` in `extra` beat the
/// configured ARNs. A hydrating, non-batch call always asks for result
/// metadata, since labels come from it.
///
/// # Errors
/// Returns `DataApiError::QueryError` when no database can be resolved and
/// `DataApiError::ParameterError` when the parameters cannot be annotated.
pub fn assemble(
    config: &ClientConfig,
    request: QueryRequest,
) -> Result<AssembledRequest, DataApiError> {
    let QueryRequest {
        sql,
        parameters,
        database,
        hydrate_column_names,
        mut include_result_metadata,
        mut transaction_id,
        mut schema,
        mut continue_after_timeout,
        mut extra,
    } = request;

    let database = database
        .or_else(|| config.database().map(str::to_string))
        .ok_or_else(|| DataApiError::QueryError("No 'database' provided.".to_string()))?;
    let hydrate = hydrate_column_names.unwrap_or_else(|| config.hydrate_column_names());

    let entries = normalize_params(parameters)?;
    let parameter_set = ParameterSet::from_annotated(annotate_params(&entries)?)?;

    for key in MANAGED_KEYS {
        extra.remove(*key);
    }
    let secret_arn = take_override(&mut extra, "secretArn")
        .unwrap_or_else(|| config.secret_arn().to_string());
    let resource_arn = take_override(&mut extra, "resourceArn")
        .unwrap_or_else(|| config.resource_arn().to_string());
    if include_result_metadata.is_none() {
        include_result_metadata = extra.get("includeResultMetadata").and_then(JsonValue::as_bool);
    }
    if transaction_id.is_none() {
        transaction_id = take_override(&mut extra, "transactionId");
    }
    if schema.is_none() {
        schema = take_override(&mut extra, "schema");
    }
    if continue_after_timeout.is_none() {
        continue_after_timeout = extra.get("continueAfterTimeout").and_then(JsonValue::as_bool);
    }
    extra.remove("includeResultMetadata");
    extra.remove("continueAfterTimeout");

    tracing::debug!(
        sql_len = sql.len(),
        database = %database,
        batch = parameter_set.is_batch(),
        parameter_count = parameter_set.len(),
        hydrate,
        "assembled data api request"
    );

    match parameter_set {
        ParameterSet::Batch(sets) => {
            if include_result_metadata.is_some() || continue_after_timeout.is_some() {
                tracing::debug!("result metadata and timeout options do not apply to batches");
            }
            Ok(AssembledRequest::Batch(BatchExecuteStatementRequest {
                secret_arn,
                resource_arn,
                database: Some(database),
                sql,
                parameter_sets: Some(sets),
                transaction_id,
                schema,
                extra,
            }))
        }
        ParameterSet::Single(params) => {
            let include_meta = include_result_metadata == Some(true);
            let include_result_metadata = if hydrate {
                Some(true)
            } else {
                include_result_metadata
            };
            Ok(AssembledRequest::Single {
                request: ExecuteStatementRequest {
                    secret_arn,
                    resource_arn,
                    database: Some(database),
                    sql,
                    parameters: (!params.is_empty()).then_some(params),
                    include_result_metadata,
                    transaction_id,
                    schema,
                    continue_after_timeout,
                    extra,
                },
                hydrate,
                include_meta,
            })
        }
    }
}

fn take_override(extra: &mut Map<String, JsonValue>, key: &str) -> Option<String> {
    if !matches!(extra.get(key), Some(JsonValue::String(_))) {
        return None;
    }
    match extra.remove(key) {
        Some(JsonValue::String(s)) => Some(s),
        _ => None,
    }
}
