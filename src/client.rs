use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::config::ClientConfig;
use crate::error::DataApiError;
use crate::query::{AssembledRequest, QueryRequest, assemble};
use crate::query_builder::QueryBuilder;
use crate::results::{QueryResult, hydrate_batch_response, hydrate_response};
use crate::transport::RdsDataApi;
use crate::wire::{
    BatchExecuteStatementRequest, BatchExecuteStatementResponse, BeginTransactionRequest,
    BeginTransactionResponse, CommitTransactionRequest, CommitTransactionResponse,
    ExecuteStatementRequest, ExecuteStatementResponse, RollbackTransactionRequest,
    RollbackTransactionResponse,
};

/// Client over a data API transport.
///
/// Cloning is cheap: clones share the configuration and the transport.
/// ```rust,no_run
/// use data_api_client::prelude::*;
///
/// # async fn demo<T: RdsDataApi>(transport: T) -> Result<(), DataApiError> {
/// let config = ClientConfig::builder()
///     .secret_arn("arn:aws:secretsmanager:us-east-1:123456789012:secret:db")
///     .resource_arn("arn:aws:rds:us-east-1:123456789012:cluster:app")
///     .database("app")
///     .build()?;
/// let client = DataApiClient::new(config, transport);
///
/// let result = client
///     .query(("SELECT id, name FROM users WHERE id = :id", params! { "id" => 7 }))
///     .await?;
/// for row in result.records.hydrated().unwrap_or_default() {
///     println!("{:?}", row.get("name"));
/// }
/// # Ok(())
/// # }
/// ```
pub struct DataApiClient<T: RdsDataApi> {
    config: Arc<ClientConfig>,
    transport: Arc<T>,
}

impl<T: RdsDataApi> Clone for DataApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: RdsDataApi> DataApiClient<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self::from_shared(Arc::new(config), Arc::new(transport))
    }

    pub fn from_shared(config: Arc<ClientConfig>, transport: Arc<T>) -> Self {
        Self { config, transport }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Start a fluent query.
    pub fn sql<'c>(&'c self, sql: &str) -> QueryBuilder<'c, T> {
        QueryBuilder::new(self, QueryRequest::new(sql))
    }

    /// Run a query: annotate parameters, send one request, shape the result.
    ///
    /// A list of parameter lists runs as a batch.
    ///
    /// # Errors
    /// Validation failures surface before anything is sent; transport
    /// failures come back as `DataApiError::Transport`, unchanged.
    pub async fn query(
        &self,
        request: impl Into<QueryRequest>,
    ) -> Result<QueryResult, DataApiError> {
        match assemble(&self.config, request.into())? {
            AssembledRequest::Single {
                request,
                hydrate,
                include_meta,
            } => {
                let response = self
                    .transport
                    .execute_statement(request)
                    .await
                    .map_err(DataApiError::Transport)?;
                hydrate_response(response, hydrate, include_meta)
            }
            AssembledRequest::Batch(request) => {
                let response = self
                    .transport
                    .batch_execute_statement(request)
                    .await
                    .map_err(DataApiError::Transport)?;
                Ok(hydrate_batch_response(response))
            }
        }
    }

    /// Run a query given in the options-object form.
    ///
    /// # Errors
    /// See [`QueryRequest::from_json`] and [`query`](Self::query).
    pub async fn query_json(&self, options: &JsonValue) -> Result<QueryResult, DataApiError> {
        self.query(QueryRequest::from_json(options)?).await
    }

    /// Forward an `executeStatement` request verbatim.
    ///
    /// # Errors
    /// Returns the transport failure unchanged.
    pub async fn execute_statement(
        &self,
        request: ExecuteStatementRequest,
    ) -> Result<ExecuteStatementResponse, DataApiError> {
        tracing::debug!("forwarding executeStatement");
        self.transport
            .execute_statement(request)
            .await
            .map_err(DataApiError::Transport)
    }

    /// Forward a `batchExecuteStatement` request verbatim.
    ///
    /// # Errors
    /// Returns the transport failure unchanged.
    pub async fn batch_execute_statement(
        &self,
        request: BatchExecuteStatementRequest,
    ) -> Result<BatchExecuteStatementResponse, DataApiError> {
        tracing::debug!("forwarding batchExecuteStatement");
        self.transport
            .batch_execute_statement(request)
            .await
            .map_err(DataApiError::Transport)
    }

    /// Forward a `beginTransaction` request verbatim.
    ///
    /// # Errors
    /// Returns the transport failure unchanged.
    pub async fn begin_transaction(
        &self,
        request: BeginTransactionRequest,
    ) -> Result<BeginTransactionResponse, DataApiError> {
        tracing::debug!("forwarding beginTransaction");
        self.transport
            .begin_transaction(request)
            .await
            .map_err(DataApiError::Transport)
    }

    /// Forward a `commitTransaction` request verbatim.
    ///
    /// # Errors
    /// Returns the transport failure unchanged.
    pub async fn commit_transaction(
        &self,
        request: CommitTransactionRequest,
    ) -> Result<CommitTransactionResponse, DataApiError> {
        tracing::debug!("forwarding commitTransaction");
        self.transport
            .commit_transaction(request)
            .await
            .map_err(DataApiError::Transport)
    }

    /// Forward a `rollbackTransaction` request verbatim.
    ///
    /// # Errors
    /// Returns the transport failure unchanged.
    pub async fn rollback_transaction(
        &self,
        request: RollbackTransactionRequest,
    ) -> Result<RollbackTransactionResponse, DataApiError> {
        tracing::debug!("forwarding rollbackTransaction");
        self.transport
            .rollback_transaction(request)
            .await
            .map_err(DataApiError::Transport)
    }
}
