use serde_json::Value as JsonValue;

use crate::client::DataApiClient;
use crate::error::DataApiError;
use crate::query::QueryRequest;
use crate::results::QueryResult;
use crate::transport::RdsDataApi;
use crate::types::ParamValue;

/// Fluent builder for one query against a client.
pub struct QueryBuilder<'c, T: RdsDataApi> {
    client: &'c DataApiClient<T>,
    request: QueryRequest,
}

impl<'c, T: RdsDataApi> QueryBuilder<'c, T> {
    pub(crate) fn new(client: &'c DataApiClient<T>, request: QueryRequest) -> Self {
        Self { client, request }
    }

    /// Provide parameters: a record, a list of records, or a list of lists
    /// for a batch.
    #[must_use]
    pub fn params(mut self, params: impl Into<ParamValue>) -> Self {
        self.request.parameters = Some(params.into());
        self
    }

    /// Override the configured database.
    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.request.database = Some(database.into());
        self
    }

    /// Override the configured hydration mode.
    #[must_use]
    pub fn hydrate_column_names(mut self, hydrate: bool) -> Self {
        self.request.hydrate_column_names = Some(hydrate);
        self
    }

    #[must_use]
    pub fn include_result_metadata(mut self, include: bool) -> Self {
        self.request.include_result_metadata = Some(include);
        self
    }

    #[must_use]
    pub fn transaction_id(mut self, transaction_id: impl Into<String>) -> Self {
        self.request.transaction_id = Some(transaction_id.into());
        self
    }

    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.request.schema = Some(schema.into());
        self
    }

    #[must_use]
    pub fn continue_after_timeout(mut self, continue_after_timeout: bool) -> Self {
        self.request.continue_after_timeout = Some(continue_after_timeout);
        self
    }

    /// Add a top-level request field that has no dedicated setter.
    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.request.extra.insert(key.into(), value);
        self
    }

    /// The request built so far.
    #[must_use]
    pub fn request(&self) -> &QueryRequest {
        &self.request
    }

    /// Send the query and shape the result.
    ///
    /// # Errors
    /// See [`DataApiClient::query`].
    pub async fn execute(self) -> Result<QueryResult, DataApiError> {
        self.client.query(self.request).await
    }
}
