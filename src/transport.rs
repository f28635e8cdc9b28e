use async_trait::async_trait;

use crate::error::TransportError;
use crate::wire::{
    BatchExecuteStatementRequest, BatchExecuteStatementResponse, BeginTransactionRequest,
    BeginTransactionResponse, CommitTransactionRequest, CommitTransactionResponse,
    ExecuteStatementRequest, ExecuteStatementResponse, RollbackTransactionRequest,
    RollbackTransactionResponse,
};

/// The remote execution surface a client talks to.
///
/// Implementations own networking, signing, retries and timeouts; the client
/// issues exactly one call per operation and hands any error back unchanged.
/// A single implementation is shared by concurrent calls, hence `Send + Sync`.
#[async_trait]
pub trait RdsDataApi: Send + Sync {
    async fn execute_statement(
        &self,
        request: ExecuteStatementRequest,
    ) -> Result<ExecuteStatementResponse, TransportError>;

    async fn batch_execute_statement(
        &self,
        request: BatchExecuteStatementRequest,
    ) -> Result<BatchExecuteStatementResponse, TransportError>;

    async fn begin_transaction(
        &self,
        request: BeginTransactionRequest,
    ) -> Result<BeginTransactionResponse, TransportError>;

    async fn commit_transaction(
        &self,
        request: CommitTransactionRequest,
    ) -> Result<CommitTransactionResponse, TransportError>;

    async fn rollback_transaction(
        &self,
        request: RollbackTransactionRequest,
    ) -> Result<RollbackTransactionResponse, TransportError>;
}

#[async_trait]
impl<T: RdsDataApi + ?Sized> RdsDataApi for std::sync::Arc<T> {
    async fn execute_statement(
        &self,
        request: ExecuteStatementRequest,
    ) -> Result<ExecuteStatementResponse, TransportError> {
        (**self).execute_statement(request).await
    }

    async fn batch_execute_statement(
        &self,
        request: BatchExecuteStatementRequest,
    ) -> Result<BatchExecuteStatementResponse, TransportError> {
        (**self).batch_execute_statement(request).await
    }

    async fn begin_transaction(
        &self,
        request: BeginTransactionRequest,
    ) -> Result<BeginTransactionResponse, TransportError> {
        (**self).begin_transaction(request).await
    }

    async fn commit_transaction(
        &self,
        request: CommitTransactionRequest,
    ) -> Result<CommitTransactionResponse, TransportError> {
        (**self).commit_transaction(request).await
    }

    async fn rollback_transaction(
        &self,
        request: RollbackTransactionRequest,
    ) -> Result<RollbackTransactionResponse, TransportError> {
        (**self).rollback_transaction(request).await
    }
}
