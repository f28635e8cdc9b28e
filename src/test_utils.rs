//! In-memory transport for tests: records every request and replays queued
//! responses.

use std::collections::VecDeque;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::error::TransportError;
use crate::transport::RdsDataApi;
use crate::wire::{
    BatchExecuteStatementRequest, BatchExecuteStatementResponse, BeginTransactionRequest,
    BeginTransactionResponse, CommitTransactionRequest, CommitTransactionResponse,
    ExecuteStatementRequest, ExecuteStatementResponse, RollbackTransactionRequest,
    RollbackTransactionResponse,
};

/// Error returned by [`MockDataApi`] for queued failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("mock transport failure: {0}")]
pub struct MockTransportError(pub String);

/// One call received by the mock, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    ExecuteStatement(ExecuteStatementRequest),
    BatchExecuteStatement(BatchExecuteStatementRequest),
    BeginTransaction(BeginTransactionRequest),
    CommitTransaction(CommitTransactionRequest),
    RollbackTransaction(RollbackTransactionRequest),
}

type Queue<T> = Mutex<VecDeque<Result<T, MockTransportError>>>;

/// Transport double.
///
/// Calls with nothing queued get an empty response (and a fresh transaction id
/// for `beginTransaction`).
#[derive(Default)]
pub struct MockDataApi {
    calls: Mutex<Vec<RecordedCall>>,
    execute: Queue<ExecuteStatementResponse>,
    batch: Queue<BatchExecuteStatementResponse>,
}

impl MockDataApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push_execute_response(&self, response: ExecuteStatementResponse) {
        self.execute.lock().await.push_back(Ok(response));
    }

    /// Queue a response given in the service's JSON shape.
    ///
    /// # Panics
    /// Panics if `value` is not a valid `executeStatement` response.
    pub async fn push_execute_json(&self, value: serde_json::Value) {
        let response = serde_json::from_value(value)
            .unwrap_or_else(|e| panic!("invalid executeStatement response fixture: {e}"));
        self.push_execute_response(response).await;
    }

    pub async fn push_execute_error(&self, message: impl Into<String>) {
        self.execute
            .lock()
            .await
            .push_back(Err(MockTransportError(message.into())));
    }

    pub async fn push_batch_response(&self, response: BatchExecuteStatementResponse) {
        self.batch.lock().await.push_back(Ok(response));
    }

    pub async fn push_batch_error(&self, message: impl Into<String>) {
        self.batch
            .lock()
            .await
            .push_back(Err(MockTransportError(message.into())));
    }

    /// Every call received so far.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    pub async fn execute_requests(&self) -> Vec<ExecuteStatementRequest> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                RecordedCall::ExecuteStatement(req) => Some(req.clone()),
                _ => None,
            })
            .collect()
    }

    pub async fn batch_requests(&self) -> Vec<BatchExecuteStatementRequest> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                RecordedCall::BatchExecuteStatement(req) => Some(req.clone()),
                _ => None,
            })
            .collect()
    }

    async fn record(&self, call: RecordedCall) -> usize {
        let mut calls = self.calls.lock().await;
        calls.push(call);
        calls.len()
    }
}

fn replay<T: Default>(next: Option<Result<T, MockTransportError>>) -> Result<T, TransportError> {
    match next {
        Some(Ok(response)) => Ok(response),
        Some(Err(err)) => Err(Box::new(err)),
        None => Ok(T::default()),
    }
}

#[async_trait]
impl RdsDataApi for MockDataApi {
    async fn execute_statement(
        &self,
        request: ExecuteStatementRequest,
    ) -> Result<ExecuteStatementResponse, TransportError> {
        self.record(RecordedCall::ExecuteStatement(request)).await;
        replay(self.execute.lock().await.pop_front())
    }

    async fn batch_execute_statement(
        &self,
        request: BatchExecuteStatementRequest,
    ) -> Result<BatchExecuteStatementResponse, TransportError> {
        self.record(RecordedCall::BatchExecuteStatement(request)).await;
        replay(self.batch.lock().await.pop_front())
    }

    async fn begin_transaction(
        &self,
        request: BeginTransactionRequest,
    ) -> Result<BeginTransactionResponse, TransportError> {
        let n = self.record(RecordedCall::BeginTransaction(request)).await;
        Ok(BeginTransactionResponse {
            transaction_id: format!("tx-{n}"),
        })
    }

    async fn commit_transaction(
        &self,
        request: CommitTransactionRequest,
    ) -> Result<CommitTransactionResponse, TransportError> {
        self.record(RecordedCall::CommitTransaction(request)).await;
        Ok(CommitTransactionResponse {
            transaction_status: "Transaction Committed".to_string(),
        })
    }

    async fn rollback_transaction(
        &self,
        request: RollbackTransactionRequest,
    ) -> Result<RollbackTransactionResponse, TransportError> {
        self.record(RecordedCall::RollbackTransaction(request)).await;
        Ok(RollbackTransactionResponse {
            transaction_status: "Rollback Complete".to_string(),
        })
    }
}
