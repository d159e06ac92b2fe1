//! Call record operations.
//!
//! Each operation is one stateless read-modify-write cycle against a
//! [`CallStore`]: load the whole table, locate rows by Call_ID, mutate in
//! memory, persist the whole table. Payloads are validated before the store
//! is touched, so a rejected request never changes the file.

use ivr_core::{CallRecord, CallStore, CallTable, CallUpdate, IvrError, ValidationError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CallError {
    #[error("Call_ID not found")]
    NotFound(i64),

    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(IvrError),
}

impl From<IvrError> for CallError {
    fn from(e: IvrError) -> Self {
        match e {
            IvrError::DuplicateCallId(id) => {
                CallError::InvalidRequest(format!("Call_ID {} already exists", id))
            }
            other => CallError::Store(other),
        }
    }
}

/// Acknowledgement returned by every mutating operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ack {
    pub message: String,
    #[serde(rename = "Call_ID", skip_serializing_if = "Option::is_none")]
    pub call_id: Option<i64>,
}

impl Ack {
    fn with_id(message: impl Into<String>, call_id: i64) -> Self {
        Self {
            message: message.into(),
            call_id: Some(call_id),
        }
    }

    fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            call_id: None,
        }
    }
}

pub async fn list_calls(store: &dyn CallStore) -> Result<CallTable, CallError> {
    Ok(store.load().await?)
}

pub async fn get_call(store: &dyn CallStore, call_id: i64) -> Result<CallRecord, CallError> {
    let table = store.load().await?;
    table.get(call_id).cloned().ok_or(CallError::NotFound(call_id))
}

/// Insert a new record; an existing Call_ID is rejected.
pub async fn create_call(store: &dyn CallStore, record: CallRecord) -> Result<Ack, CallError> {
    record.validate()?;

    let mut table = store.load().await?;
    let call_id = record.call_id;
    table.insert(record)?;
    store.persist(&table).await?;

    tracing::info!("Created call record {}", call_id);
    Ok(Ack::with_id("Call record created", call_id))
}

/// Replace the record at `call_id` wholesale, inserting it if absent.
pub async fn upsert_call(
    store: &dyn CallStore,
    call_id: i64,
    record: CallRecord,
) -> Result<Ack, CallError> {
    record.validate()?;
    if record.call_id != call_id {
        return Err(CallError::InvalidRequest(
            "Call_ID in URL and body must match".to_string(),
        ));
    }

    let mut table = store.load().await?;
    let replaced = table.upsert(record).is_some();
    store.persist(&table).await?;

    tracing::info!(replaced, "Upserted call record {}", call_id);
    Ok(Ack::with_id("Call record upserted", call_id))
}

/// Apply only the fields present in `update`.
pub async fn patch_call(
    store: &dyn CallStore,
    call_id: i64,
    update: CallUpdate,
) -> Result<Ack, CallError> {
    update.validate()?;

    let mut table = store.load().await?;
    let record = table.get_mut(call_id).ok_or(CallError::NotFound(call_id))?;
    update.apply(record);
    store.persist(&table).await?;

    tracing::info!("Updated call record {}", call_id);
    Ok(Ack::message(format!("Call_ID {} updated successfully", call_id)))
}

pub async fn delete_call(store: &dyn CallStore, call_id: i64) -> Result<Ack, CallError> {
    let mut table = store.load().await?;
    if table.remove(call_id).is_none() {
        return Err(CallError::NotFound(call_id));
    }
    store.persist(&table).await?;

    tracing::info!("Deleted call record {}", call_id);
    Ok(Ack::message(format!("Call_ID {} deleted", call_id)))
}
