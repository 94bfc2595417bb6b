//! Generic, timeout-bounded operations over a typed MongoDB collection.
//!
//! # Purpose
//! Thin pass-throughs to the `mongodb` driver. Each call runs under
//! [`OPERATION_TIMEOUT`], logs failures with the collection and operation name,
//! and maps driver errors into [`StoreError`].
//!
//! # Key invariants
//! - No retries, batching or backpressure: one driver call per helper.
//! - A timed-out call is abandoned; the driver future is dropped.
use crate::errors::{StoreError, StoreResult};
use futures::TryStreamExt;
use mongodb::Collection;
use mongodb::bson::{Bson, DateTime, Document, doc};
use mongodb::options::{
    CountOptions, DeleteOptions, FindOneAndUpdateOptions, FindOneOptions, FindOptions,
    InsertManyOptions, InsertOneOptions, UpdateModifications, UpdateOptions,
};
use mongodb::results::{DeleteResult, InsertOneResult, UpdateResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;

/// Upper bound for every collection operation.
pub const OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Field stamped by [`soft_delete_one`].
pub const DELETED_AT_FIELD: &str = "deleted_at";

/// Run one driver call under `limit`.
///
/// # Errors
/// - [`StoreError::Timeout`] when `limit` elapses first.
/// - [`StoreError::Decode`] for documents that do not fit `T`.
/// - [`StoreError::Driver`] for every other driver failure.
pub(crate) async fn bounded<T, F>(
    collection: &str,
    operation: &'static str,
    limit: Duration,
    call: F,
) -> StoreResult<T>
where
    F: Future<Output = mongodb::error::Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => {
            tracing::error!(error = %source, collection, operation, "mongodb operation failed");
            Err(StoreError::from_driver(operation, source))
        }
        Err(_) => {
            tracing::error!(collection, operation, ?limit, "mongodb operation timed out");
            Err(StoreError::Timeout {
                operation,
                after: limit,
            })
        }
    }
}

/// Run a find and decode every matching document.
pub async fn find<T>(
    collection: &Collection<T>,
    filter: Document,
    options: Option<FindOptions>,
) -> StoreResult<Vec<T>>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    bounded(collection.name(), "find", OPERATION_TIMEOUT, async {
        let cursor = collection.find(filter, options).await?;
        cursor.try_collect::<Vec<T>>().await
    })
    .await
}

/// Count the documents matching `filter`.
pub async fn count_documents<T>(
    collection: &Collection<T>,
    filter: Document,
    options: Option<CountOptions>,
) -> StoreResult<u64>
where
    T: Send + Sync,
{
    bounded(
        collection.name(),
        "count_documents",
        OPERATION_TIMEOUT,
        collection.count_documents(filter, options),
    )
    .await
}

/// Return the first document matching `filter`.
///
/// # Errors
/// - [`StoreError::NotFound`] when nothing matches.
pub async fn find_one<T>(
    collection: &Collection<T>,
    filter: Document,
    options: Option<FindOneOptions>,
) -> StoreResult<T>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let found = bounded(
        collection.name(),
        "find_one",
        OPERATION_TIMEOUT,
        collection.find_one(filter, options),
    )
    .await?;
    found.ok_or_else(|| StoreError::NotFound(format!("{}: no matching document", collection.name())))
}

/// Apply `update` to one matching document and return it as it was before the
/// update (unless `options` ask for the new version).
///
/// # Errors
/// - [`StoreError::NotFound`] when nothing matches.
pub async fn find_one_and_update<T>(
    collection: &Collection<T>,
    filter: Document,
    update: impl Into<UpdateModifications>,
    options: Option<FindOneAndUpdateOptions>,
) -> StoreResult<T>
where
    T: DeserializeOwned + Send + Sync,
{
    let found = bounded(
        collection.name(),
        "find_one_and_update",
        OPERATION_TIMEOUT,
        collection.find_one_and_update(filter, update, options),
    )
    .await?;
    found.ok_or_else(|| StoreError::NotFound(format!("{}: no matching document", collection.name())))
}

/// Insert one document.
///
/// # Errors
/// - [`StoreError::Driver`] on write failures such as duplicate keys.
pub async fn insert_one<T>(
    collection: &Collection<T>,
    document: &T,
    options: Option<InsertOneOptions>,
) -> StoreResult<InsertOneResult>
where
    T: Serialize + Send + Sync,
{
    bounded(
        collection.name(),
        "insert_one",
        OPERATION_TIMEOUT,
        collection.insert_one(document, options),
    )
    .await
}

/// Insert `documents` and return their ids in input order.
///
/// An empty slice is a no-op; the driver rejects empty batches.
pub async fn insert_many<T>(
    collection: &Collection<T>,
    documents: &[T],
    options: Option<InsertManyOptions>,
) -> StoreResult<Vec<Bson>>
where
    T: Serialize + Send + Sync,
{
    if documents.is_empty() {
        return Ok(Vec::new());
    }
    let result = bounded(
        collection.name(),
        "insert_many",
        OPERATION_TIMEOUT,
        collection.insert_many(documents, options),
    )
    .await?;
    let mut ids: Vec<(usize, Bson)> = result.inserted_ids.into_iter().collect();
    ids.sort_by_key(|(index, _)| *index);
    Ok(ids.into_iter().map(|(_, id)| id).collect())
}

/// Apply `update` to the first document matching `filter`.
///
/// A filter matching nothing is not an error; check `matched_count`.
pub async fn update_one<T>(
    collection: &Collection<T>,
    filter: Document,
    update: impl Into<UpdateModifications>,
    options: Option<UpdateOptions>,
) -> StoreResult<UpdateResult>
where
    T: Send + Sync,
{
    bounded(
        collection.name(),
        "update_one",
        OPERATION_TIMEOUT,
        collection.update_one(filter, update, options),
    )
    .await
}

/// Apply `update` to every document matching `filter`.
pub async fn update_many<T>(
    collection: &Collection<T>,
    filter: Document,
    update: impl Into<UpdateModifications>,
    options: Option<UpdateOptions>,
) -> StoreResult<UpdateResult>
where
    T: Send + Sync,
{
    bounded(
        collection.name(),
        "update_many",
        OPERATION_TIMEOUT,
        collection.update_many(filter, update, options),
    )
    .await
}

/// Delete the first document matching `filter`.
///
/// `deleted_count` is zero when nothing matched.
pub async fn delete_one<T>(
    collection: &Collection<T>,
    filter: Document,
    options: Option<DeleteOptions>,
) -> StoreResult<DeleteResult>
where
    T: Send + Sync,
{
    bounded(
        collection.name(),
        "delete_one",
        OPERATION_TIMEOUT,
        collection.delete_one(filter, options),
    )
    .await
}

/// Delete every document matching `filter`. An empty filter empties the
/// collection.
pub async fn delete_many<T>(
    collection: &Collection<T>,
    filter: Document,
    options: Option<DeleteOptions>,
) -> StoreResult<DeleteResult>
where
    T: Send + Sync,
{
    bounded(
        collection.name(),
        "delete_many",
        OPERATION_TIMEOUT,
        collection.delete_many(filter, options),
    )
    .await
}

/// Mark one matching document as deleted by stamping [`DELETED_AT_FIELD`].
pub async fn soft_delete_one<T>(
    collection: &Collection<T>,
    filter: Document,
    options: Option<UpdateOptions>,
) -> StoreResult<UpdateResult>
where
    T: Send + Sync,
{
    bounded(
        collection.name(),
        "soft_delete_one",
        OPERATION_TIMEOUT,
        collection.update_one(filter, soft_delete_update(DateTime::now()), options),
    )
    .await
}

fn soft_delete_update(now: DateTime) -> Document {
    doc! { "$set": { DELETED_AT_FIELD: now } }
}
