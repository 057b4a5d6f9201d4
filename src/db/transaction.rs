/*!
 * Transaction Helper Utilities
 *
 * Every mutating capacity operation runs as one all-or-nothing unit.
 */

use metrics::{counter, histogram};
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, warn};

use crate::errors::ServiceError;

/// Type alias for boxed future used in transactions
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Execute `f` inside a database transaction.
///
/// Commits when `f` returns `Ok`, rolls back when it returns `Err`. If the
/// future is dropped midway the `DatabaseTransaction` rolls back on drop, so
/// no exit path leaves a half-applied change behind.
///
/// The closure receives the transaction by reference and must only capture
/// owned values (clone services and contexts in before the call).
///
/// # Example
///
/// ```rust,ignore
/// let service = self.clone();
/// transaction_scope(&self.db, "seal_box", move |txn| {
///     Box::pin(async move { service.seal_in(txn, box_id).await })
/// })
/// .await?;
/// ```
pub async fn transaction_scope<F, T>(
    db: &DatabaseConnection,
    operation: &'static str,
    f: F,
) -> Result<T, ServiceError>
where
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, Result<T, ServiceError>>,
{
    let start = std::time::Instant::now();
    debug!(operation, "Starting database transaction");

    let txn = db.begin().await.map_err(ServiceError::db_error)?;

    let result = f(&txn).await;
    let elapsed = start.elapsed();
    histogram!("capacity_db.transaction.duration", elapsed, "operation" => operation);

    match result {
        Ok(value) => {
            txn.commit().await.map_err(ServiceError::db_error)?;
            counter!("capacity_db.transaction.committed", 1, "operation" => operation);
            debug!(operation, "Transaction committed in {:?}", elapsed);
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                warn!(operation, error = %rollback_err, "Transaction rollback failed");
            }
            counter!("capacity_db.transaction.rolled_back", 1, "operation" => operation);
            warn!(operation, error = %err, "Transaction rolled back after {:?}", elapsed);
            Err(err)
        }
    }
}
