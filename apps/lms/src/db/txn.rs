use std::sync::Arc;

use futures::future::BoxFuture;
use sea_orm::{DatabaseTransaction, TransactionTrait};

use super::{require_db, txn_policy};
use crate::error::AppError;
use crate::state::app_state::AppState;

/// A transaction owned by the caller and shared with `with_txn`.
#[derive(Clone)]
pub struct SharedTxn(pub Arc<DatabaseTransaction>);

impl SharedTxn {
    pub fn transaction(&self) -> &DatabaseTransaction {
        &self.0
    }
}

/// Run `f` inside a transaction.
///
/// 1) A `SharedTxn` was supplied: run on it; the caller commits or rolls back.
/// 2) Otherwise begin a transaction, apply the process policy on `Ok`, roll back on `Err`.
///
/// Every lifecycle operation must run through here so its reads and status
/// writes are atomic.
pub async fn with_txn<R, F>(
    shared: Option<&SharedTxn>,
    state: &AppState,
    f: F,
) -> Result<R, AppError>
where
    F: for<'a> FnOnce(&'a DatabaseTransaction) -> BoxFuture<'a, Result<R, AppError>>,
{
    if let Some(shared) = shared {
        return f(shared.transaction()).await;
    }

    let txn = require_db(state)?.begin().await?;
    match f(&txn).await {
        Ok(val) => {
            match txn_policy::current() {
                txn_policy::TxnPolicy::CommitOnOk => txn.commit().await?,
                txn_policy::TxnPolicy::RollbackOnOk => txn.rollback().await?,
            }
            Ok(val)
        }
        Err(err) => {
            // Best-effort rollback; the closure's error is the one that matters
            let _ = txn.rollback().await;
            Err(err)
        }
    }
}
