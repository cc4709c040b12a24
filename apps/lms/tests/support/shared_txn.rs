use std::sync::Arc;

use lms::db::txn::SharedTxn;
use sea_orm::{DatabaseConnection, TransactionTrait};

/// Begin a transaction and wrap it as a SharedTxn.
///
/// Tests own the transaction lifecycle; `with_txn` never commits a shared one.
pub async fn open(conn: &DatabaseConnection) -> SharedTxn {
    let txn = conn.begin().await.expect("Failed to begin transaction");
    SharedTxn(Arc::new(txn))
}

pub async fn rollback(shared: SharedTxn) -> Result<(), sea_orm::DbErr> {
    let txn = Arc::try_unwrap(shared.0).map_err(|_| {
        sea_orm::DbErr::Custom("Cannot rollback: transaction is still shared".to_string())
    })?;
    txn.rollback().await
}
