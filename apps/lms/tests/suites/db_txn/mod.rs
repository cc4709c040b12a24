pub mod shared_txn;
pub mod txn_policy;
pub mod with_txn;
