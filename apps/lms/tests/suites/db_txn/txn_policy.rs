use lms::db::txn_policy::{current, set_txn_policy, TxnPolicy};

#[test]
fn common_init_installs_rollback() {
    assert_eq!(current(), TxnPolicy::RollbackOnOk);
}

#[test]
fn policy_is_set_once() {
    set_txn_policy(TxnPolicy::CommitOnOk);
    assert_eq!(current(), TxnPolicy::RollbackOnOk);
}
