#![allow(dead_code)]

// Logging is auto-installed for every test binary that includes this module
#[ctor::ctor]
fn init_logging() {
    lms_test_support::logging::init();
}

// Rollback by default so suites never leave rows behind; `LMS_TXN_POLICY=commit` flips it.
#[ctor::ctor]
fn init_txn_policy() {
    let policy = match std::env::var("LMS_TXN_POLICY")
        .unwrap_or_default()
        .to_lowercase()
        .as_str()
    {
        "commit" => lms::db::txn_policy::TxnPolicy::CommitOnOk,
        _ => lms::db::txn_policy::TxnPolicy::RollbackOnOk,
    };

    lms::db::txn_policy::set_txn_policy(policy);
}
