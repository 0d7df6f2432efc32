//! Transaction recording and direct edits.

mod domain;
mod ops;

pub use domain::{Amount, Transaction, TransactionId, TransactionKind};
pub use ops::{
    NewTransaction, TransactionUpdate, create_transaction, delete_transaction,
    get_all_transactions, get_transactions_between, update_transaction,
};
