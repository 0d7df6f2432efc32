//! End-to-end walk through the category lifecycle: create categories, link
//! transactions, rename, delete, and aggregate along the way.

use centavo::{
    AccountScope, MemoryStore,
    category::{
        CategoryName, CategoryUpdate, NewCategory, create_category, delete_category,
        get_all_categories, rename_category,
    },
    summary::{TimeWindow, summarize, watch_summary},
    transaction::{
        Amount, NewTransaction, TransactionKind, create_transaction, get_all_transactions,
    },
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[tokio::test]
async fn rename_then_delete_keeps_transactions_consistent() {
    init_tracing();
    let store = MemoryStore::new();
    let scope = AccountScope::new("alice");

    let food = create_category(
        &store,
        &scope,
        NewCategory::new(CategoryName::new_unchecked("Food")),
    )
    .await
    .expect("could not create category");

    for amount in [20.0, 5.0] {
        create_transaction(
            &store,
            &scope,
            NewTransaction::new(Amount::new(amount).unwrap(), TransactionKind::Expense)
                .with_category(food.name.clone()),
        )
        .await
        .expect("could not create transaction");
    }

    let feed = watch_summary(&store, &scope, TransactionKind::Expense, TimeWindow::AllTime);

    // Rename: both transactions follow the category to its new name.
    rename_category(
        &store,
        &scope,
        &food.id,
        CategoryUpdate::rename(CategoryName::new_unchecked("Groceries")),
    )
    .await
    .expect("rename failed");

    let transactions = get_all_transactions(&store, &scope).await.unwrap();
    assert!(
        transactions
            .iter()
            .all(|transaction| transaction.category
                == Some(CategoryName::new_unchecked("Groceries")))
    );

    let categories = get_all_categories(&store, &scope).await.unwrap();
    let summary = summarize(
        &categories,
        &transactions,
        TransactionKind::Expense,
        TimeWindow::AllTime,
    );
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].label.as_ref(), "Groceries");
    assert_eq!(summary[0].amount, 25.0);
    assert_eq!(feed.current(), summary);

    // Delete: the category disappears and both transactions become
    // explicitly uncategorized, keeping their amounts.
    delete_category(&store, &scope, &food.id)
        .await
        .expect("delete failed");

    assert!(get_all_categories(&store, &scope).await.unwrap().is_empty());

    let transactions = get_all_transactions(&store, &scope).await.unwrap();
    assert_eq!(transactions.len(), 2);
    assert!(transactions.iter().all(|transaction| transaction.category.is_none()));
    let raw_total: f64 = transactions
        .iter()
        .map(|transaction| transaction.amount.as_f64())
        .sum();
    assert_eq!(raw_total, 25.0);

    // No categories left means an empty summary, live and recomputed alike.
    let summary = summarize(&[], &transactions, TransactionKind::Expense, TimeWindow::AllTime);
    assert!(summary.is_empty());
    assert!(feed.current().is_empty());
}
