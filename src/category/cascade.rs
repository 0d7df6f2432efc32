//! Rename and delete cascades that keep transaction links consistent.
//!
//! Transactions reference their category by denormalized name. Renaming a
//! category rewrites that name on every referencing transaction; deleting a
//! category nulls it out. Each cascade reads the referencing transactions
//! first and then commits a single atomic batch covering the transactions
//! and the category document, so no partial state is ever observable.
//!
//! The scan-to-commit window is a known race: a transaction created after
//! the scan but before the commit keeps the old category name and stays
//! orphaned until a later cascade touches it. The store interface offers no
//! transactional read-then-write primitive that would close this window, so
//! neither cascade retries or reconciles on its own.

use serde_json::Value;

use crate::{
    Error,
    scope::AccountScope,
    store::{DocumentStore, Fields, Filter, WriteBatch},
};

use super::{
    domain::{CategoryId, CategoryName, Color, IconKey},
    ops::get_category,
};

/// The fields of a category that [rename_category] may change.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryUpdate {
    /// The category's new name. Passing the current name leaves the
    /// transaction links untouched.
    pub name: CategoryName,
    /// New card color, or `None` to keep the current one.
    pub color: Option<Color>,
    /// New card icon, or `None` to keep the current one.
    pub icon: Option<IconKey>,
}

impl CategoryUpdate {
    /// An update that only renames the category.
    pub fn rename(name: CategoryName) -> Self {
        Self {
            name,
            color: None,
            icon: None,
        }
    }
}

/// The result of a completed cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeOutcome {
    /// How many transactions had their category link rewritten.
    pub transactions_updated: usize,
}

/// Rename a category and retarget every transaction that references it, as
/// one atomic commit.
///
/// When the new name equals the current one the transaction scan is skipped
/// entirely, and if color and icon are also unchanged nothing is written.
///
/// # Errors
///
/// Returns [Error::NotFound] if `category_id` does not resolve to a
/// category. Commit failures surface unchanged; the batch is atomic, so the
/// caller retries the whole operation or nothing happened.
pub async fn rename_category<S: DocumentStore>(
    store: &S,
    scope: &AccountScope,
    category_id: &CategoryId,
    update: CategoryUpdate,
) -> Result<CascadeOutcome, Error> {
    let category = get_category(store, scope, category_id).await?;
    let old_name = category.name;

    let rename_needed = old_name != update.name;
    let color_changed = update.color.as_ref().is_some_and(|color| *color != category.color);
    let icon_changed = update.icon.as_ref().is_some_and(|icon| *icon != category.icon);

    if !rename_needed && !color_changed && !icon_changed {
        tracing::debug!(category = %old_name, "rename is a no-op");
        return Ok(CascadeOutcome {
            transactions_updated: 0,
        });
    }

    let mut batch = WriteBatch::new();
    let mut transactions_updated = 0;

    if rename_needed {
        let transactions = scope.transactions();
        let referencing = store
            .query(&transactions, &Filter::field_eq("category", old_name.as_ref()))
            .await?;

        for document in &referencing {
            let mut fields = Fields::new();
            fields.insert(
                "category".to_string(),
                Value::String(update.name.to_string()),
            );
            batch.update(transactions.doc(&document.id), fields);
        }

        transactions_updated = referencing.len();
    }

    let mut category_fields = Fields::new();
    category_fields.insert("name".to_string(), Value::String(update.name.to_string()));
    if let Some(color) = &update.color {
        category_fields.insert("color".to_string(), Value::String(color.as_str().to_string()));
    }
    if let Some(icon) = &update.icon {
        category_fields.insert("icon".to_string(), Value::String(icon.as_str().to_string()));
    }
    batch.update(scope.categories().doc(category_id), category_fields);

    store.batch_write(batch).await?;
    tracing::debug!(
        from = %old_name,
        to = %update.name,
        transactions = transactions_updated,
        "renamed category"
    );

    Ok(CascadeOutcome {
        transactions_updated,
    })
}

/// Delete a category and null out the link on every transaction that
/// references it, as one atomic commit.
///
/// Referencing transactions end up explicitly uncategorized rather than
/// pointing at a name with no category behind it.
///
/// # Errors
///
/// Returns [Error::NotFound] if `category_id` does not resolve to a
/// category, including when it was already deleted elsewhere; the
/// transaction-nulling effect is never applied twice.
pub async fn delete_category<S: DocumentStore>(
    store: &S,
    scope: &AccountScope,
    category_id: &CategoryId,
) -> Result<CascadeOutcome, Error> {
    let category = get_category(store, scope, category_id).await?;

    let transactions = scope.transactions();
    let referencing = store
        .query(
            &transactions,
            &Filter::field_eq("category", category.name.as_ref()),
        )
        .await?;

    let mut batch = WriteBatch::new();
    for document in &referencing {
        let mut fields = Fields::new();
        fields.insert("category".to_string(), Value::Null);
        batch.update(transactions.doc(&document.id), fields);
    }
    batch.delete(scope.categories().doc(category_id));

    store.batch_write(batch).await?;
    tracing::debug!(
        category = %category.name,
        transactions = referencing.len(),
        "deleted category"
    );

    Ok(CascadeOutcome {
        transactions_updated: referencing.len(),
    })
}


#[cfg(test)]
mod delete_tests {
    use crate::{
        Error,
        category::{
            Category, CategoryName, NewCategory, create_category, get_all_categories,
        },
        scope::AccountScope,
        store::memory::MemoryStore,
        transaction::{
            Amount, NewTransaction, TransactionKind, create_transaction, get_all_transactions,
        },
    };

    use super::delete_category;

    fn test_scope() -> AccountScope {
        AccountScope::new("test-user")
    }

    async fn create_test_category(store: &MemoryStore, scope: &AccountScope, name: &str) -> Category {
        create_category(
            store,
            scope,
            NewCategory::new(CategoryName::new_unchecked(name)),
        )
        .await
        .expect("could not create test category")
    }

    #[tokio::test]
    async fn delete_nulls_out_every_referencing_transaction() {
        let store = MemoryStore::new();
        let scope = test_scope();
        let food = create_test_category(&store, &scope, "Food").await;
        for amount in [20.0, 5.0] {
            create_transaction(
                &store,
                &scope,
                NewTransaction::new(Amount::new(amount).unwrap(), TransactionKind::Expense)
                    .with_category(food.name.clone()),
            )
            .await
            .unwrap();
        }

        let outcome = delete_category(&store, &scope, &food.id)
            .await
            .expect("delete failed");

        assert_eq!(outcome.transactions_updated, 2);
        assert!(get_all_categories(&store, &scope).await.unwrap().is_empty());

        let transactions = get_all_transactions(&store, &scope).await.unwrap();
        assert_eq!(transactions.len(), 2);
        assert!(transactions.iter().all(|transaction| transaction.category.is_none()));
    }

    #[tokio::test]
    async fn delete_leaves_other_categories_transactions_alone() {
        let store = MemoryStore::new();
        let scope = test_scope();
        let food = create_test_category(&store, &scope, "Food").await;
        let rent = create_test_category(&store, &scope, "Rent").await;
        create_transaction(
            &store,
            &scope,
            NewTransaction::new(Amount::new(800.0).unwrap(), TransactionKind::Expense)
                .with_category(rent.name.clone()),
        )
        .await
        .unwrap();

        let outcome = delete_category(&store, &scope, &food.id).await.unwrap();

        assert_eq!(outcome.transactions_updated, 0);
        let transactions = get_all_transactions(&store, &scope).await.unwrap();
        assert_eq!(transactions[0].category, Some(rent.name));
    }

    #[tokio::test]
    async fn second_delete_returns_not_found() {
        let store = MemoryStore::new();
        let scope = test_scope();
        let food = create_test_category(&store, &scope, "Food").await;
        create_transaction(
            &store,
            &scope,
            NewTransaction::new(Amount::new(20.0).unwrap(), TransactionKind::Expense)
                .with_category(food.name.clone()),
        )
        .await
        .unwrap();

        let first = delete_category(&store, &scope, &food.id).await;
        let second = delete_category(&store, &scope, &food.id).await;

        assert!(first.is_ok());
        assert_eq!(second, Err(Error::NotFound));
    }
}
