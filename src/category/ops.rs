//! Create and read operations for categories.

use time::OffsetDateTime;

use crate::{
    Error,
    scope::AccountScope,
    store::{DocumentStore, Filter},
};

use super::domain::{Category, CategoryId, CategoryName, Color, IconKey};

/// The data needed to create a category.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    /// The category's display name and link key.
    pub name: CategoryName,
    /// The color of the category's summary card.
    pub color: Color,
    /// The icon shown on the category's summary card.
    pub icon: IconKey,
    /// When the category was created.
    pub created_at: OffsetDateTime,
}

impl NewCategory {
    /// A new category with the default color and icon, created now.
    ///
    /// The creation time is truncated to whole seconds, matching the stored
    /// encoding.
    pub fn new(name: CategoryName) -> Self {
        Self {
            name,
            color: Color::default(),
            icon: IconKey::default(),
            created_at: OffsetDateTime::now_utc()
                .replace_nanosecond(0)
                .expect("zero nanoseconds is valid"),
        }
    }
}

/// Create a category and return it with its store-assigned ID.
pub async fn create_category<S: DocumentStore>(
    store: &S,
    scope: &AccountScope,
    new_category: NewCategory,
) -> Result<Category, Error> {
    let fields = Category::fields(
        &new_category.name,
        &new_category.color,
        &new_category.icon,
        new_category.created_at,
    )?;

    let id = store.create(&scope.categories(), fields).await?;
    tracing::debug!(category = %new_category.name, %id, "created category");

    Ok(Category {
        id,
        name: new_category.name,
        color: new_category.color,
        icon: new_category.icon,
        created_at: new_category.created_at,
    })
}

/// Retrieve a single category by ID.
///
/// # Errors
///
/// Returns [Error::NotFound] if no category document has the given ID.
pub async fn get_category<S: DocumentStore>(
    store: &S,
    scope: &AccountScope,
    category_id: &CategoryId,
) -> Result<Category, Error> {
    store
        .query(&scope.categories(), &Filter::All)
        .await?
        .iter()
        .find(|document| document.id == *category_id)
        .map(Category::from_document)
        .ok_or(Error::NotFound)?
}

/// Retrieve all categories ordered alphabetically by name.
pub async fn get_all_categories<S: DocumentStore>(
    store: &S,
    scope: &AccountScope,
) -> Result<Vec<Category>, Error> {
    let mut categories = store
        .query(&scope.categories(), &Filter::All)
        .await?
        .iter()
        .map(Category::from_document)
        .collect::<Result<Vec<_>, _>>()?;

    categories.sort_by(|a, b| a.name.as_ref().cmp(b.name.as_ref()));

    Ok(categories)
}
