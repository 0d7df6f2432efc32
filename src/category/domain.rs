//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::{
    Error,
    store::{Document, DocumentId, Fields},
};

/// A validated, non-empty category name.
///
/// The name doubles as the link key on transactions, so the application
/// treats it as unique per account even though the store does not enforce
/// that.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyCategoryName] if `name` is empty or whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty. This function
    /// has `_unchecked` in the name but is not `unsafe`: violating the
    /// non-empty invariant causes incorrect behaviour, not memory unsafety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A display color token, e.g. `#1976d2`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(String);

impl Color {
    /// The palette offered by the category form.
    pub const PALETTE: [&'static str; 8] = [
        "#1976d2", "#388e3c", "#fbc02d", "#d32f2f", "#7b1fa2", "#ff9800", "#0097a7", "#455a64",
    ];

    /// Wrap a color token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self(Self::PALETTE[0].to_string())
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key of the icon shown on a category card, e.g. `fastfood`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconKey(String);

impl IconKey {
    /// The icon keys offered by the category form.
    pub const KNOWN: [&'static str; 12] = [
        "category",
        "fastfood",
        "car",
        "home",
        "lightbulb",
        "celebration",
        "shopping",
        "work",
        "creditcard",
        "hospital",
        "flight",
        "school",
    ];

    /// Wrap an icon key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for IconKey {
    fn default() -> Self {
        Self(Self::KNOWN[0].to_string())
    }
}

impl Display for IconKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store identifier for a category.
pub type CategoryId = DocumentId;

/// A user-defined grouping for transactions (e.g. 'Groceries', 'Salary').
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    /// The store-assigned ID of the category document.
    pub id: CategoryId,
    /// The category's display name and link key.
    pub name: CategoryName,
    /// The color of the category's summary card.
    pub color: Color,
    /// The icon shown on the category's summary card.
    pub icon: IconKey,
    /// When the category was created.
    pub created_at: OffsetDateTime,
}

/// Stored field layout of a category document.
#[derive(Serialize, Deserialize)]
struct CategoryRecord {
    name: CategoryName,
    #[serde(default)]
    color: Color,
    #[serde(default)]
    icon: IconKey,
    #[serde(rename = "createdAt", with = "time::serde::timestamp")]
    created_at: OffsetDateTime,
}

impl Category {
    /// Decode a category from its stored document.
    ///
    /// # Errors
    ///
    /// Returns [Error::MalformedDocument] when required fields are missing
    /// or hold the wrong type.
    pub fn from_document(document: &Document) -> Result<Self, Error> {
        let record: CategoryRecord =
            serde_json::from_value(Value::Object(document.fields.clone())).map_err(|error| {
                Error::MalformedDocument(document.id.to_string(), error.to_string())
            })?;

        Ok(Self {
            id: document.id.clone(),
            name: record.name,
            color: record.color,
            icon: record.icon,
            created_at: record.created_at,
        })
    }

    /// Encode the stored fields for a category document.
    pub(crate) fn fields(
        name: &CategoryName,
        color: &Color,
        icon: &IconKey,
        created_at: OffsetDateTime,
    ) -> Result<Fields, Error> {
        let record = CategoryRecord {
            name: name.clone(),
            color: color.clone(),
            icon: icon.clone(),
            created_at,
        };

        match serde_json::to_value(record)? {
            Value::Object(fields) => Ok(fields),
            other => Err(Error::JsonSerializationError(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }
}


#[cfg(test)]
mod document_tests {
    use serde_json::json;
    use time::macros::datetime;

    use crate::{
        Error,
        store::{Document, DocumentId},
    };

    use super::{Category, CategoryName, Color, IconKey};

    #[test]
    fn category_round_trips_through_document_fields() {
        let name = CategoryName::new_unchecked("Food");
        let color = Color::new("#388e3c");
        let icon = IconKey::new("fastfood");
        let created_at = datetime!(2024-01-15 12:00 UTC);

        let fields = Category::fields(&name, &color, &icon, created_at).unwrap();
        let document = Document {
            id: DocumentId::new("c1"),
            fields,
        };
        let category = Category::from_document(&document).unwrap();

        assert_eq!(category.name, name);
        assert_eq!(category.color, color);
        assert_eq!(category.icon, icon);
        assert_eq!(category.created_at, created_at);
    }

    #[test]
    fn missing_color_and_icon_fall_back_to_defaults() {
        let document = Document {
            id: DocumentId::new("c1"),
            fields: json!({"name": "Food", "createdAt": 1_700_000_000})
                .as_object()
                .unwrap()
                .clone(),
        };

        let category = Category::from_document(&document).unwrap();

        assert_eq!(category.color, Color::default());
        assert_eq!(category.icon, IconKey::default());
    }

    #[test]
    fn document_without_name_is_malformed() {
        let document = Document {
            id: DocumentId::new("c1"),
            fields: json!({"createdAt": 1_700_000_000}).as_object().unwrap().clone(),
        };

        let result = Category::from_document(&document);

        assert!(matches!(result, Err(Error::MalformedDocument(id, _)) if id == "c1"));
    }
}
