//! Category management and the rename/delete consistency cascades.

mod cascade;
mod domain;
mod ops;

pub use cascade::{CascadeOutcome, CategoryUpdate, delete_category, rename_category};
pub use domain::{Category, CategoryId, CategoryName, Color, IconKey};
pub use ops::{NewCategory, create_category, get_all_categories, get_category};
