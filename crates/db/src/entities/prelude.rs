//! `SeaORM` entity prelude.

pub use super::categories::Entity as Categories;
pub use super::expenses::Entity as Expenses;
pub use super::group_members::Entity as GroupMembers;
