//! `SeaORM` entities for the tables the expense core reads and writes.
//!
//! The schema itself is owned by the hosted backend.

pub mod prelude;

pub mod categories;
pub mod expenses;
pub mod group_members;
