//! Category repository for database operations.
//!
//! The catalog changes only when defaults are seeded, so reads are served
//! from a small in-memory cache.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use moka::future::Cache;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
};
use thiserror::Error;
use tracing::info;

use crate::entities::categories;
use tally_core::expense::{Category, default_categories};
use tally_shared::types::CategoryId;

/// Time-to-live for the cached catalog (10 minutes).
const CATALOG_TTL_SECS: u64 = 600;

/// Errors that can occur during category operations.
#[derive(Debug, Error)]
pub enum CategoryError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl CategoryError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

/// Category repository implementation.
#[derive(Clone)]
pub struct CategoryRepository {
    db: DatabaseConnection,
    cache: Cache<(), Arc<Vec<Category>>>,
}

impl CategoryRepository {
    /// Create a new category repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(CATALOG_TTL_SECS))
            .build();
        Self { db, cache }
    }

    /// All categories, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn all(&self) -> Result<Vec<Category>, CategoryError> {
        if let Some(cached) = self.cache.get(&()).await {
            return Ok(cached.as_ref().clone());
        }

        let models = categories::Entity::find()
            .order_by_asc(categories::Column::Name)
            .all(&self.db)
            .await?;
        let catalog: Vec<Category> = models.into_iter().map(to_domain).collect();

        self.cache.insert((), Arc::new(catalog.clone())).await;
        Ok(catalog)
    }

    /// Inserts every default category that does not exist yet and returns
    /// the full catalog. Safe to run repeatedly.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn ensure_defaults(&self) -> Result<Vec<Category>, CategoryError> {
        let defaults = default_categories();
        let existing: Vec<String> = categories::Entity::find()
            .filter(categories::Column::Id.is_in(defaults.iter().map(|c| c.id.as_str())))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect();

        let missing: Vec<categories::ActiveModel> = defaults
            .into_iter()
            .filter(|c| !existing.iter().any(|id| id == c.id.as_str()))
            .map(|c| categories::ActiveModel {
                id: Set(c.id.0),
                name: Set(c.name),
                icon: Set(c.icon),
                created_at: Set(Utc::now().into()),
            })
            .collect();

        if !missing.is_empty() {
            let count = missing.len();
            categories::Entity::insert_many(missing)
                .exec_without_returning(&self.db)
                .await?;
            info!(count, "Inserted default categories");
        }

        self.cache.invalidate_all();
        self.all().await
    }
}

fn to_domain(model: categories::Model) -> Category {
    Category {
        id: CategoryId(model.id),
        name: model.name,
        icon: model.icon,
    }
}
