//! Product catalog service

use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{Product, ProductRow, PRODUCT_COLUMNS};
use shared::validate_required_text;

/// Product service for the catalog of deliverable products
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Input for creating a product
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductInput {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all products by name
    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Create a product; names are unique
    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<Product> {
        input.validate()?;

        validate_required_text(&input.name).map_err(|msg| AppError::validation("name", msg))?;
        let name = input.name.trim();

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE LOWER(name) = LOWER($1))",
        )
        .bind(name)
        .fetch_one(&self.db)
        .await?;

        if exists {
            return Err(AppError::validation("name", "Product name already exists"));
        }

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO products (name) VALUES ($1) RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(name)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(product_id = %row.id, name = %row.name, "Product created");
        Ok(row.into())
    }
}
