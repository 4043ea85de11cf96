//! Product catalog storage.
//!
//! Thin data-retrieval collaborator; it carries no auth state of its own.

use anyhow::Result;

use crate::db::Db;
use crate::db::schema::{ProductCreate, ProductRecord};

/// Store for catalog products.
#[derive(Clone)]
pub struct ProductStore {
    db: Db,
}

impl ProductStore {
    /// Create a new product store.
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// List all products, newest first.
    pub async fn list(&self) -> Result<Vec<ProductRecord>> {
        let mut res = self
            .db
            .query("SELECT * FROM product ORDER BY created_at DESC")
            .await?;

        let products: Vec<ProductRecord> = res.take(0)?;
        Ok(products)
    }

    /// Insert a new product.
    pub async fn create(&self, create: &ProductCreate) -> Result<ProductRecord> {
        let name = create.name.clone();
        let description = create.description.clone();
        let price = create.price;
        let stock = create.stock;

        let query = r#"
            CREATE product CONTENT {
                name: $name,
                description: $description,
                price: $price,
                stock: $stock
            }
        "#;

        let mut res = self
            .db
            .query(query)
            .bind(("name", name))
            .bind(("description", description))
            .bind(("price", price))
            .bind(("stock", stock))
            .await?;

        let products: Vec<ProductRecord> = res.take(0)?;
        products
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Failed to create product"))
    }

    /// Seed a handful of demo products. Skipped when the table already has
    /// rows, so repeated seeding stays idempotent.
    pub async fn seed_demo(&self) -> Result<usize> {
        if !self.list().await?.is_empty() {
            return Ok(0);
        }

        let demo = [
            ProductCreate {
                name: "One Piece Vol. 1".to_string(),
                description: Some("Romance Dawn".to_string()),
                price: 9.99,
                stock: 25,
            },
            ProductCreate {
                name: "Berserk Deluxe Vol. 1".to_string(),
                description: Some("Hardcover omnibus edition".to_string()),
                price: 49.99,
                stock: 8,
            },
            ProductCreate {
                name: "Fullmetal Alchemist Vol. 3".to_string(),
                description: None,
                price: 11.50,
                stock: 14,
            },
        ];

        for product in &demo {
            self.create(product).await?;
        }

        Ok(demo.len())
    }
}
