//! Postgres backend.
//!
//! Schema lives in `migrations/`. Orders of both kinds share one `orders`
//! table discriminated by `kind`; lines live in `order_lines` with cascade
//! delete. Stock checks happen under `SELECT ... FOR UPDATE` row locks so
//! that two transactions cannot both see the same available stock.
//!
//! sqlx error mapping:
//!
//! | condition                       | surfaced as              |
//! |---------------------------------|--------------------------|
//! | unique/check/fk violation       | `StoreError::Constraint` |
//! | anything else from the driver   | `StoreError::Database`   |

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, Row, Transaction};
use tracing::instrument;
use uuid::Uuid;

use mostrador_core::{CategoryId, ClientId, OrderId, ProductId, SupplierId, UserId};
use mostrador_orders::{LineItem, PaymentMethod, PurchaseOrder, SaleOrder};
use mostrador_products::Product;

use crate::error::StoreError;
use crate::unit_of_work::{OrderStore, OrderTx};

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Apply pending schema migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Constraint(format!("migration failed: {e}")))?;
        Ok(())
    }

    async fn lines_for(&self, order_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<LineItem>>, StoreError> {
        let rows = sqlx::query(
            "SELECT order_id, product_id, quantity, unit_price
             FROM order_lines
             WHERE order_id = ANY($1)
             ORDER BY order_id, line_no",
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        let mut by_order: HashMap<Uuid, Vec<LineItem>> = HashMap::new();
        for row in rows {
            let order_id: Uuid = row.try_get("order_id")?;
            by_order.entry(order_id).or_default().push(LineItem {
                product_id: ProductId::from_uuid(row.try_get("product_id")?),
                quantity: row.try_get("quantity")?,
                unit_price: row.try_get::<i64, _>("unit_price")? as u64,
            });
        }
        Ok(by_order)
    }

    async fn sales_where(
        &self,
        rows: Vec<PgRow>,
    ) -> Result<Vec<SaleOrder>, StoreError> {
        let ids: Vec<Uuid> = rows
            .iter()
            .map(|r| r.try_get("id"))
            .collect::<Result<_, _>>()?;
        let mut lines = self.lines_for(&ids).await?;
        rows.iter()
            .map(|row| {
                let id: Uuid = row.try_get("id")?;
                sale_from_row(row, lines.remove(&id).unwrap_or_default())
            })
            .collect()
    }

    async fn purchases_where(
        &self,
        rows: Vec<PgRow>,
    ) -> Result<Vec<PurchaseOrder>, StoreError> {
        let ids: Vec<Uuid> = rows
            .iter()
            .map(|r| r.try_get("id"))
            .collect::<Result<_, _>>()?;
        let mut lines = self.lines_for(&ids).await?;
        rows.iter()
            .map(|row| {
                let id: Uuid = row.try_get("id")?;
                purchase_from_row(row, lines.remove(&id).unwrap_or_default())
            })
            .collect()
    }
}

const SALE_COLUMNS: &str =
    "id, order_number, client_id, recorded_by, subtotal, discount, total, payment_method, notes, created_at";
const PURCHASE_COLUMNS: &str =
    "id, order_number, supplier_id, recorded_by, total, notes, created_at";

fn map_sqlx(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db) = err {
        if db.is_unique_violation() || db.is_check_violation() || db.is_foreign_key_violation() {
            return StoreError::Constraint(db.message().to_string());
        }
    }
    StoreError::Database(err)
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    Ok(Product {
        id: ProductId::from_uuid(row.try_get("id")?),
        code: row.try_get("code")?,
        name: row.try_get("name")?,
        category: row
            .try_get::<Option<Uuid>, _>("category_id")?
            .map(CategoryId::from_uuid),
        purchase_price: row.try_get::<i64, _>("purchase_price")? as u64,
        sale_price: row.try_get::<i64, _>("sale_price")? as u64,
        stock: row.try_get("stock")?,
        min_stock: row.try_get("min_stock")?,
        active: row.try_get("active")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn sale_from_row(row: &PgRow, lines: Vec<LineItem>) -> Result<SaleOrder, StoreError> {
    let payment: String = row.try_get("payment_method")?;
    let payment_method: PaymentMethod = payment
        .parse()
        .map_err(|_| StoreError::Constraint(format!("bad payment_method {payment:?}")))?;
    Ok(SaleOrder {
        id: OrderId::from_uuid(row.try_get("id")?),
        order_number: row.try_get("order_number")?,
        client: row
            .try_get::<Option<Uuid>, _>("client_id")?
            .map(ClientId::from_uuid),
        recorded_by: UserId::from_uuid(row.try_get("recorded_by")?),
        lines,
        subtotal: row.try_get::<i64, _>("subtotal")? as u64,
        discount: row.try_get::<i64, _>("discount")? as u64,
        total: row.try_get::<i64, _>("total")? as u64,
        payment_method,
        notes: row.try_get("notes")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn purchase_from_row(row: &PgRow, lines: Vec<LineItem>) -> Result<PurchaseOrder, StoreError> {
    Ok(PurchaseOrder {
        id: OrderId::from_uuid(row.try_get("id")?),
        order_number: row.try_get("order_number")?,
        supplier: SupplierId::from_uuid(row.try_get("supplier_id")?),
        recorded_by: UserId::from_uuid(row.try_get("recorded_by")?),
        lines,
        total: row.try_get::<i64, _>("total")? as u64,
        notes: row.try_get("notes")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

#[async_trait]
impl OrderStore for PostgresStore {
    #[instrument(skip(self))]
    async fn begin(&self) -> Result<Box<dyn OrderTx>, StoreError> {
        let tx = self.pool.begin().await.map_err(map_sqlx)?;
        Ok(Box::new(PgTx { tx }))
    }

    #[instrument(skip(self, product), fields(code = %product.code))]
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO products
                 (id, code, name, category_id, purchase_price, sale_price,
                  stock, min_stock, active, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(product.id.as_uuid())
        .bind(&product.code)
        .bind(&product.name)
        .bind(product.category.map(Uuid::from))
        .bind(product.purchase_price as i64)
        .bind(product.sale_price as i64)
        .bind(product.stock)
        .bind(product.min_stock)
        .bind(product.active)
        .bind(product.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query("SELECT * FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.as_ref().map(product_from_row).transpose()
    }

    async fn products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query("SELECT * FROM products ORDER BY code")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.iter().map(product_from_row).collect()
    }

    async fn low_stock_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM products WHERE active AND stock <= min_stock ORDER BY code",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;
        rows.iter().map(product_from_row).collect()
    }

    async fn sales(&self) -> Result<Vec<SaleOrder>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {SALE_COLUMNS} FROM orders WHERE kind = 'sale' ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;
        self.sales_where(rows).await
    }

    async fn sale(&self, id: OrderId) -> Result<Option<SaleOrder>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {SALE_COLUMNS} FROM orders WHERE kind = 'sale' AND id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(self.sales_where(rows).await?.into_iter().next())
    }

    async fn sales_on(&self, day: NaiveDate) -> Result<Vec<SaleOrder>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {SALE_COLUMNS} FROM orders
             WHERE kind = 'sale' AND created_at::date = $1
             ORDER BY created_at DESC"
        ))
        .bind(day)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;
        self.sales_where(rows).await
    }

    async fn purchases(&self) -> Result<Vec<PurchaseOrder>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM orders WHERE kind = 'purchase' ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;
        self.purchases_where(rows).await
    }

    async fn purchase(&self, id: OrderId) -> Result<Option<PurchaseOrder>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM orders WHERE kind = 'purchase' AND id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(self.purchases_where(rows).await?.into_iter().next())
    }
}

struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl OrderTx for PgTx {
    async fn product_for_update(&mut self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query("SELECT * FROM products WHERE id = $1 FOR UPDATE")
            .bind(id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx)?;
        row.as_ref().map(product_from_row).transpose()
    }

    async fn adjust_stock(&mut self, id: ProductId, delta: i64) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE products SET stock = stock + $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(delta)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Constraint(format!("unknown product {id}")));
        }
        Ok(())
    }

    async fn insert_sale(&mut self, order: &SaleOrder) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO orders
                 (id, order_number, kind, client_id, recorded_by,
                  subtotal, discount, total, payment_method, notes, created_at)
             VALUES ($1, $2, 'sale', $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(order.id.as_uuid())
        .bind(&order.order_number)
        .bind(order.client.map(Uuid::from))
        .bind(order.recorded_by.as_uuid())
        .bind(order.subtotal as i64)
        .bind(order.discount as i64)
        .bind(order.total as i64)
        .bind(order.payment_method.as_str())
        .bind(&order.notes)
        .bind(order.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx)?;

        insert_lines(&mut self.tx, order.id, &order.lines).await
    }

    async fn insert_purchase(&mut self, order: &PurchaseOrder) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO orders
                 (id, order_number, kind, supplier_id, recorded_by,
                  subtotal, discount, total, notes, created_at)
             VALUES ($1, $2, 'purchase', $3, $4, $5, 0, $5, $6, $7)",
        )
        .bind(order.id.as_uuid())
        .bind(&order.order_number)
        .bind(order.supplier.as_uuid())
        .bind(order.recorded_by.as_uuid())
        .bind(order.total as i64)
        .bind(&order.notes)
        .bind(order.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx)?;

        insert_lines(&mut self.tx, order.id, &order.lines).await
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(map_sqlx)
    }
}

async fn insert_lines(
    tx: &mut Transaction<'static, Postgres>,
    order_id: OrderId,
    lines: &[LineItem],
) -> Result<(), StoreError> {
    for (line_no, line) in lines.iter().enumerate() {
        sqlx::query(
            "INSERT INTO order_lines (order_id, line_no, product_id, quantity, unit_price)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(order_id.as_uuid())
        .bind(line_no as i32)
        .bind(line.product_id.as_uuid())
        .bind(line.quantity)
        .bind(line.unit_price as i64)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx)?;
    }
    Ok(())
}
