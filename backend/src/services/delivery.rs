//! Product line service: delivery and spreading commands
//!
//! Every command runs in one transaction that locks the owning stop row,
//! applies the change to the stop's lines and writes the re-derived status
//! back to the stop before committing.

use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{
    ProductLine, ProductLineRow, StopRow, StopStatus, PRODUCT_LINE_COLUMNS, STOP_COLUMNS,
};
use shared::{
    mark_all_delivered, mark_all_spread, mark_line_spread, record_delivery, resolve_stop_status,
    set_delivered_quantity, stop_totals, validate_product_line, validate_quantity,
    validate_spread_flags, Stop,
};

/// Product line service for delivery progress
#[derive(Clone)]
pub struct ProductLineService {
    db: PgPool,
}

/// Stop state after a delivery command
#[derive(Debug, Clone, Serialize)]
pub struct StopDelivery {
    pub stop_id: Uuid,
    pub status: StopStatus,
    pub total_quantity: i64,
    pub delivered_quantity: i64,
    pub lines: Vec<ProductLine>,
}

/// Input for adding a product to a stop
#[derive(Debug, Deserialize, Validate)]
pub struct AddProductLineInput {
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[serde(default)]
    pub spread_requested: bool,
}

/// Input for editing a line; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProductLineInput {
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
    pub spread_requested: Option<bool>,
}

/// Input for overwriting a line's delivered quantity
#[derive(Debug, Deserialize, Validate)]
pub struct SetDeliveredInput {
    #[validate(range(min = 0))]
    pub delivered_quantity: i32,
}

/// Input for adding to a line's delivered quantity
#[derive(Debug, Deserialize, Validate)]
pub struct RecordDeliveryInput {
    #[validate(range(min = 1))]
    pub amount: i32,
}

impl ProductLineService {
    /// Create a new ProductLineService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Add a product line to a stop
    pub async fn add_product(
        &self,
        stop_id: Uuid,
        input: AddProductLineInput,
    ) -> AppResult<StopDelivery> {
        input.validate()?;
        validate_quantity(None, input.quantity)?;

        let mut tx = self.db.begin().await?;
        let stop = lock_stop(&mut tx, stop_id).await?;

        let product_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(input.product_id)
                .fetch_one(&mut *tx)
                .await?;
        if !product_exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let row = sqlx::query_as::<_, ProductLineRow>(&format!(
            r#"
            INSERT INTO stop_products (stop_id, product_id, quantity, delivered_quantity, spread_requested, is_spread)
            VALUES ($1, $2, $3, 0, $4, false)
            RETURNING {PRODUCT_LINE_COLUMNS}
            "#
        ))
        .bind(stop_id)
        .bind(input.product_id)
        .bind(input.quantity)
        .bind(input.spread_requested)
        .fetch_one(&mut *tx)
        .await?;

        let delivery = refresh_stop(&mut tx, &stop).await?;
        tx.commit().await?;

        tracing::info!(
            stop_id = %stop_id,
            product_line_id = %row.id,
            quantity = input.quantity,
            "Product line added"
        );
        Ok(delivery)
    }

    /// Change a line's quantity or spread request.
    ///
    /// Withdrawing the spread request also clears the spread mark.
    pub async fn update_line(
        &self,
        line_id: Uuid,
        input: UpdateProductLineInput,
    ) -> AppResult<StopDelivery> {
        input.validate()?;

        let mut tx = self.db.begin().await?;
        let (stop, mut line) = lock_line(&mut tx, line_id).await?;

        if let Some(quantity) = input.quantity {
            validate_quantity(Some(line.id), quantity)?;
            line.quantity = quantity;
        }
        if let Some(spread_requested) = input.spread_requested {
            line.spread_requested = spread_requested;
            if !spread_requested {
                line.is_spread = false;
            }
        }
        validate_product_line(&line)?;

        write_line(&mut tx, &line).await?;
        let delivery = refresh_stop(&mut tx, &stop).await?;
        tx.commit().await?;

        tracing::debug!(product_line_id = %line_id, "Product line updated");
        Ok(delivery)
    }

    /// Overwrite how much of a line has been delivered
    pub async fn set_delivered(
        &self,
        line_id: Uuid,
        input: SetDeliveredInput,
    ) -> AppResult<StopDelivery> {
        input.validate()?;

        let mut tx = self.db.begin().await?;
        let (stop, mut line) = lock_line(&mut tx, line_id).await?;

        set_delivered_quantity(&mut line, input.delivered_quantity)?;
        write_line(&mut tx, &line).await?;
        let delivery = refresh_stop(&mut tx, &stop).await?;
        tx.commit().await?;

        tracing::info!(
            product_line_id = %line_id,
            delivered_quantity = input.delivered_quantity,
            status = %delivery.status,
            "Delivered quantity set"
        );
        Ok(delivery)
    }

    /// Add a newly dropped amount to a line
    pub async fn record_delivery(
        &self,
        line_id: Uuid,
        input: RecordDeliveryInput,
    ) -> AppResult<StopDelivery> {
        input.validate()?;

        let mut tx = self.db.begin().await?;
        let (stop, mut line) = lock_line(&mut tx, line_id).await?;

        record_delivery(&mut line, input.amount)?;
        write_line(&mut tx, &line).await?;
        let delivery = refresh_stop(&mut tx, &stop).await?;
        tx.commit().await?;

        tracing::info!(
            product_line_id = %line_id,
            amount = input.amount,
            status = %delivery.status,
            "Delivery recorded"
        );
        Ok(delivery)
    }

    /// Mark one line as spread
    pub async fn mark_line_spread(&self, line_id: Uuid) -> AppResult<StopDelivery> {
        let mut tx = self.db.begin().await?;
        let (stop, mut line) = lock_line(&mut tx, line_id).await?;

        mark_line_spread(&mut line)?;
        write_line(&mut tx, &line).await?;
        let delivery = refresh_stop(&mut tx, &stop).await?;
        tx.commit().await?;

        tracing::info!(product_line_id = %line_id, status = %delivery.status, "Product line spread");
        Ok(delivery)
    }

    /// Deliver every line of a stop in full
    pub async fn mark_all_delivered(&self, stop_id: Uuid) -> AppResult<StopDelivery> {
        let mut tx = self.db.begin().await?;
        let stop = lock_stop(&mut tx, stop_id).await?;
        let mut lines = load_lines(&mut tx, stop_id).await?;

        mark_all_delivered(&mut lines);
        for line in &lines {
            write_line(&mut tx, line).await?;
        }
        let delivery = refresh_stop(&mut tx, &stop).await?;
        tx.commit().await?;

        tracing::info!(
            stop_id = %stop_id,
            lines = lines.len(),
            status = %delivery.status,
            "All product lines delivered"
        );
        Ok(delivery)
    }

    /// Mark every spread-requested line of a stop as spread
    pub async fn mark_all_spread(&self, stop_id: Uuid) -> AppResult<StopDelivery> {
        let mut tx = self.db.begin().await?;
        let stop = lock_stop(&mut tx, stop_id).await?;
        let mut lines = load_lines(&mut tx, stop_id).await?;

        let marked = mark_all_spread(&mut lines)?;
        for line in lines.iter().filter(|l| l.spread_requested) {
            write_line(&mut tx, line).await?;
        }
        let delivery = refresh_stop(&mut tx, &stop).await?;
        tx.commit().await?;

        tracing::info!(stop_id = %stop_id, marked, status = %delivery.status, "Stop spread");
        Ok(delivery)
    }

    /// Remove a line from its stop
    pub async fn remove_line(&self, line_id: Uuid) -> AppResult<StopDelivery> {
        let mut tx = self.db.begin().await?;
        let (stop, _) = lock_line(&mut tx, line_id).await?;

        sqlx::query("DELETE FROM stop_products WHERE id = $1")
            .bind(line_id)
            .execute(&mut *tx)
            .await?;

        let delivery = refresh_stop(&mut tx, &stop).await?;
        tx.commit().await?;

        tracing::info!(product_line_id = %line_id, stop_id = %stop.id, "Product line removed");
        Ok(delivery)
    }
}

/// Lock a stop row for the rest of the transaction
pub(crate) async fn lock_stop(conn: &mut PgConnection, stop_id: Uuid) -> AppResult<Stop> {
    sqlx::query_as::<_, StopRow>(&format!(
        "SELECT {STOP_COLUMNS} FROM stops WHERE id = $1 FOR UPDATE"
    ))
    .bind(stop_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound("Stop".to_string()))?
    .try_into()
}

/// Lock the stop owning a line, then return both
async fn lock_line(conn: &mut PgConnection, line_id: Uuid) -> AppResult<(Stop, ProductLine)> {
    let stop_id = sqlx::query_scalar::<_, Uuid>("SELECT stop_id FROM stop_products WHERE id = $1")
        .bind(line_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Product line".to_string()))?;

    let stop = lock_stop(conn, stop_id).await?;

    // Re-read under the stop lock
    let line = sqlx::query_as::<_, ProductLineRow>(&format!(
        "SELECT {PRODUCT_LINE_COLUMNS} FROM stop_products WHERE id = $1"
    ))
    .bind(line_id)
    .fetch_optional(&mut *conn)
    .await?
    .map(ProductLine::from)
    .ok_or_else(|| AppError::NotFound("Product line".to_string()))?;

    Ok((stop, line))
}

async fn load_lines(conn: &mut PgConnection, stop_id: Uuid) -> AppResult<Vec<ProductLine>> {
    let rows = sqlx::query_as::<_, ProductLineRow>(&format!(
        "SELECT {PRODUCT_LINE_COLUMNS} FROM stop_products WHERE stop_id = $1 ORDER BY created_at"
    ))
    .bind(stop_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(ProductLine::from).collect())
}

async fn write_line(conn: &mut PgConnection, line: &ProductLine) -> AppResult<()> {
    validate_spread_flags(Some(line.id), line.spread_requested, line.is_spread)?;

    sqlx::query(
        r#"
        UPDATE stop_products
        SET quantity = $1, delivered_quantity = $2, spread_requested = $3, is_spread = $4,
            updated_at = NOW()
        WHERE id = $5
        "#,
    )
    .bind(line.quantity)
    .bind(line.delivered_quantity)
    .bind(line.spread_requested)
    .bind(line.is_spread)
    .bind(line.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Re-derive the stop's status from its current lines and persist it
async fn refresh_stop(conn: &mut PgConnection, stop: &Stop) -> AppResult<StopDelivery> {
    let lines = load_lines(conn, stop.id).await?;
    let status = resolve_stop_status(stop.status, &lines);

    if status != stop.status {
        sqlx::query("UPDATE stops SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status.as_str())
            .bind(stop.id)
            .execute(&mut *conn)
            .await?;

        tracing::debug!(
            stop_id = %stop.id,
            from = %stop.status,
            to = %status,
            "Stop status changed"
        );
    }

    let (total_quantity, delivered_quantity) = stop_totals(&lines);
    Ok(StopDelivery {
        stop_id: stop.id,
        status,
        total_quantity,
        delivered_quantity,
        lines,
    })
}
