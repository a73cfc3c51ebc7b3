//! Fleet dashboard

use sqlx::PgPool;

use super::stop::{load_stop_details, StopFilter};
use crate::error::AppResult;
use crate::models::{Truck, TruckRow, TRUCK_COLUMNS};
use shared::{dashboard_stats, DashboardStats};

#[derive(Clone)]
pub struct DashboardService {
    db: PgPool,
}

impl DashboardService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Fleet-wide progress, recomputed from every stop
    pub async fn stats(&self) -> AppResult<DashboardStats> {
        let mut conn = self.db.acquire().await?;

        let route_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM routes")
            .fetch_one(&mut *conn)
            .await?;

        let trucks: Vec<Truck> = sqlx::query_as::<_, TruckRow>(&format!(
            "SELECT {TRUCK_COLUMNS} FROM trucks"
        ))
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(Truck::from)
        .collect();

        let open_problems =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM problems WHERE resolved = false")
                .fetch_one(&mut *conn)
                .await?;

        let stops = load_stop_details(&mut conn, &StopFilter::All).await?;

        let stats = dashboard_stats(
            usize::try_from(route_count).unwrap_or_default(),
            &stops,
            &trucks,
            usize::try_from(open_problems).unwrap_or_default(),
        );

        tracing::debug!(
            total_items = stats.total_items,
            percent_complete = stats.percent_complete,
            "Dashboard computed"
        );
        Ok(stats)
    }
}
