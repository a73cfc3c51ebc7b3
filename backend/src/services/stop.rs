//! Stop service: stop CRUD, truck assignment and the shared stop read model

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{
    try_convert, AssignedScout, Problem, ProblemRow, Product, ProductLine, ProductLineDetail,
    ProductLineRow, ProductRow, Route, RouteRow, Scout, ScoutRow, Stop, StopDetails, StopRow,
    StopScout, StopScoutRow, StopStatus, PROBLEM_COLUMNS, PRODUCT_COLUMNS, PRODUCT_LINE_COLUMNS,
    ROUTE_COLUMNS, SCOUT_COLUMNS, STOP_COLUMNS,
};
use shared::group_scout_roles;

/// Stop service for managing delivery stops
#[derive(Clone)]
pub struct StopService {
    db: PgPool,
}

/// Which stops a read should return
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopFilter {
    All,
    Route(Uuid),
    Truck(Uuid),
    /// Stops without a truck, optionally limited to one route
    Unassigned { route_id: Option<Uuid> },
    Ids(Vec<Uuid>),
}

/// Query string for listing stops
#[derive(Debug, Default, Deserialize)]
pub struct StopQuery {
    pub route_id: Option<Uuid>,
    pub truck_id: Option<Uuid>,
    #[serde(default)]
    pub unassigned: bool,
}

impl StopQuery {
    pub fn into_filter(self) -> AppResult<StopFilter> {
        match (self.route_id, self.truck_id, self.unassigned) {
            (_, Some(_), true) => Err(AppError::validation(
                "truck_id",
                "truck_id cannot be combined with unassigned",
            )),
            (Some(_), Some(_), false) => Err(AppError::validation(
                "truck_id",
                "filter by either route_id or truck_id",
            )),
            (route_id, None, true) => Ok(StopFilter::Unassigned { route_id }),
            (Some(route_id), None, false) => Ok(StopFilter::Route(route_id)),
            (None, Some(truck_id), false) => Ok(StopFilter::Truck(truck_id)),
            (None, None, false) => Ok(StopFilter::All),
        }
    }
}

/// Input for creating a stop
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStopInput {
    pub route_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub customer_name: String,
    #[validate(length(min = 1, max = 500))]
    pub address: String,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[serde(default)]
    pub paid: bool,
    #[validate(length(max = 2000))]
    pub instructions: Option<String>,
    pub assigned_truck_id: Option<Uuid>,
}

/// Input for updating a stop; absent fields are left unchanged.
///
/// `phone` and `instructions` are cleared by sending an explicit `null`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateStopInput {
    #[validate(length(min = 1, max = 200))]
    pub customer_name: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[validate(length(max = 40))]
    pub phone: Option<Option<String>>,
    pub paid: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    #[validate(length(max = 2000))]
    pub instructions: Option<Option<String>>,
    /// Direct status write, only accepted for stops without product lines
    pub status: Option<StopStatus>,
}

/// Present-but-null becomes `Some(None)`; an absent field stays `None` via `default`
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Blank text clears the field like `null` does
fn clearable(value: Option<Option<String>>, existing: Option<String>) -> Option<String> {
    match value {
        Some(value) => value
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        None => existing,
    }
}

/// Input for assigning a stop to a truck
#[derive(Debug, Deserialize)]
pub struct AssignTruckInput {
    pub truck_id: Uuid,
}

impl StopService {
    /// Create a new StopService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List stops with their product lines, open problems and crew
    pub async fn list_stops(&self, filter: StopFilter) -> AppResult<Vec<StopDetails>> {
        let mut conn = self.db.acquire().await?;
        load_stop_details(&mut conn, &filter).await
    }

    /// Get one stop with its route
    pub async fn get_stop(&self, stop_id: Uuid) -> AppResult<StopDetails> {
        let mut conn = self.db.acquire().await?;
        let details = load_stop_details(&mut conn, &StopFilter::Ids(vec![stop_id]))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Stop".to_string()))?;

        let route = sqlx::query_as::<_, RouteRow>(&format!(
            "SELECT {ROUTE_COLUMNS} FROM routes WHERE id = $1"
        ))
        .bind(details.stop.route_id)
        .fetch_optional(&mut *conn)
        .await?
        .map(Route::from);

        Ok(details.with_route(route))
    }

    /// Create a stop under a route
    pub async fn create_stop(&self, input: CreateStopInput) -> AppResult<Stop> {
        input.validate()?;

        ensure_exists(&self.db, "routes", "Route", input.route_id).await?;
        if let Some(truck_id) = input.assigned_truck_id {
            ensure_exists(&self.db, "trucks", "Truck", truck_id).await?;
        }

        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, StopRow>(&format!(
            r#"
            INSERT INTO stops (route_id, customer_name, address, phone, paid, instructions, assigned_truck_id, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {STOP_COLUMNS}
            "#
        ))
        .bind(input.route_id)
        .bind(input.customer_name.trim())
        .bind(input.address.trim())
        .bind(&input.phone)
        .bind(input.paid)
        .bind(&input.instructions)
        .bind(input.assigned_truck_id)
        .bind(StopStatus::Pending.as_str())
        .fetch_one(&mut *tx)
        .await?;

        if let Some(truck_id) = input.assigned_truck_id {
            link_truck_to_route(&mut *tx, input.route_id, truck_id).await?;
        }

        tx.commit().await?;

        tracing::info!(stop_id = %row.id, route_id = %row.route_id, "Stop created");
        row.try_into()
    }

    /// Update stop fields.
    ///
    /// `status` can only be written directly while the stop has no product
    /// lines; otherwise the status engine owns it.
    pub async fn update_stop(&self, stop_id: Uuid, input: UpdateStopInput) -> AppResult<Stop> {
        input.validate()?;

        let mut tx = self.db.begin().await?;

        let existing: Stop = sqlx::query_as::<_, StopRow>(&format!(
            "SELECT {STOP_COLUMNS} FROM stops WHERE id = $1 FOR UPDATE"
        ))
        .bind(stop_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Stop".to_string()))?
        .try_into()?;

        if let Some(status) = input.status {
            let line_count = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM stop_products WHERE stop_id = $1",
            )
            .bind(stop_id)
            .fetch_one(&mut *tx)
            .await?;

            if line_count > 0 && status != existing.status {
                return Err(AppError::InvalidStateTransition(format!(
                    "status of a stop with product lines is derived from them and cannot be set to {}",
                    status.as_str()
                )));
            }
        }

        let customer_name = input
            .customer_name
            .map(|s| s.trim().to_string())
            .unwrap_or(existing.customer_name);
        let address = input
            .address
            .map(|s| s.trim().to_string())
            .unwrap_or(existing.address);
        let phone = clearable(input.phone, existing.phone);
        let paid = input.paid.unwrap_or(existing.paid);
        let instructions = clearable(input.instructions, existing.instructions);
        let status = input.status.unwrap_or(existing.status);

        let row = sqlx::query_as::<_, StopRow>(&format!(
            r#"
            UPDATE stops
            SET customer_name = $1, address = $2, phone = $3, paid = $4, instructions = $5,
                status = $6, updated_at = NOW()
            WHERE id = $7
            RETURNING {STOP_COLUMNS}
            "#
        ))
        .bind(&customer_name)
        .bind(&address)
        .bind(&phone)
        .bind(paid)
        .bind(&instructions)
        .bind(status.as_str())
        .bind(stop_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(stop_id = %stop_id, status = %status.as_str(), "Stop updated");
        row.try_into()
    }

    /// Assign a stop to a truck and record the truck on the stop's route
    pub async fn assign_truck(&self, stop_id: Uuid, input: AssignTruckInput) -> AppResult<Stop> {
        ensure_exists(&self.db, "trucks", "Truck", input.truck_id).await?;

        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, StopRow>(&format!(
            r#"
            UPDATE stops SET assigned_truck_id = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {STOP_COLUMNS}
            "#
        ))
        .bind(input.truck_id)
        .bind(stop_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Stop".to_string()))?;

        link_truck_to_route(&mut *tx, row.route_id, input.truck_id).await?;

        tx.commit().await?;

        tracing::info!(stop_id = %stop_id, truck_id = %input.truck_id, "Stop assigned to truck");
        row.try_into()
    }

    /// Remove the truck from a stop
    pub async fn unassign_truck(&self, stop_id: Uuid) -> AppResult<Stop> {
        let row = sqlx::query_as::<_, StopRow>(&format!(
            r#"
            UPDATE stops SET assigned_truck_id = NULL, updated_at = NOW()
            WHERE id = $1
            RETURNING {STOP_COLUMNS}
            "#
        ))
        .bind(stop_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stop".to_string()))?;

        tracing::info!(stop_id = %stop_id, "Stop unassigned from truck");
        row.try_into()
    }
}

/// Fail with `NotFound` unless a row with this id exists in `table`
pub(crate) async fn ensure_exists(
    db: &PgPool,
    table: &'static str,
    entity: &str,
    id: Uuid,
) -> AppResult<()> {
    let exists = sqlx::query_scalar::<_, bool>(&format!(
        "SELECT EXISTS(SELECT 1 FROM {table} WHERE id = $1)"
    ))
    .bind(id)
    .fetch_one(db)
    .await?;

    if !exists {
        return Err(AppError::NotFound(entity.to_string()));
    }
    Ok(())
}

/// Record that a truck serves a route, if not already recorded
pub(crate) async fn link_truck_to_route(
    conn: &mut PgConnection,
    route_id: Uuid,
    truck_id: Uuid,
) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO route_trucks (route_id, truck_id) VALUES ($1, $2) ON CONFLICT (route_id, truck_id) DO NOTHING",
    )
    .bind(route_id)
    .bind(truck_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Load stops matching `filter` with product lines (joined to products),
/// unresolved problems and assigned scouts
pub(crate) async fn load_stop_details(
    conn: &mut PgConnection,
    filter: &StopFilter,
) -> AppResult<Vec<StopDetails>> {
    let condition = match filter {
        StopFilter::All => "",
        StopFilter::Route(_) => "WHERE route_id = $1",
        StopFilter::Truck(_) => "WHERE assigned_truck_id = $1",
        StopFilter::Unassigned { route_id: None } => "WHERE assigned_truck_id IS NULL",
        StopFilter::Unassigned { route_id: Some(_) } => {
            "WHERE assigned_truck_id IS NULL AND route_id = $1"
        }
        StopFilter::Ids(_) => "WHERE id = ANY($1)",
    };
    let sql = format!("SELECT {STOP_COLUMNS} FROM stops {condition} ORDER BY customer_name");

    let query = sqlx::query_as::<_, StopRow>(&sql);
    let query = match filter {
        StopFilter::Route(id)
        | StopFilter::Truck(id)
        | StopFilter::Unassigned { route_id: Some(id) } => query.bind(*id),
        StopFilter::Ids(ids) => query.bind(ids.clone()),
        StopFilter::All | StopFilter::Unassigned { route_id: None } => query,
    };

    let stops: Vec<Stop> = try_convert(query.fetch_all(&mut *conn).await?)?;
    if stops.is_empty() {
        return Ok(Vec::new());
    }
    let stop_ids: Vec<Uuid> = stops.iter().map(|s| s.id).collect();

    let lines: Vec<ProductLine> = sqlx::query_as::<_, ProductLineRow>(&format!(
        "SELECT {PRODUCT_LINE_COLUMNS} FROM stop_products WHERE stop_id = ANY($1) ORDER BY created_at"
    ))
    .bind(&stop_ids)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(ProductLine::from)
    .collect();

    let products: HashMap<Uuid, Product> = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products"
    ))
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(|row| (row.id, Product::from(row)))
    .collect();

    let problems: Vec<Problem> = sqlx::query_as::<_, ProblemRow>(&format!(
        "SELECT {PROBLEM_COLUMNS} FROM problems WHERE stop_id = ANY($1) AND resolved = false ORDER BY created_at"
    ))
    .bind(&stop_ids)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(Problem::from)
    .collect();

    let scout_rows: Vec<StopScout> = try_convert(
        sqlx::query_as::<_, StopScoutRow>(
            "SELECT stop_id, scout_id, role FROM stop_scouts WHERE stop_id = ANY($1)",
        )
        .bind(&stop_ids)
        .fetch_all(&mut *conn)
        .await?,
    )?;

    let scouts: Vec<Scout> = if scout_rows.is_empty() {
        Vec::new()
    } else {
        sqlx::query_as::<_, ScoutRow>(&format!("SELECT {SCOUT_COLUMNS} FROM scouts"))
            .fetch_all(&mut *conn)
            .await?
            .into_iter()
            .map(Scout::from)
            .collect()
    };

    let mut lines_by_stop: HashMap<Uuid, Vec<ProductLineDetail>> = HashMap::new();
    for line in lines {
        let product = products.get(&line.product_id).cloned();
        lines_by_stop
            .entry(line.stop_id)
            .or_default()
            .push(ProductLineDetail { line, product });
    }

    let mut problems_by_stop: HashMap<Uuid, Vec<Problem>> = HashMap::new();
    for problem in problems {
        problems_by_stop.entry(problem.stop_id).or_default().push(problem);
    }

    Ok(stops
        .into_iter()
        .map(|stop| {
            let products = lines_by_stop.remove(&stop.id).unwrap_or_default();
            let problems = problems_by_stop.remove(&stop.id).unwrap_or_default();
            let assigned: Vec<AssignedScout> = group_scout_roles(stop.id, &scout_rows, &scouts);
            StopDetails::new(stop, products, problems, assigned)
        })
        .collect())
}
