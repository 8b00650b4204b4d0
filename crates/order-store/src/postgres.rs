use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{Order, OrderId, OrderStatus, OrderStore, Result, StoreError, Version};

const ORDER_COLUMNS: &str = "id, customer_id, event_id, tickets_count, status, created_date, last_updated_date, completed_date, version";

/// PostgreSQL-backed order store implementation.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database at `url` and creates a store on that pool.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPool::connect(url).await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let id: String = row.try_get("id")?;

        let status: String = row.try_get("status")?;
        let status = OrderStatus::parse(&status).ok_or_else(|| StoreError::CorruptRecord {
            order_id: id.clone(),
            reason: format!("unknown status {status:?}"),
        })?;

        let tickets_count: i64 = row.try_get("tickets_count")?;
        let tickets_count =
            u32::try_from(tickets_count).map_err(|_| StoreError::CorruptRecord {
                order_id: id.clone(),
                reason: format!("tickets_count {tickets_count} out of range"),
            })?;

        Ok(Order {
            id: OrderId::new(id),
            customer_id: row.try_get("customer_id")?,
            event_id: row.try_get("event_id")?,
            tickets_count,
            status,
            created_date: row.try_get::<DateTime<Utc>, _>("created_date")?,
            last_updated_date: row.try_get::<DateTime<Utc>, _>("last_updated_date")?,
            completed_date: row.try_get::<Option<DateTime<Utc>>, _>("completed_date")?,
            version: Version::new(row.try_get("version")?),
        })
    }

    /// Tells a lost version race apart from a vanished order.
    async fn write_failure<'e, E>(executor: E, id: &OrderId, expected: Version) -> StoreError
    where
        E: sqlx::PgExecutor<'e>,
    {
        let actual: std::result::Result<Option<i64>, sqlx::Error> =
            sqlx::query_scalar("SELECT version FROM orders WHERE id = $1")
                .bind(id.as_str())
                .fetch_optional(executor)
                .await;

        match actual {
            Ok(Some(actual)) => StoreError::VersionMismatch {
                order_id: id.clone(),
                expected,
                actual: Version::new(actual),
            },
            Ok(None) => StoreError::NotFound(id.clone()),
            Err(e) => StoreError::Database(e),
        }
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn get(&self, id: &OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn list(&self) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY seq ASC"))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn insert(&self, order: Order) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        let retired: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM retired_order_ids WHERE id = $1)")
                .bind(order.id.as_str())
                .fetch_one(&mut *tx)
                .await?;
        if retired {
            return Err(StoreError::Conflict(order.id));
        }

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO orders (id, customer_id, event_id, tickets_count, status, created_date, last_updated_date, completed_date, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO NOTHING
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order.id.as_str())
        .bind(&order.customer_id)
        .bind(&order.event_id)
        .bind(i64::from(order.tickets_count))
        .bind(order.status.as_str())
        .bind(order.created_date)
        .bind(order.last_updated_date)
        .bind(order.completed_date)
        .bind(Version::first().as_i64())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(StoreError::Conflict(order.id));
        };
        let committed = Self::row_to_order(row)?;

        tx.commit().await?;
        Ok(committed)
    }

    async fn update_with_version_check(&self, order: Order, expected: Version) -> Result<Order> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE orders
            SET customer_id = $2,
                event_id = $3,
                tickets_count = $4,
                status = $5,
                last_updated_date = $6,
                completed_date = $7,
                version = version + 1
            WHERE id = $1 AND version = $8
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order.id.as_str())
        .bind(&order.customer_id)
        .bind(&order.event_id)
        .bind(i64::from(order.tickets_count))
        .bind(order.status.as_str())
        .bind(order.last_updated_date)
        .bind(order.completed_date)
        .bind(expected.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_order(row),
            None => Err(Self::write_failure(&self.pool, &order.id, expected).await),
        }
    }

    async fn delete(&self, id: &OrderId, expected: Version) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM orders WHERE id = $1 AND version = $2")
            .bind(id.as_str())
            .bind(expected.as_i64())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(Self::write_failure(&mut *tx, id, expected).await);
        }

        sqlx::query("INSERT INTO retired_order_ids (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(order_id = %id, "order deleted and id retired");
        Ok(())
    }
}
