//! PostgreSQL-backed rental store
//!
//! Each unit of work is a `READ COMMITTED` transaction. Invariant reads use
//! `SELECT ... FOR UPDATE`, so a competing transaction touching the same user
//! or vehicle waits for this one to finish and then sees its writes.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::{Invoice, Membership, NewInvoice, NewRental, Rental, RentalStatus, Vehicle};
use crate::repositories::{RentalStore, UnitOfWork};
use crate::utils::errors::{AppError, AppResult};

const VEHICLE_COLUMNS: &str = "id, make, model, year, hourly_rate, vip_only, available, created_at";
const RENTAL_COLUMNS: &str =
    "id, user_id, vehicle_id, scheduled_start, scheduled_end, status, overtime_hours";
const INVOICE_COLUMNS: &str =
    "id, rental_id, user_id, billed_hours, overdue_hours, final_cost, paid, created_at";

#[derive(Clone)]
pub struct PgRentalStore {
    pool: PgPool,
}

impl PgRentalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RentalStore for PgRentalStore {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(AppError::Unavailable)?;
        Ok(())
    }

    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let mut tx = self.pool.begin().await.map_err(AppError::Unavailable)?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL READ COMMITTED")
            .execute(&mut *tx)
            .await
            .map_err(AppError::Unavailable)?;

        Ok(Box::new(PgUnitOfWork { tx }))
    }

    async fn find_vehicle(&self, vehicle_id: Uuid) -> AppResult<Option<Vehicle>> {
        sqlx::query_as::<_, Vehicle>(&format!("SELECT {} FROM vehicles WHERE id = $1", VEHICLE_COLUMNS))
            .bind(vehicle_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_statement("finding vehicle", e))
    }

    async fn find_membership(&self, user_id: Uuid) -> AppResult<Option<Membership>> {
        sqlx::query_as::<_, Membership>(
            r#"
            SELECT m.id, m.name, m.discount_pct, m.vip_access
            FROM users u
            JOIN memberships m ON m.id = u.membership_id
            WHERE u.id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_statement("finding membership", e))
    }

    async fn list_available_vehicles(&self, vip_eligible: bool) -> AppResult<Vec<Vehicle>> {
        sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {} FROM vehicles WHERE available = TRUE AND (vip_only = FALSE OR $1) ORDER BY make, model, id",
            VEHICLE_COLUMNS
        ))
        .bind(vip_eligible)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::from_statement("listing available vehicles", e))
    }

    async fn list_rentals(&self, user_id: Uuid) -> AppResult<Vec<Rental>> {
        sqlx::query_as::<_, Rental>(&format!(
            "SELECT {} FROM rentals WHERE user_id = $1 ORDER BY scheduled_start DESC",
            RENTAL_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::from_statement("listing rentals", e))
    }

    async fn list_invoices(&self, user_id: Uuid, unpaid_only: bool) -> AppResult<Vec<Invoice>> {
        sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {} FROM invoices WHERE user_id = $1 AND (paid = FALSE OR NOT $2) ORDER BY created_at DESC",
            INVOICE_COLUMNS
        ))
        .bind(user_id)
        .bind(unpaid_only)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::from_statement("listing invoices", e))
    }
}

/// One open transaction. Dropping it without commit rolls back.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn lock_user(&mut self, user_id: Uuid) -> AppResult<Option<Membership>> {
        sqlx::query_as::<_, Membership>(
            r#"
            SELECT m.id, m.name, m.discount_pct, m.vip_access
            FROM users u
            JOIN memberships m ON m.id = u.membership_id
            WHERE u.id = $1
            FOR UPDATE OF u
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| AppError::from_statement("locking user", e))
    }

    async fn lock_active_rental(&mut self, user_id: Uuid) -> AppResult<Option<Rental>> {
        sqlx::query_as::<_, Rental>(&format!(
            "SELECT {} FROM rentals WHERE user_id = $1 AND status = 'active' FOR UPDATE",
            RENTAL_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| AppError::from_statement("locking active rental", e))
    }

    async fn lock_vehicle(&mut self, vehicle_id: Uuid) -> AppResult<Option<Vehicle>> {
        sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {} FROM vehicles WHERE id = $1 FOR UPDATE",
            VEHICLE_COLUMNS
        ))
        .bind(vehicle_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| AppError::from_statement("locking vehicle", e))
    }

    async fn lock_invoice(&mut self, invoice_id: Uuid, user_id: Uuid) -> AppResult<Option<Invoice>> {
        sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {} FROM invoices WHERE id = $1 AND user_id = $2 FOR UPDATE",
            INVOICE_COLUMNS
        ))
        .bind(invoice_id)
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| AppError::from_statement("locking invoice", e))
    }

    async fn insert_rental(&mut self, rental: NewRental) -> AppResult<Rental> {
        sqlx::query_as::<_, Rental>(&format!(
            r#"
            INSERT INTO rentals (id, user_id, vehicle_id, scheduled_start, scheduled_end, status, overtime_hours)
            VALUES ($1, $2, $3, $4, $5, 'active', 0)
            RETURNING {}
            "#,
            RENTAL_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(rental.user_id)
        .bind(rental.vehicle_id)
        .bind(rental.scheduled_start)
        .bind(rental.scheduled_end)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| AppError::from_statement("creating rental", e))
    }

    async fn update_rental_status(
        &mut self,
        rental_id: Uuid,
        status: RentalStatus,
        overtime_hours: i32,
    ) -> AppResult<Rental> {
        sqlx::query_as::<_, Rental>(&format!(
            "UPDATE rentals SET status = $2, overtime_hours = $3 WHERE id = $1 RETURNING {}",
            RENTAL_COLUMNS
        ))
        .bind(rental_id)
        .bind(status)
        .bind(overtime_hours)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| AppError::from_statement("updating rental status", e))
    }

    async fn update_rental_end(&mut self, rental_id: Uuid, scheduled_end: NaiveDateTime) -> AppResult<Rental> {
        sqlx::query_as::<_, Rental>(&format!(
            "UPDATE rentals SET scheduled_end = $2 WHERE id = $1 RETURNING {}",
            RENTAL_COLUMNS
        ))
        .bind(rental_id)
        .bind(scheduled_end)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| AppError::from_statement("extending rental", e))
    }

    async fn set_vehicle_available(&mut self, vehicle_id: Uuid, available: bool) -> AppResult<()> {
        let result = sqlx::query("UPDATE vehicles SET available = $2 WHERE id = $1")
            .bind(vehicle_id)
            .bind(available)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| AppError::from_statement("updating vehicle availability", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Vehicle with id '{}' not found", vehicle_id)));
        }
        Ok(())
    }

    async fn insert_invoice(&mut self, invoice: NewInvoice) -> AppResult<Invoice> {
        sqlx::query_as::<_, Invoice>(&format!(
            r#"
            INSERT INTO invoices (id, rental_id, user_id, billed_hours, overdue_hours, final_cost, paid, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE, $7)
            RETURNING {}
            "#,
            INVOICE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(invoice.rental_id)
        .bind(invoice.user_id)
        .bind(invoice.billed_hours)
        .bind(invoice.overdue_hours)
        .bind(invoice.final_cost)
        .bind(invoice.created_at)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| AppError::from_statement("creating invoice", e))
    }

    async fn mark_invoice_paid(&mut self, invoice_id: Uuid) -> AppResult<Invoice> {
        sqlx::query_as::<_, Invoice>(&format!(
            "UPDATE invoices SET paid = TRUE WHERE id = $1 RETURNING {}",
            INVOICE_COLUMNS
        ))
        .bind(invoice_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| AppError::from_statement("paying invoice", e))
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await.map_err(AppError::Unavailable)
    }
}
