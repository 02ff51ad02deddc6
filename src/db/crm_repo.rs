// src/db/crm_repo.rs

use sqlx::{Executor, PgConnection, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::crm::{Lead, LeadSource, LeadStatus, LeadSummary, NewLead, Note},
};

const LEAD_COLUMNS: &str = "l.id, l.name, l.email, l.phone, l.company, l.status, l.source, \
                            l.contact_message_id, l.service_interest, l.estimated_value, l.message, \
                            l.created_at, l.updated_at";

const NOTE_COLUMNS: &str = "id, crm_lead_id, content, created_at, updated_at";

#[derive(Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  LEADS
    // =========================================================================

    pub async fn create<'e, E>(&self, executor: E, lead: &NewLead) -> Result<Lead, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, Lead>(&format!(
            "INSERT INTO crm_leads AS l (
                 name, email, phone, company, status, source,
                 contact_message_id, service_interest, estimated_value, message
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {LEAD_COLUMNS}"
        ))
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.phone)
        .bind(&lead.company)
        .bind(lead.status)
        .bind(lead.source)
        .bind(lead.contact_message_id)
        .bind(&lead.service_interest)
        .bind(lead.estimated_value)
        .bind(&lead.message)
        .fetch_one(executor)
        .await?;
        Ok(lead)
    }

    /// Returns the oldest lead carrying `email`, creating `fallback` when there
    /// is none. Existing leads are never modified.
    ///
    /// A transaction-scoped advisory lock on the email serializes concurrent
    /// submissions, so two first-time orders can't both create a lead. The
    /// connection should belong to an open transaction.
    pub async fn find_or_create_by_email(
        &self,
        conn: &mut PgConnection,
        email: &str,
        fallback: &NewLead,
    ) -> Result<Lead, AppError> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(email)
            .execute(&mut *conn)
            .await?;

        let existing = sqlx::query_as::<_, Lead>(&format!(
            "SELECT {LEAD_COLUMNS} FROM crm_leads l
             WHERE l.email = $1
             ORDER BY l.created_at ASC
             LIMIT 1"
        ))
        .bind(email)
        .fetch_optional(&mut *conn)
        .await?;

        match existing {
            Some(lead) => Ok(lead),
            None => self.create(&mut *conn, fallback).await,
        }
    }

    /// Leads newest first with their note counts. `search` is matched
    /// case-insensitively against name, email, company and phone.
    pub async fn list(
        &self,
        status: Option<LeadStatus>,
        search: Option<&str>,
    ) -> Result<Vec<LeadSummary>, AppError> {
        let pattern = search.map(|s| format!("%{}%", escape_like(s)));

        let leads = sqlx::query_as::<_, LeadSummary>(&format!(
            "SELECT {LEAD_COLUMNS},
                    (SELECT COUNT(*) FROM crm_notes n WHERE n.crm_lead_id = l.id) AS notes_count
             FROM crm_leads l
             WHERE ($1::lead_status IS NULL OR l.status = $1)
               AND ($2::text IS NULL
                    OR l.name ILIKE $2
                    OR l.email ILIKE $2
                    OR l.company ILIKE $2
                    OR l.phone ILIKE $2)
             ORDER BY l.created_at DESC"
        ))
        .bind(status)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(leads)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Lead>, AppError> {
        let lead = sqlx::query_as::<_, Lead>(&format!("SELECT {LEAD_COLUMNS} FROM crm_leads l WHERE l.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(lead)
    }

    // Writes back the editable columns; `source` and `contact_message_id` are
    // fixed at creation.
    pub async fn update(&self, lead: &Lead) -> Result<Lead, AppError> {
        sqlx::query_as::<_, Lead>(&format!(
            "UPDATE crm_leads AS l
             SET name = $2, email = $3, phone = $4, company = $5, status = $6,
                 service_interest = $7, estimated_value = $8, message = $9,
                 updated_at = NOW()
             WHERE l.id = $1
             RETURNING {LEAD_COLUMNS}"
        ))
        .bind(lead.id)
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.phone)
        .bind(&lead.company)
        .bind(lead.status)
        .bind(&lead.service_interest)
        .bind(lead.estimated_value)
        .bind(&lead.message)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Lead"))
    }

    // Notes go with the lead (ON DELETE CASCADE)
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM crm_leads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  NOTES
    // =========================================================================

    pub async fn add_note(&self, lead_id: Uuid, content: &str) -> Result<Note, AppError> {
        let note = sqlx::query_as::<_, Note>(&format!(
            "INSERT INTO crm_notes (crm_lead_id, content) VALUES ($1, $2) RETURNING {NOTE_COLUMNS}"
        ))
        .bind(lead_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;
        Ok(note)
    }

    pub async fn find_note(&self, id: Uuid) -> Result<Option<Note>, AppError> {
        let note = sqlx::query_as::<_, Note>(&format!("SELECT {NOTE_COLUMNS} FROM crm_notes WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(note)
    }

    pub async fn list_notes(&self, lead_id: Uuid) -> Result<Vec<Note>, AppError> {
        let notes = sqlx::query_as::<_, Note>(&format!(
            "SELECT {NOTE_COLUMNS} FROM crm_notes
             WHERE crm_lead_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(lead_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(notes)
    }

    pub async fn delete_note(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM crm_notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  STATS
    // =========================================================================

    pub async fn count(&self) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM crm_leads")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    pub async fn count_by_status(&self) -> Result<Vec<(LeadStatus, i64)>, AppError> {
        let rows = sqlx::query_as::<_, (LeadStatus, i64)>(
            "SELECT status, COUNT(*) FROM crm_leads GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn count_by_source(&self) -> Result<Vec<(LeadSource, i64)>, AppError> {
        let rows = sqlx::query_as::<_, (LeadSource, i64)>(
            "SELECT source, COUNT(*) FROM crm_leads GROUP BY source",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<Lead>, AppError> {
        let leads = sqlx::query_as::<_, Lead>(&format!(
            "SELECT {LEAD_COLUMNS} FROM crm_leads l ORDER BY l.created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(leads)
    }
}

// `%` and `_` in user input match literally
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
