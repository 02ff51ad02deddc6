// src/services/crm_service.rs

use std::collections::BTreeMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ContactRepository, LeadRepository},
    models::{
        contact::{ContactMessage, ContactPayload},
        crm::{
            CreateLeadPayload, Lead, LeadDetail, LeadFilter, LeadSource, LeadStats, LeadStatus, LeadSummary,
            NewLead, Note, Pipeline, UpdateLeadPayload,
        },
    },
    services::{email_domain::EmailDomainCheck, order_service::OrderService},
};

const RECENT_LEADS: i64 = 5;

#[derive(Clone)]
pub struct CrmService {
    lead_repo: LeadRepository,
    contact_repo: ContactRepository,
    order_service: OrderService,
    email_domains: EmailDomainCheck,
    pool: PgPool,
}

impl CrmService {
    pub fn new(
        lead_repo: LeadRepository,
        contact_repo: ContactRepository,
        order_service: OrderService,
        email_domains: EmailDomainCheck,
        pool: PgPool,
    ) -> Self {
        Self { lead_repo, contact_repo, order_service, email_domains, pool }
    }

    // =========================================================================
    //  LEADS
    // =========================================================================

    pub async fn list_leads(&self, filter: LeadFilter) -> Result<Vec<LeadSummary>, AppError> {
        let status = filter
            .status
            .as_deref()
            .map(str::parse::<LeadStatus>)
            .transpose()
            .map_err(|_| AppError::field("status", "in", "The selected status is invalid."))?;

        self.lead_repo.list(status, filter.search.as_deref()).await
    }

    // Manual leads are never deduplicated against existing emails
    pub async fn create_lead(&self, payload: CreateLeadPayload) -> Result<LeadSummary, AppError> {
        let lead = self.lead_repo.create(&self.pool, &NewLead::from(payload)).await?;
        tracing::info!(lead_id = %lead.id, name = %lead.name, "CRM lead created");
        Ok(LeadSummary { lead, notes_count: 0 })
    }

    /// Lead with its notes, the contact message it came from, and every order
    /// placed with the same email.
    pub async fn get_lead(&self, id: Uuid) -> Result<LeadDetail, AppError> {
        let lead = self.find_lead(id).await?;
        let notes = self.lead_repo.list_notes(id).await?;

        let contact_message: Option<ContactMessage> = match lead.contact_message_id {
            Some(message_id) => self.contact_repo.find(message_id).await?,
            None => None,
        };

        let orders = match &lead.email {
            Some(email) => self.order_service.list_for_email(email).await?,
            None => Vec::new(),
        };

        Ok(LeadDetail {
            notes_count: notes.len() as i64,
            lead,
            notes,
            contact_message,
            orders: Some(orders),
        })
    }

    /// Partial update. Moving a lead between pipeline columns is just a
    /// status change here, and any status may follow any other.
    pub async fn update_lead(&self, id: Uuid, payload: UpdateLeadPayload) -> Result<LeadDetail, AppError> {
        let mut lead = self.find_lead(id).await?;
        payload.apply(&mut lead);
        let lead = self.lead_repo.update(&lead).await?;

        tracing::info!(lead_id = %lead.id, status = lead.status.as_str(), "CRM lead updated");

        let notes = self.lead_repo.list_notes(id).await?;
        Ok(LeadDetail {
            notes_count: notes.len() as i64,
            lead,
            notes,
            contact_message: None,
            orders: None,
        })
    }

    pub async fn delete_lead(&self, id: Uuid) -> Result<(), AppError> {
        let lead = self.find_lead(id).await?;
        self.lead_repo.delete(id).await?;
        tracing::info!(lead_id = %lead.id, name = %lead.name, "CRM lead deleted");
        Ok(())
    }

    pub async fn pipeline(&self) -> Result<Pipeline, AppError> {
        let leads = self.lead_repo.list(None, None).await?;
        Ok(Pipeline::from_leads(leads))
    }

    pub async fn stats(&self) -> Result<LeadStats, AppError> {
        let total = self.lead_repo.count().await?;
        let by_status = self.lead_repo.count_by_status().await?;
        let by_source = self.lead_repo.count_by_source().await?;
        let recent_leads = self.lead_repo.recent(RECENT_LEADS).await?;

        Ok(LeadStats {
            total,
            by_status: count_all(&LeadStatus::ALL, by_status),
            by_source: count_all(&[LeadSource::Manual, LeadSource::ContactForm], by_source),
            recent_leads,
        })
    }

    // =========================================================================
    //  NOTES
    // =========================================================================

    pub async fn add_note(&self, lead_id: Uuid, content: &str) -> Result<Note, AppError> {
        self.find_lead(lead_id).await?;
        self.lead_repo.add_note(lead_id, content).await
    }

    /// Deletes the note only when it belongs to `lead_id`.
    pub async fn delete_note(&self, lead_id: Uuid, note_id: Uuid) -> Result<(), AppError> {
        self.find_lead(lead_id).await?;
        let note = self
            .lead_repo
            .find_note(note_id)
            .await?
            .ok_or(AppError::NotFound("Note"))?;

        if note.crm_lead_id != lead_id {
            return Err(AppError::Forbidden("Note does not belong to this lead".into()));
        }

        self.lead_repo.delete_note(note_id).await?;
        Ok(())
    }

    // =========================================================================
    //  CONTACT FORM
    // =========================================================================

    /// Stores the message and always opens a new `contact_form` lead for it,
    /// even when the email already has one. Both rows commit together.
    pub async fn submit_contact(&self, payload: ContactPayload) -> Result<(ContactMessage, Lead), AppError> {
        self.email_domains.verify("email", &payload.email).await?;

        let mut tx = self.pool.begin().await?;

        let contact = self
            .contact_repo
            .create(&mut *tx, &payload.name, &payload.email, &payload.message)
            .await?;

        let lead = self
            .lead_repo
            .create(
                &mut *tx,
                &NewLead {
                    name: contact.name.clone(),
                    email: Some(contact.email.clone()),
                    phone: None,
                    company: None,
                    status: LeadStatus::New,
                    source: LeadSource::ContactForm,
                    contact_message_id: Some(contact.id),
                    service_interest: None,
                    estimated_value: None,
                    message: Some(contact.message.clone()),
                },
            )
            .await?;

        tx.commit().await?;

        tracing::info!(contact_id = %contact.id, lead_id = %lead.id, email = %contact.email, "new contact message received");
        Ok((contact, lead))
    }

    async fn find_lead(&self, id: Uuid) -> Result<Lead, AppError> {
        self.lead_repo.find(id).await?.ok_or(AppError::NotFound("Lead"))
    }
}

// Every key present, zero when the database returned no row for it
fn count_all<K: Ord + Copy>(keys: &[K], rows: Vec<(K, i64)>) -> BTreeMap<K, i64> {
    let mut counts: BTreeMap<K, i64> = keys.iter().map(|k| (*k, 0)).collect();
    counts.extend(rows);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_statuses_count_as_zero() {
        let counts = count_all(&LeadStatus::ALL, vec![(LeadStatus::Won, 2), (LeadStatus::New, 5)]);
        assert_eq!(counts.len(), 5);
        assert_eq!(counts[&LeadStatus::New], 5);
        assert_eq!(counts[&LeadStatus::Won], 2);
        assert_eq!(counts[&LeadStatus::Lost], 0);
    }

    #[test]
    fn stats_keys_serialize_as_wire_names() {
        let counts = count_all(&[LeadSource::Manual, LeadSource::ContactForm], vec![]);
        let json = serde_json::to_value(&counts).unwrap();
        assert_eq!(json, serde_json::json!({ "manual": 0, "contact_form": 0 }));
    }
}
