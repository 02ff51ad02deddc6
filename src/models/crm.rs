// src/models/crm.rs

use std::{collections::BTreeMap, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::serde_utils::{empty_string_as_none, optional_decimal, patch_decimal, patch_string};
use crate::models::{catalog::validate_non_negative, contact::ContactMessage, order::OrderView};

// --- ENUMS ---

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "lead_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Won,
    Lost,
}

impl LeadStatus {
    /// Board column order.
    pub const ALL: [LeadStatus; 5] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::Won,
        LeadStatus::Lost,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Won => "won",
            LeadStatus::Lost => "lost",
        }
    }
}

impl FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LeadStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown lead status: {}", s))
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "lead_source", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    Manual,
    ContactForm,
}

// --- LEADS ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Lead {
    pub id: Uuid,
    #[schema(example = "Karim El Idrissi")]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub status: LeadStatus,
    pub source: LeadSource,
    pub contact_message_id: Option<Uuid>,
    pub service_interest: Option<String>,
    #[schema(value_type = Option<f64>, example = 999.00)]
    pub estimated_value: Option<Decimal>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lead row plus the number of notes attached to it.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LeadSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub lead: Lead,
    pub notes_count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Note {
    pub id: Uuid,
    pub crm_lead_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeadDetail {
    #[serde(flatten)]
    pub lead: Lead,
    pub notes_count: i64,
    pub notes: Vec<Note>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_message: Option<ContactMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orders: Option<Vec<OrderView>>,
}

/// Fields for a lead created by the system from a public submission.
#[derive(Debug, Clone)]
pub struct NewLead {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub status: LeadStatus,
    pub source: LeadSource,
    pub contact_message_id: Option<Uuid>,
    pub service_interest: Option<String>,
    pub estimated_value: Option<Decimal>,
    pub message: Option<String>,
}

// --- PIPELINE ---

/// Every lead in exactly one status column, columns in board order, each
/// column in the order the leads were given (newest first from the repo).
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct Pipeline {
    pub new: Vec<LeadSummary>,
    pub contacted: Vec<LeadSummary>,
    pub qualified: Vec<LeadSummary>,
    pub won: Vec<LeadSummary>,
    pub lost: Vec<LeadSummary>,
}

impl Pipeline {
    pub fn from_leads(leads: impl IntoIterator<Item = LeadSummary>) -> Self {
        let mut pipeline = Pipeline::default();
        for lead in leads {
            pipeline.column_mut(lead.lead.status).push(lead);
        }
        pipeline
    }

    #[cfg(test)]
    fn column(&self, status: LeadStatus) -> &[LeadSummary] {
        match status {
            LeadStatus::New => &self.new,
            LeadStatus::Contacted => &self.contacted,
            LeadStatus::Qualified => &self.qualified,
            LeadStatus::Won => &self.won,
            LeadStatus::Lost => &self.lost,
        }
    }

    fn column_mut(&mut self, status: LeadStatus) -> &mut Vec<LeadSummary> {
        match status {
            LeadStatus::New => &mut self.new,
            LeadStatus::Contacted => &mut self.contacted,
            LeadStatus::Qualified => &mut self.qualified,
            LeadStatus::Won => &mut self.won,
            LeadStatus::Lost => &mut self.lost,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        LeadStatus::ALL.iter().map(|s| self.column(*s).len()).sum()
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeadStats {
    pub total: i64,
    pub by_status: BTreeMap<LeadStatus, i64>,
    pub by_source: BTreeMap<LeadSource, i64>,
    pub recent_leads: Vec<Lead>,
}

// --- PAYLOADS ---

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeadFilter {
    /// One of new, contacted, qualified, won, lost. Blank means any.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub status: Option<String>,
    /// Case-insensitive match on name, email, company or phone.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLeadPayload {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(
        email(message = "Please provide a valid email address"),
        length(max = 255, message = "Email is too long")
    )]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(length(max = 50, message = "Phone number is too long"))]
    pub phone: Option<String>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(length(max = 255, message = "Company is too long"))]
    pub company: Option<String>,

    pub status: Option<LeadStatus>,

    pub source: Option<LeadSource>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(length(max = 255, message = "Service interest is too long"))]
    pub service_interest: Option<String>,

    #[serde(default, deserialize_with = "optional_decimal")]
    #[validate(custom(function = "validate_non_negative"))]
    #[schema(value_type = Option<f64>)]
    pub estimated_value: Option<Decimal>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub message: Option<String>,
}

impl From<CreateLeadPayload> for NewLead {
    fn from(payload: CreateLeadPayload) -> Self {
        Self {
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            company: payload.company,
            status: payload.status.unwrap_or(LeadStatus::New),
            source: payload.source.unwrap_or(LeadSource::Manual),
            contact_message_id: None,
            service_interest: payload.service_interest,
            estimated_value: payload.estimated_value,
            message: payload.message,
        }
    }
}

/// Partial update. Nullable columns take `Some(None)` to be cleared.
/// `source` is fixed at creation.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateLeadPayload {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "patch_string")]
    #[validate(
        email(message = "Please provide a valid email address"),
        length(max = 255, message = "Email is too long")
    )]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,

    #[serde(default, deserialize_with = "patch_string")]
    #[validate(length(max = 50, message = "Phone number is too long"))]
    #[schema(value_type = Option<String>)]
    pub phone: Option<Option<String>>,

    #[serde(default, deserialize_with = "patch_string")]
    #[validate(length(max = 255, message = "Company is too long"))]
    #[schema(value_type = Option<String>)]
    pub company: Option<Option<String>>,

    pub status: Option<LeadStatus>,

    #[serde(default, deserialize_with = "patch_string")]
    #[validate(length(max = 255, message = "Service interest is too long"))]
    #[schema(value_type = Option<String>)]
    pub service_interest: Option<Option<String>>,

    #[serde(default, deserialize_with = "patch_decimal")]
    #[validate(custom(function = "validate_non_negative"))]
    #[schema(value_type = Option<f64>)]
    pub estimated_value: Option<Option<Decimal>>,

    #[serde(default, deserialize_with = "patch_string")]
    #[schema(value_type = Option<String>)]
    pub message: Option<Option<String>>,
}

impl UpdateLeadPayload {
    pub fn apply(self, lead: &mut Lead) {
        if let Some(name) = self.name {
            lead.name = name;
        }
        if let Some(email) = self.email {
            lead.email = email;
        }
        if let Some(phone) = self.phone {
            lead.phone = phone;
        }
        if let Some(company) = self.company {
            lead.company = company;
        }
        if let Some(status) = self.status {
            lead.status = status;
        }
        if let Some(service_interest) = self.service_interest {
            lead.service_interest = service_interest;
        }
        if let Some(estimated_value) = self.estimated_value {
            lead.estimated_value = estimated_value;
        }
        if let Some(message) = self.message {
            lead.message = message;
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateNotePayload {
    #[serde(default)]
    #[validate(length(min = 1, max = 5000, message = "Note content is required (max 5000 characters)"))]
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(name: &str, status: LeadStatus) -> LeadSummary {
        LeadSummary {
            lead: Lead {
                id: Uuid::new_v4(),
                name: name.into(),
                email: Some(format!("{}@example.com", name.to_lowercase())),
                phone: None,
                company: None,
                status,
                source: LeadSource::Manual,
                contact_message_id: None,
                service_interest: None,
                estimated_value: None,
                message: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            notes_count: 0,
        }
    }

    #[test]
    fn pipeline_partitions_every_lead_by_status() {
        let leads = vec![
            lead("A", LeadStatus::Won),
            lead("B", LeadStatus::New),
            lead("C", LeadStatus::Lost),
            lead("D", LeadStatus::New),
            lead("E", LeadStatus::Qualified),
        ];
        let ids: Vec<Uuid> = leads.iter().map(|l| l.lead.id).collect();

        let pipeline = Pipeline::from_leads(leads);

        assert_eq!(pipeline.len(), ids.len());
        for status in LeadStatus::ALL {
            assert!(pipeline.column(status).iter().all(|l| l.lead.status == status));
        }
        for id in ids {
            let hits = LeadStatus::ALL
                .iter()
                .filter(|s| pipeline.column(**s).iter().any(|l| l.lead.id == id))
                .count();
            assert_eq!(hits, 1);
        }
    }

    #[test]
    fn pipeline_keeps_input_order_inside_a_column() {
        let pipeline = Pipeline::from_leads(vec![
            lead("Newest", LeadStatus::New),
            lead("Older", LeadStatus::Contacted),
            lead("Oldest", LeadStatus::New),
        ]);
        let names: Vec<&str> = pipeline.new.iter().map(|l| l.lead.name.as_str()).collect();
        assert_eq!(names, ["Newest", "Oldest"]);
    }

    #[test]
    fn pipeline_serializes_all_five_columns_in_board_order() {
        let json = serde_json::to_string(&Pipeline::default()).unwrap();
        assert_eq!(
            json,
            r#"{"new":[],"contacted":[],"qualified":[],"won":[],"lost":[]}"#
        );
    }

    #[test]
    fn moving_between_any_columns_is_a_plain_status_update() {
        let mut summary = lead("Mover", LeadStatus::Lost);
        let patch: UpdateLeadPayload = serde_json::from_str(r#"{"status":"new"}"#).unwrap();
        patch.apply(&mut summary.lead);
        assert_eq!(summary.lead.status, LeadStatus::New);
        assert!(summary.lead.email.is_some());
    }

    #[test]
    fn update_can_clear_nullable_fields() {
        let mut summary = lead("Clear", LeadStatus::New);
        summary.lead.estimated_value = Some(Decimal::from(100));
        let patch: UpdateLeadPayload =
            serde_json::from_str(r#"{"email":null,"estimated_value":""}"#).unwrap();
        patch.apply(&mut summary.lead);
        assert_eq!(summary.lead.email, None);
        assert_eq!(summary.lead.estimated_value, None);
    }

    #[test]
    fn manual_lead_defaults() {
        let payload: CreateLeadPayload =
            serde_json::from_str(r#"{"name":"Walk-in","estimated_value":""}"#).unwrap();
        assert!(payload.validate().is_ok());
        let new_lead = NewLead::from(payload);
        assert_eq!(new_lead.status, LeadStatus::New);
        assert_eq!(new_lead.source, LeadSource::Manual);
    }

    #[test]
    fn status_filter_parses_known_values_only() {
        assert_eq!("qualified".parse::<LeadStatus>(), Ok(LeadStatus::Qualified));
        assert!("Qualified".parse::<LeadStatus>().is_err());
        assert!("archived".parse::<LeadStatus>().is_err());
    }

    #[test]
    fn summary_serializes_flat_with_notes_count() {
        let mut summary = lead("Flat", LeadStatus::Won);
        summary.notes_count = 3;
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["name"], "Flat");
        assert_eq!(json["status"], "won");
        assert_eq!(json["notes_count"], 3);
    }
}
