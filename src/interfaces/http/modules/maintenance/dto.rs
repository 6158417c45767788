//! Maintenance record DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::application::{CollectionChange, InvoiceUpdateRequest};
use crate::domain::{FieldChange, Invoice, InvoiceComputation, InvoiceInput, UpdateHistoryEntry};
use crate::shared::validations::validate_amount;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FieldChangeResponse {
    pub field: String,
    pub old: String,
    pub new: String,
}

impl From<FieldChange> for FieldChangeResponse {
    fn from(c: FieldChange) -> Self {
        Self {
            field: c.field,
            old: c.old,
            new: c.new,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateHistoryResponse {
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
    pub reason: Option<String>,
    pub changes: Vec<FieldChangeResponse>,
}

impl From<UpdateHistoryEntry> for UpdateHistoryResponse {
    fn from(e: UpdateHistoryEntry) -> Self {
        Self {
            updated_at: e.updated_at,
            updated_by: e.updated_by,
            reason: e.reason,
            changes: e.changes.into_iter().map(Into::into).collect(),
        }
    }
}

/// One month's maintenance invoice for a member
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MaintenanceRecordResponse {
    pub id: i32,
    /// Receipt number, e.g. `MNT-000042`
    pub maintenance_no: String,
    pub member_id: i32,
    pub flat_number: String,
    pub member_name: String,
    pub member_type: String,
    pub collection_date: NaiveDate,
    pub previous_unit_used: u64,
    pub new_reading_units: u64,
    pub total_units: u64,
    #[schema(value_type = String)]
    pub water_unit_rate: Decimal,
    #[schema(value_type = String)]
    pub water_maintenance_amount: Decimal,
    #[schema(value_type = String)]
    pub fixed_maintenance_rate: Decimal,
    #[schema(value_type = String)]
    pub fixed_maintenance_amount: Decimal,
    #[schema(value_type = String)]
    pub previous_pending_amount: Decimal,
    #[schema(value_type = String)]
    pub fine_amount: Decimal,
    pub fine_reason: Option<String>,
    #[schema(value_type = String)]
    pub total_maintenance_amount: Decimal,
    #[schema(value_type = String)]
    pub collection_amount: Decimal,
    #[schema(value_type = String)]
    pub pending_amount: Decimal,
    pub currency: String,
    pub update_history: Vec<UpdateHistoryResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MaintenanceRecordResponse {
    pub fn new(invoice: Invoice, prefix: &str, currency: &str) -> Self {
        Self {
            maintenance_no: invoice.maintenance_no(prefix),
            id: invoice.id,
            member_id: invoice.member_id,
            flat_number: invoice.flat_number,
            member_name: invoice.member_name,
            member_type: invoice.member_type.to_string(),
            collection_date: invoice.collection_date,
            previous_unit_used: invoice.previous_unit_used,
            new_reading_units: invoice.new_reading_units,
            total_units: invoice.total_units,
            water_unit_rate: invoice.water_unit_rate,
            water_maintenance_amount: invoice.water_maintenance_amount,
            fixed_maintenance_rate: invoice.fixed_maintenance_rate,
            fixed_maintenance_amount: invoice.fixed_maintenance_amount,
            previous_pending_amount: invoice.previous_pending_amount,
            fine_amount: invoice.fine_amount,
            fine_reason: invoice.fine_reason,
            total_maintenance_amount: invoice.total_maintenance_amount,
            collection_amount: invoice.collection_amount,
            pending_amount: invoice.pending_amount,
            currency: currency.to_string(),
            update_history: invoice
                .update_history
                .into_iter()
                .map(Into::into)
                .collect(),
            created_at: invoice.created_at,
            updated_at: invoice.updated_at,
        }
    }
}

/// Computed charges plus the member state the invoice would leave behind
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvoicePreviewResponse {
    pub member_id: i32,
    pub flat_number: String,
    pub member_type: String,
    pub collection_date: NaiveDate,
    pub previous_unit_used: u64,
    pub new_reading_units: u64,
    pub total_units: u64,
    #[schema(value_type = String)]
    pub water_maintenance_amount: Decimal,
    #[schema(value_type = String)]
    pub fixed_maintenance_amount: Decimal,
    #[schema(value_type = String)]
    pub previous_pending_amount: Decimal,
    #[schema(value_type = String)]
    pub fine_amount: Decimal,
    #[schema(value_type = String)]
    pub total_maintenance_amount: Decimal,
    #[schema(value_type = String)]
    pub collection_amount: Decimal,
    #[schema(value_type = String)]
    pub pending_amount: Decimal,
    pub member_units_after: u64,
    #[schema(value_type = String)]
    pub member_pending_after: Decimal,
    pub currency: String,
}

impl InvoicePreviewResponse {
    pub fn new(computation: InvoiceComputation, currency: &str) -> Self {
        let invoice = computation.invoice;
        Self {
            member_id: invoice.member_id,
            flat_number: invoice.flat_number,
            member_type: invoice.member_type.to_string(),
            collection_date: invoice.collection_date,
            previous_unit_used: invoice.previous_unit_used,
            new_reading_units: invoice.new_reading_units,
            total_units: invoice.total_units,
            water_maintenance_amount: invoice.water_maintenance_amount,
            fixed_maintenance_amount: invoice.fixed_maintenance_amount,
            previous_pending_amount: invoice.previous_pending_amount,
            fine_amount: invoice.fine_amount,
            total_maintenance_amount: invoice.total_maintenance_amount,
            collection_amount: invoice.collection_amount,
            pending_amount: invoice.pending_amount,
            member_units_after: computation.member_update.units_used,
            member_pending_after: computation.member_update.pending_amount,
            currency: currency.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMaintenanceRequest {
    pub member_id: i32,
    /// Cumulative meter reading; must not go below the member's last reading
    #[validate(range(max = 1_000_000_000, message = "new_reading_units is too large"))]
    pub new_reading_units: u64,
    #[serde(default)]
    #[schema(value_type = String, example = "0")]
    #[validate(custom(function = "validate_amount"))]
    pub fine_amount: Decimal,
    #[validate(length(max = 255))]
    pub fine_reason: Option<String>,
    /// Required; send 0 when nothing was collected
    #[schema(value_type = String, example = "600.00")]
    #[validate(custom(function = "validate_amount"))]
    pub collection_amount: Decimal,
    /// Defaults to today (UTC)
    pub collection_date: Option<NaiveDate>,
}

impl CreateMaintenanceRequest {
    pub fn into_input(self, today: NaiveDate) -> (i32, InvoiceInput) {
        (
            self.member_id,
            InvoiceInput {
                new_reading_units: self.new_reading_units,
                fine_amount: self.fine_amount,
                fine_reason: self.fine_reason,
                collection_amount: self.collection_amount,
                collection_date: self.collection_date.unwrap_or(today),
            },
        )
    }
}

fn validate_update(req: &UpdateMaintenanceRequest) -> Result<(), ValidationError> {
    if req.collection_amount.is_some() && req.additional_collection.is_some() {
        let mut err = ValidationError::new("collection_conflict");
        err.message =
            Some("collection_amount and additional_collection are mutually exclusive".into());
        return Err(err);
    }
    if req.new_reading_units.is_none()
        && req.collection_amount.is_none()
        && req.additional_collection.is_none()
    {
        let mut err = ValidationError::new("empty_update");
        err.message = Some(
            "one of new_reading_units, collection_amount or additional_collection is required"
                .into(),
        );
        return Err(err);
    }
    Ok(())
}

/// Amend the member's latest invoice.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_update"))]
pub struct UpdateMaintenanceRequest {
    #[validate(range(max = 1_000_000_000, message = "new_reading_units is too large"))]
    pub new_reading_units: Option<u64>,
    /// Replaces the collected amount
    #[schema(value_type = Option<String>)]
    #[validate(custom(function = "validate_amount"))]
    pub collection_amount: Option<Decimal>,
    /// Added to the collected amount
    #[schema(value_type = Option<String>)]
    #[validate(custom(function = "validate_amount"))]
    pub additional_collection: Option<Decimal>,
    #[validate(length(min = 1, max = 100, message = "updated_by is required"))]
    pub updated_by: String,
    #[validate(length(max = 255))]
    pub reason: Option<String>,
}

impl From<UpdateMaintenanceRequest> for InvoiceUpdateRequest {
    fn from(req: UpdateMaintenanceRequest) -> Self {
        let collection = match (req.collection_amount, req.additional_collection) {
            (Some(amount), _) => CollectionChange::Set(amount),
            (None, Some(extra)) => CollectionChange::Add(extra),
            (None, None) => CollectionChange::Keep,
        };
        Self {
            new_reading_units: req.new_reading_units,
            collection,
            updated_by: req.updated_by,
            reason: req.reason,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MaintenanceListQuery {
    /// Match on flat number, member name or receipt number
    pub search: Option<String>,
    pub member_id: Option<i32>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn update(json: serde_json::Value) -> UpdateMaintenanceRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn collection_fields_are_exclusive() {
        let req = update(serde_json::json!({
            "collection_amount": "100",
            "additional_collection": "50",
            "updated_by": "admin"
        }));
        assert!(req.validate().is_err());
    }

    #[test]
    fn update_needs_a_change() {
        let req = update(serde_json::json!({"updated_by": "admin", "reason": "typo"}));
        assert!(req.validate().is_err());
    }

    #[test]
    fn additional_collection_maps_to_add() {
        let req = update(serde_json::json!({"additional_collection": 250, "updated_by": "admin"}));
        assert!(req.validate().is_ok());
        let request = InvoiceUpdateRequest::from(req);
        assert_eq!(request.collection, CollectionChange::Add(dec!(250)));
        assert!(request.new_reading_units.is_none());
    }

    #[test]
    fn create_defaults_date_and_fine() {
        let req: CreateMaintenanceRequest = serde_json::from_value(serde_json::json!({
            "member_id": 3,
            "new_reading_units": 120,
            "collection_amount": "500"
        }))
        .unwrap();
        assert!(req.validate().is_ok());
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let (member_id, input) = req.into_input(today);
        assert_eq!(member_id, 3);
        assert_eq!(input.collection_date, today);
        assert_eq!(input.fine_amount, Decimal::ZERO);
    }

    #[test]
    fn create_requires_collection_amount() {
        let missing = serde_json::from_value::<CreateMaintenanceRequest>(serde_json::json!({
            "member_id": 1,
            "new_reading_units": 5
        }));
        assert!(missing.is_err());

        let zero: CreateMaintenanceRequest = serde_json::from_value(serde_json::json!({
            "member_id": 1,
            "new_reading_units": 5,
            "collection_amount": 0
        }))
        .unwrap();
        assert_eq!(zero.collection_amount, Decimal::ZERO);
    }

    #[test]
    fn oversized_fine_rejected() {
        let req: CreateMaintenanceRequest = serde_json::from_value(serde_json::json!({
            "member_id": 1,
            "new_reading_units": 5,
            "fine_amount": "1000000000.01",
            "collection_amount": 0
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }
}
