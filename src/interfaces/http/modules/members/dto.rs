//! Member DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::MemberUpdate;
use crate::domain::member::{BulkCreateFailure, BulkCreateResult};
use crate::domain::{Member, MemberType, NewMember};
use crate::shared::validations::{validate_amount, validate_mobile};

/// Largest meter reading accepted over the API.
pub const MAX_READING: u64 = 1_000_000_000;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MemberResponse {
    pub id: i32,
    pub flat_number: String,
    pub name: String,
    /// `OWNER` or `RENT`
    pub member_type: String,
    pub mobile: Option<String>,
    pub email: Option<String>,
    /// Last billed meter reading
    pub units_used: u64,
    /// Outstanding balance carried into the next invoice
    #[schema(value_type = String, example = "450.00")]
    pub pending_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Member> for MemberResponse {
    fn from(m: Member) -> Self {
        Self {
            id: m.id,
            flat_number: m.flat_number,
            name: m.name,
            member_type: m.member_type.to_string(),
            mobile: m.mobile,
            email: m.email,
            units_used: m.units_used,
            pending_amount: m.pending_amount,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateMemberRequest {
    #[validate(length(min = 1, max = 20, message = "flat_number is required"))]
    pub flat_number: String,
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    /// `OWNER` (default) or `RENT`, case-insensitive
    pub member_type: Option<String>,
    #[validate(custom(function = "validate_mobile"))]
    pub mobile: Option<String>,
    #[validate(email(message = "invalid email"))]
    pub email: Option<String>,
    /// Opening meter reading
    #[serde(default)]
    #[validate(range(max = 1_000_000_000, message = "units_used is too large"))]
    pub units_used: u64,
    /// Opening balance
    #[serde(default)]
    #[schema(value_type = String, example = "0")]
    #[validate(custom(function = "validate_amount"))]
    pub pending_amount: Decimal,
}

pub fn parse_member_type(raw: Option<&str>) -> Result<MemberType, String> {
    match raw {
        None => Ok(MemberType::default()),
        Some(s) => s.parse(),
    }
}

impl CreateMemberRequest {
    pub fn into_new_member(self) -> Result<NewMember, String> {
        Ok(NewMember {
            member_type: parse_member_type(self.member_type.as_deref())?,
            flat_number: self.flat_number,
            name: self.name,
            mobile: self.mobile,
            email: self.email,
            units_used: self.units_used,
            pending_amount: self.pending_amount,
        })
    }
}

/// Entries are checked one by one; a bad entry fails alone.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BulkCreateMembersRequest {
    #[validate(length(min = 1, max = 500, message = "between 1 and 500 members per batch"))]
    pub members: Vec<CreateMemberRequest>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BulkFailureResponse {
    pub flat_number: String,
    pub reason: String,
}

impl From<BulkCreateFailure> for BulkFailureResponse {
    fn from(f: BulkCreateFailure) -> Self {
        Self {
            flat_number: f.flat_number,
            reason: f.reason,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BulkCreateMembersResponse {
    pub successful: Vec<MemberResponse>,
    pub failed: Vec<BulkFailureResponse>,
}

impl From<BulkCreateResult> for BulkCreateMembersResponse {
    fn from(r: BulkCreateResult) -> Self {
        Self {
            successful: r.successful.into_iter().map(Into::into).collect(),
            failed: r.failed.into_iter().map(Into::into).collect(),
        }
    }
}

/// Absent fields are kept. Changing `units_used` or `pending_amount` here
/// is a balance correction outside billing.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateMemberRequest {
    #[validate(length(min = 1, max = 20))]
    pub flat_number: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub member_type: Option<String>,
    #[validate(custom(function = "validate_mobile"))]
    pub mobile: Option<String>,
    #[validate(email(message = "invalid email"))]
    pub email: Option<String>,
    #[validate(range(max = 1_000_000_000))]
    pub units_used: Option<u64>,
    #[schema(value_type = Option<String>)]
    #[validate(custom(function = "validate_amount"))]
    pub pending_amount: Option<Decimal>,
}

impl UpdateMemberRequest {
    pub fn into_update(self) -> Result<MemberUpdate, String> {
        let member_type = match self.member_type.as_deref() {
            Some(raw) => Some(raw.parse::<MemberType>()?),
            None => None,
        };
        Ok(MemberUpdate {
            flat_number: self.flat_number,
            name: self.name,
            member_type,
            mobile: self.mobile,
            email: self.email,
            units_used: self.units_used,
            pending_amount: self.pending_amount,
        })
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MemberListQuery {
    /// Case-insensitive match on flat number or name
    pub search: Option<String>,
    /// 1-based, default 1
    pub page: Option<u32>,
    /// 1..100, default 20
    pub limit: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(json: serde_json::Value) -> CreateMemberRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn defaults_to_owner_with_zero_balance() {
        let req = request(serde_json::json!({"flat_number": "A-1", "name": "Asha"}));
        assert!(req.validate().is_ok());
        let member = req.into_new_member().unwrap();
        assert_eq!(member.member_type, MemberType::Owner);
        assert_eq!(member.units_used, 0);
        assert_eq!(member.pending_amount, Decimal::ZERO);
    }

    #[test]
    fn amounts_accept_numbers_and_strings() {
        let a = request(serde_json::json!({"flat_number": "A-1", "name": "A", "pending_amount": 12.5}));
        let b = request(serde_json::json!({"flat_number": "A-1", "name": "A", "pending_amount": "12.50"}));
        assert_eq!(a.pending_amount, dec!(12.5));
        assert_eq!(b.pending_amount, dec!(12.50));
    }

    #[test]
    fn rejects_bad_contact_details_and_negative_balance() {
        let req = request(serde_json::json!({
            "flat_number": "A-1",
            "name": "A",
            "mobile": "123",
            "email": "nope",
            "pending_amount": "-1"
        }));
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("mobile"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("pending_amount"));
    }

    #[test]
    fn opening_balance_is_capped() {
        let req = request(serde_json::json!({
            "flat_number": "A-1",
            "name": "A",
            "pending_amount": "79228162514264337593543950335"
        }));
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("pending_amount"));
    }

    #[test]
    fn bulk_batch_size_checked() {
        let empty: BulkCreateMembersRequest =
            serde_json::from_value(serde_json::json!({"members": []})).unwrap();
        assert!(empty.validate().is_err());

        let one: BulkCreateMembersRequest = serde_json::from_value(serde_json::json!({
            "members": [{"flat_number": "A-1", "name": "Asha"}]
        }))
        .unwrap();
        assert!(one.validate().is_ok());
    }

    #[test]
    fn unknown_member_type_is_reported() {
        let req = request(serde_json::json!({"flat_number": "A-1", "name": "A", "member_type": "landlord"}));
        assert!(req.into_new_member().is_err());
    }
}
