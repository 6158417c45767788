//! Member domain entity

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Occupancy type of a member; selects the fixed maintenance tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MemberType {
    #[default]
    Owner,
    Rent,
}

impl std::fmt::Display for MemberType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Owner => write!(f, "OWNER"),
            Self::Rent => write!(f, "RENT"),
        }
    }
}

impl std::str::FromStr for MemberType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OWNER" => Ok(Self::Owner),
            "RENT" | "RENTER" | "TENANT" => Ok(Self::Rent),
            other => Err(format!("unknown member type: {}", other)),
        }
    }
}

/// Billing account for one flat.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub id: i32,
    pub flat_number: String,
    pub name: String,
    pub member_type: MemberType,
    pub mobile: Option<String>,
    pub email: Option<String>,
    /// Cumulative meter reading as of the last finalized invoice
    pub units_used: u64,
    /// Unpaid balance carried into the next invoice
    pub pending_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// The member's billing state, the only part the calculator reads.
    pub fn balance(&self) -> MemberBalance {
        MemberBalance {
            units_used: self.units_used,
            pending_amount: self.pending_amount,
        }
    }

    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        needle.is_empty()
            || self.flat_number.to_lowercase().contains(&needle)
            || self.name.to_lowercase().contains(&needle)
    }
}

/// Meter and balance state of a member between invoices.
///
/// A member with no invoices yet starts from `MemberBalance::default()`
/// (zero units, nothing pending) unless an opening balance was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemberBalance {
    pub units_used: u64,
    pub pending_amount: Decimal,
}

/// Fields accepted when registering a member.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub flat_number: String,
    pub name: String,
    pub member_type: MemberType,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub units_used: u64,
    pub pending_amount: Decimal,
}

/// Outcome of a bulk registration: each entry is inserted independently.
#[derive(Debug, Default)]
pub struct BulkCreateResult {
    pub successful: Vec<Member>,
    pub failed: Vec<BulkCreateFailure>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulkCreateFailure {
    pub flat_number: String,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn member() -> Member {
        Member {
            id: 1,
            flat_number: "A-101".into(),
            name: "John Doe".into(),
            member_type: MemberType::Owner,
            mobile: None,
            email: None,
            units_used: 150,
            pending_amount: dec!(2500),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn member_type_parses_case_insensitively() {
        assert_eq!("owner".parse::<MemberType>(), Ok(MemberType::Owner));
        assert_eq!(" RENT ".parse::<MemberType>(), Ok(MemberType::Rent));
        assert!("landlord".parse::<MemberType>().is_err());
    }

    #[test]
    fn member_type_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&MemberType::Rent).unwrap(), "\"RENT\"");
        assert_eq!(MemberType::Owner.to_string(), "OWNER");
    }

    #[test]
    fn balance_copies_meter_and_pending() {
        let b = member().balance();
        assert_eq!(b.units_used, 150);
        assert_eq!(b.pending_amount, dec!(2500));
    }

    #[test]
    fn search_matches_flat_or_name() {
        let m = member();
        assert!(m.matches_search("a-10"));
        assert!(m.matches_search("DOE"));
        assert!(m.matches_search(""));
        assert!(!m.matches_search("B-2"));
    }

    #[test]
    fn new_member_baseline_is_zero() {
        assert_eq!(
            MemberBalance::default(),
            MemberBalance {
                units_used: 0,
                pending_amount: Decimal::ZERO
            }
        );
    }
}
