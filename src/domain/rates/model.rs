//! Rate domain entities

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::member::MemberType;

/// Flat monthly maintenance charge by member type.
#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceRate {
    pub id: i32,
    pub owner_rate: Decimal,
    pub rent_rate: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Price per consumed water unit.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterRate {
    pub id: i32,
    pub unit_rate: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Rates in force at the moment an invoice is computed.
///
/// Invoices copy the relevant values, so later rate changes never alter
/// historical invoices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RateSchedule {
    pub water_unit_rate: Decimal,
    pub owner_rate: Decimal,
    pub rent_rate: Decimal,
}

impl RateSchedule {
    pub fn from_rates(maintenance: &MaintenanceRate, water: &WaterRate) -> Self {
        Self {
            water_unit_rate: water.unit_rate,
            owner_rate: maintenance.owner_rate,
            rent_rate: maintenance.rent_rate,
        }
    }

    /// Fixed monthly charge for the given member type.
    pub fn fixed_rate_for(&self, member_type: MemberType) -> Decimal {
        match member_type {
            MemberType::Owner => self.owner_rate,
            MemberType::Rent => self.rent_rate,
        }
    }

    pub fn has_negative_rate(&self) -> bool {
        [self.water_unit_rate, self.owner_rate, self.rent_rate]
            .iter()
            .any(|r| r.is_sign_negative() && !r.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn fixed_rate_follows_member_type() {
        let rates = RateSchedule {
            water_unit_rate: dec!(10),
            owner_rate: dec!(500),
            rent_rate: dec!(300),
        };
        assert_eq!(rates.fixed_rate_for(MemberType::Owner), dec!(500));
        assert_eq!(rates.fixed_rate_for(MemberType::Rent), dec!(300));
    }

    #[test]
    fn schedule_combines_both_rate_records() {
        let now = Utc::now();
        let maintenance = MaintenanceRate {
            id: 1,
            owner_rate: dec!(750),
            rent_rate: dec!(900),
            created_at: now,
            updated_at: now,
        };
        let water = WaterRate {
            id: 1,
            unit_rate: dec!(2.5),
            created_at: now,
            updated_at: now,
        };
        let s = RateSchedule::from_rates(&maintenance, &water);
        assert_eq!(s.water_unit_rate, dec!(2.5));
        assert_eq!(s.owner_rate, dec!(750));
        assert_eq!(s.rent_rate, dec!(900));
        assert!(!s.has_negative_rate());
    }

    #[test]
    fn negative_rate_detected() {
        let s = RateSchedule {
            water_unit_rate: dec!(-1),
            ..Default::default()
        };
        assert!(s.has_negative_rate());
    }
}
