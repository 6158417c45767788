//! Column conversions shared by the SeaORM repositories
//!
//! Money is stored as paise, meter readings as signed 64-bit integers.

use rust_decimal::Decimal;
use sea_orm::{DbErr, SqlErr};

use crate::domain::{DomainError, DomainResult, MemberType};
use crate::infrastructure::database::entities::member;
use crate::shared::errors::InfraError;
use crate::shared::money::{from_minor_units, to_minor_units};

pub(super) fn db_err(e: DbErr) -> DomainError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = e.sql_err() {
        return DomainError::Conflict(detail);
    }
    InfraError::from(e).into()
}

pub(super) fn money_to_db(value: Decimal) -> DomainResult<i64> {
    to_minor_units(value)
        .ok_or_else(|| DomainError::Validation(format!("Amount {} is out of range", value)))
}

pub(super) fn money_from_db(paise: i64) -> Decimal {
    from_minor_units(paise)
}

pub(super) fn units_to_db(units: u64) -> DomainResult<i64> {
    i64::try_from(units)
        .map_err(|_| DomainError::Validation(format!("Reading {} is out of range", units)))
}

pub(super) fn units_from_db(units: i64) -> DomainResult<u64> {
    u64::try_from(units)
        .map_err(|_| DomainError::Storage(format!("Negative reading {} in storage", units)))
}

/// Parses an enum stored as its wire label.
pub(super) fn label_from_db<T>(value: &str) -> DomainResult<T>
where
    T: std::str::FromStr<Err = String>,
{
    value.parse().map_err(DomainError::Storage)
}

pub(super) fn member_type_to_entity(t: MemberType) -> member::MemberType {
    match t {
        MemberType::Owner => member::MemberType::Owner,
        MemberType::Rent => member::MemberType::Rent,
    }
}

pub(super) fn member_type_from_entity(t: member::MemberType) -> MemberType {
    match t {
        member::MemberType::Owner => MemberType::Owner,
        member::MemberType::Rent => MemberType::Rent,
    }
}
