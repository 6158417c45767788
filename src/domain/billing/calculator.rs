//! Maintenance billing calculator
//!
//! Water usage × rate + fixed charge + previous pending + fine − collected
//! = new pending. Every function here is pure: no I/O, no clock, no shared
//! state. Callers persist the results atomically (see `BillingLedger`).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::BillingError;
use crate::domain::invoice::{
    FieldChange, Invoice, InvoiceAmendment, InvoiceInput, NewInvoice, UpdateHistoryEntry,
};
use crate::domain::member::{Member, MemberBalance};
use crate::domain::rates::RateSchedule;
use crate::shared::money::round_money;

/// A new invoice plus the member state to write alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceComputation {
    pub invoice: NewInvoice,
    pub member_update: MemberBalance,
}

/// Result of amending an invoice.
///
/// `changes` is empty when the amendment matched the current values; the
/// invoice is then returned as-is, without a history entry.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRevision {
    pub invoice: Invoice,
    pub member_update: Option<MemberBalance>,
    pub changes: Vec<FieldChange>,
}

impl InvoiceRevision {
    pub fn is_unchanged(&self) -> bool {
        self.changes.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct Charges {
    total_units: u64,
    water_amount: Decimal,
    total_due: Decimal,
    pending: Decimal,
}

/// Steps 1-5 of the billing formula, shared by creation and amendment.
fn charge(
    previous_units: u64,
    previous_pending: Decimal,
    water_unit_rate: Decimal,
    fixed_amount: Decimal,
    fine: Decimal,
    new_reading: u64,
    collection: Decimal,
) -> Result<Charges, BillingError> {
    if new_reading < previous_units {
        return Err(BillingError::InvalidReading {
            previous_reading: previous_units,
            new_reading,
        });
    }

    let total_units = new_reading - previous_units;
    let water_amount = Decimal::from(total_units)
        .checked_mul(water_unit_rate)
        .map(round_money)
        .ok_or(BillingError::AmountOverflow)?;
    let total_due = water_amount
        .checked_add(fixed_amount)
        .and_then(|v| v.checked_add(previous_pending))
        .and_then(|v| v.checked_add(fine))
        .map(round_money)
        .ok_or(BillingError::AmountOverflow)?;

    if collection < Decimal::ZERO || collection > total_due {
        return Err(BillingError::InvalidCollection {
            collection,
            total_due,
        });
    }

    let pending = (total_due - collection).max(Decimal::ZERO);

    Ok(Charges {
        total_units,
        water_amount,
        total_due,
        pending,
    })
}

/// Compute a member's next invoice.
///
/// Fails with `InvalidReading` when the meter went backwards and with
/// `InvalidCollection` when more than the total due is collected. A zero
/// collection is valid and leaves the whole total pending. Charges too large
/// for `Decimal` fail with `AmountOverflow`.
pub fn compute_invoice(
    member: &Member,
    rates: &RateSchedule,
    input: &InvoiceInput,
) -> Result<InvoiceComputation, BillingError> {
    let fixed_rate = rates.fixed_rate_for(member.member_type);
    let c = charge(
        member.units_used,
        member.pending_amount,
        rates.water_unit_rate,
        fixed_rate,
        input.fine_amount,
        input.new_reading_units,
        input.collection_amount,
    )?;

    let invoice = NewInvoice {
        member_id: member.id,
        flat_number: member.flat_number.clone(),
        member_name: member.name.clone(),
        member_type: member.member_type,
        collection_date: input.collection_date,
        previous_unit_used: member.units_used,
        new_reading_units: input.new_reading_units,
        total_units: c.total_units,
        water_unit_rate: rates.water_unit_rate,
        water_maintenance_amount: c.water_amount,
        fixed_maintenance_rate: fixed_rate,
        fixed_maintenance_amount: fixed_rate,
        previous_pending_amount: member.pending_amount,
        fine_amount: input.fine_amount,
        fine_reason: input.fine_reason.clone(),
        total_maintenance_amount: c.total_due,
        collection_amount: input.collection_amount,
        pending_amount: c.pending,
    };

    Ok(InvoiceComputation {
        invoice,
        member_update: MemberBalance {
            units_used: input.new_reading_units,
            pending_amount: c.pending,
        },
    })
}

/// Fails with `OrderingViolation` when `newer_invoice` names an invoice of
/// the same member created after `invoice`.
pub fn ensure_latest(invoice: &Invoice, newer_invoice: Option<i32>) -> Result<(), BillingError> {
    match newer_invoice {
        Some(blocking) => Err(BillingError::OrderingViolation {
            invoice_id: invoice.id,
            member_id: invoice.member_id,
            blocking_invoice_id: blocking,
        }),
        None => Ok(()),
    }
}

/// Member state to restore when `invoice` is deleted.
///
/// `newer_invoice` is the caller's lookup of any later invoice for the same
/// member; rolling back past it would corrupt the chain of readings.
pub fn compute_rollback(
    invoice: &Invoice,
    newer_invoice: Option<i32>,
) -> Result<MemberBalance, BillingError> {
    ensure_latest(invoice, newer_invoice)?;
    Ok(MemberBalance {
        units_used: invoice.previous_unit_used,
        pending_amount: invoice.previous_pending_amount,
    })
}

/// Apply an amendment to an existing invoice.
///
/// Recomputes against the invoice's frozen previous reading, rates, fine and
/// previous pending; the rate schedule is not re-read. Every changed field is
/// recorded in one new history entry.
pub fn compute_update(
    invoice: &Invoice,
    amendment: &InvoiceAmendment,
    actor: &str,
    reason: Option<&str>,
    at: DateTime<Utc>,
) -> Result<InvoiceRevision, BillingError> {
    let new_reading = amendment
        .new_reading_units
        .unwrap_or(invoice.new_reading_units);
    let collection = amendment
        .collection_amount
        .unwrap_or(invoice.collection_amount);

    let c = charge(
        invoice.previous_unit_used,
        invoice.previous_pending_amount,
        invoice.water_unit_rate,
        invoice.fixed_maintenance_rate,
        invoice.fine_amount,
        new_reading,
        collection,
    )?;

    let mut changes = Vec::new();
    diff(&mut changes, "new_reading_units", &invoice.new_reading_units, &new_reading);
    diff(&mut changes, "total_units", &invoice.total_units, &c.total_units);
    diff(
        &mut changes,
        "water_maintenance_amount",
        &invoice.water_maintenance_amount,
        &c.water_amount,
    );
    diff(
        &mut changes,
        "total_maintenance_amount",
        &invoice.total_maintenance_amount,
        &c.total_due,
    );
    diff(&mut changes, "collection_amount", &invoice.collection_amount, &collection);
    diff(&mut changes, "pending_amount", &invoice.pending_amount, &c.pending);

    if changes.is_empty() {
        return Ok(InvoiceRevision {
            invoice: invoice.clone(),
            member_update: None,
            changes,
        });
    }

    let member_update = (new_reading != invoice.new_reading_units
        || c.pending != invoice.pending_amount)
        .then_some(MemberBalance {
            units_used: new_reading,
            pending_amount: c.pending,
        });

    let mut revised = invoice.clone();
    revised.new_reading_units = new_reading;
    revised.total_units = c.total_units;
    revised.water_maintenance_amount = c.water_amount;
    revised.fixed_maintenance_amount = invoice.fixed_maintenance_rate;
    revised.total_maintenance_amount = c.total_due;
    revised.collection_amount = collection;
    revised.pending_amount = c.pending;
    revised.updated_at = at;
    revised.update_history.push(UpdateHistoryEntry {
        updated_at: at,
        updated_by: actor.to_string(),
        reason: reason.map(str::to_string),
        changes: changes.clone(),
    });

    Ok(InvoiceRevision {
        invoice: revised,
        member_update,
        changes,
    })
}

fn diff<T: PartialEq + ToString>(changes: &mut Vec<FieldChange>, field: &str, old: &T, new: &T) {
    if old != new {
        changes.push(FieldChange::new(field, old.to_string(), new.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::member::MemberType;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn member(units_used: u64, pending: Decimal, member_type: MemberType) -> Member {
        Member {
            id: 1,
            flat_number: "A-101".into(),
            name: "John Doe".into(),
            member_type,
            mobile: None,
            email: None,
            units_used,
            pending_amount: pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn rates(water: Decimal, owner: Decimal, rent: Decimal) -> RateSchedule {
        RateSchedule {
            water_unit_rate: water,
            owner_rate: owner,
            rent_rate: rent,
        }
    }

    fn input(new_reading: u64, fine: Decimal, collection: Decimal) -> InvoiceInput {
        InvoiceInput {
            new_reading_units: new_reading,
            fine_amount: fine,
            fine_reason: None,
            collection_amount: collection,
            collection_date: NaiveDate::from_ymd_opt(2025, 4, 10).unwrap(),
        }
    }

    fn persisted(c: &InvoiceComputation) -> Invoice {
        Invoice::from_new(11, c.invoice.clone(), Utc::now())
    }

    // ── Creation scenarios ─────────────────────────────────────

    #[test]
    fn scenario_a_full_payment_clears_balance() {
        let m = member(100, dec!(0), MemberType::Owner);
        let r = rates(dec!(10), dec!(500), dec!(0));
        let c = compute_invoice(&m, &r, &input(120, dec!(0), dec!(700))).unwrap();

        assert_eq!(c.invoice.total_units, 20);
        assert_eq!(c.invoice.water_maintenance_amount, dec!(200));
        assert_eq!(c.invoice.total_maintenance_amount, dec!(700));
        assert_eq!(c.invoice.pending_amount, dec!(0));
        assert_eq!(
            c.member_update,
            MemberBalance {
                units_used: 120,
                pending_amount: dec!(0)
            }
        );
    }

    #[test]
    fn scenario_b_partial_payment_rolls_over() {
        let m = member(100, dec!(0), MemberType::Owner);
        let r = rates(dec!(10), dec!(500), dec!(0));
        let c = compute_invoice(&m, &r, &input(120, dec!(0), dec!(300))).unwrap();

        assert_eq!(c.invoice.total_maintenance_amount, dec!(700));
        assert_eq!(c.invoice.pending_amount, dec!(400));
        assert_eq!(c.member_update.pending_amount, dec!(400));
    }

    #[test]
    fn scenario_c_fine_and_previous_pending_without_usage() {
        let m = member(50, dec!(200), MemberType::Rent);
        let r = rates(dec!(5), dec!(0), dec!(300));
        let c = compute_invoice(&m, &r, &input(50, dec!(100), dec!(0))).unwrap();

        assert_eq!(c.invoice.total_units, 0);
        assert_eq!(c.invoice.water_maintenance_amount, dec!(0));
        assert_eq!(c.invoice.fixed_maintenance_amount, dec!(300));
        assert_eq!(c.invoice.total_maintenance_amount, dec!(600));
        assert_eq!(c.invoice.pending_amount, dec!(600));
        assert_eq!(c.member_update.units_used, 50);
    }

    #[test]
    fn scenario_d_meter_regression_rejected() {
        let m = member(50, dec!(0), MemberType::Owner);
        let r = rates(dec!(5), dec!(500), dec!(300));
        let err = compute_invoice(&m, &r, &input(40, dec!(0), dec!(0))).unwrap_err();

        assert_eq!(
            err,
            BillingError::InvalidReading {
                previous_reading: 50,
                new_reading: 40
            }
        );
    }

    #[test]
    fn scenario_e_overpayment_rejected() {
        let m = member(100, dec!(0), MemberType::Owner);
        let r = rates(dec!(10), dec!(500), dec!(0));
        let err = compute_invoice(&m, &r, &input(120, dec!(0), dec!(800))).unwrap_err();

        assert_eq!(
            err,
            BillingError::InvalidCollection {
                collection: dec!(800),
                total_due: dec!(700)
            }
        );
    }

    #[test]
    fn negative_collection_rejected() {
        let m = member(0, dec!(0), MemberType::Owner);
        let r = rates(dec!(1), dec!(100), dec!(0));
        let err = compute_invoice(&m, &r, &input(0, dec!(0), dec!(-1))).unwrap_err();
        assert_eq!(err.kind(), "invalid_collection");
    }

    #[test]
    fn fine_never_changes_units() {
        let m = member(10, dec!(0), MemberType::Owner);
        let r = rates(dec!(2), dec!(100), dec!(0));
        let without = compute_invoice(&m, &r, &input(15, dec!(0), dec!(0))).unwrap();
        let with = compute_invoice(&m, &r, &input(15, dec!(75), dec!(0))).unwrap();

        assert_eq!(without.invoice.total_units, with.invoice.total_units);
        assert_eq!(
            with.invoice.total_maintenance_amount - without.invoice.total_maintenance_amount,
            dec!(75)
        );
    }

    #[test]
    fn fresh_member_starts_from_zero_baseline() {
        let m = member(0, dec!(0), MemberType::Rent);
        let r = rates(dec!(1.5), dec!(500), dec!(300));
        let c = compute_invoice(&m, &r, &input(10, dec!(0), dec!(0))).unwrap();

        assert_eq!(c.invoice.previous_unit_used, 0);
        assert_eq!(c.invoice.previous_pending_amount, dec!(0));
        assert_eq!(c.invoice.water_maintenance_amount, dec!(15));
        assert_eq!(c.invoice.total_maintenance_amount, dec!(315));
    }

    #[test]
    fn rates_are_frozen_onto_invoice() {
        let m = member(0, dec!(0), MemberType::Owner);
        let r = rates(dec!(3.25), dec!(650), dec!(900));
        let c = compute_invoice(&m, &r, &input(4, dec!(0), dec!(0))).unwrap();

        assert_eq!(c.invoice.water_unit_rate, dec!(3.25));
        assert_eq!(c.invoice.fixed_maintenance_rate, dec!(650));
        assert_eq!(c.invoice.water_maintenance_amount, dec!(13));
    }

    #[test]
    fn pending_invariant_holds_across_inputs() {
        let r = rates(dec!(7.5), dec!(450), dec!(600));
        for (units, pending, reading, fine, collected) in [
            (0u64, dec!(0), 0u64, dec!(0), dec!(0)),
            (10, dec!(99.99), 33, dec!(12.5), dec!(100)),
            (500, dec!(1000), 650, dec!(0), dec!(2575)),
            (1, dec!(0.01), 2, dec!(0), dec!(0.01)),
        ] {
            for member_type in [MemberType::Owner, MemberType::Rent] {
                let m = member(units, pending, member_type);
                let c = compute_invoice(&m, &r, &input(reading, fine, collected)).unwrap();
                let inv = persisted(&c);
                assert!(inv.is_consistent(), "{:?}", inv);
                assert_eq!(inv.total_units, reading - units);
            }
        }
    }

    // ── Rollback ───────────────────────────────────────────────

    #[test]
    fn rollback_inverts_creation() {
        let m = member(100, dec!(125.50), MemberType::Owner);
        let r = rates(dec!(10), dec!(500), dec!(0));
        let c = compute_invoice(&m, &r, &input(130, dec!(20), dec!(300))).unwrap();
        let restored = compute_rollback(&persisted(&c), None).unwrap();

        assert_eq!(restored, m.balance());
    }

    #[test]
    fn rollback_blocked_by_newer_invoice() {
        let m = member(100, dec!(0), MemberType::Owner);
        let r = rates(dec!(10), dec!(500), dec!(0));
        let inv = persisted(&compute_invoice(&m, &r, &input(120, dec!(0), dec!(0))).unwrap());
        let err = compute_rollback(&inv, Some(12)).unwrap_err();

        assert_eq!(
            err,
            BillingError::OrderingViolation {
                invoice_id: 11,
                member_id: 1,
                blocking_invoice_id: 12
            }
        );
    }

    // ── Amendment ──────────────────────────────────────────────

    fn base_invoice() -> Invoice {
        let m = member(100, dec!(0), MemberType::Owner);
        let r = rates(dec!(10), dec!(500), dec!(0));
        persisted(&compute_invoice(&m, &r, &input(120, dec!(0), dec!(300))).unwrap())
    }

    #[test]
    fn update_with_current_values_is_noop() {
        let inv = base_invoice();
        let amendment = InvoiceAmendment {
            new_reading_units: Some(120),
            collection_amount: Some(dec!(300.00)),
        };
        let rev = compute_update(&inv, &amendment, "admin", None, Utc::now()).unwrap();

        assert!(rev.is_unchanged());
        assert_eq!(rev.invoice, inv);
        assert!(rev.member_update.is_none());
        assert!(rev.invoice.update_history.is_empty());
    }

    #[test]
    fn empty_amendment_is_noop() {
        let inv = base_invoice();
        let rev =
            compute_update(&inv, &InvoiceAmendment::default(), "admin", None, Utc::now()).unwrap();
        assert!(rev.is_unchanged());
    }

    #[test]
    fn collection_update_recomputes_pending_and_records_history() {
        let inv = base_invoice();
        let at = Utc::now();
        let amendment = InvoiceAmendment {
            collection_amount: Some(dec!(700)),
            ..Default::default()
        };
        let rev = compute_update(&inv, &amendment, "treasurer", Some("cheque cleared"), at).unwrap();

        assert_eq!(rev.invoice.pending_amount, dec!(0));
        assert_eq!(rev.invoice.collection_amount, dec!(700));
        assert!(rev.invoice.is_consistent());
        assert_eq!(
            rev.member_update,
            Some(MemberBalance {
                units_used: 120,
                pending_amount: dec!(0)
            })
        );

        let entry = rev.invoice.update_history.last().unwrap();
        assert_eq!(entry.updated_by, "treasurer");
        assert_eq!(entry.reason.as_deref(), Some("cheque cleared"));
        assert_eq!(entry.updated_at, at);
        let fields: Vec<&str> = entry.changes.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["collection_amount", "pending_amount"]);
        assert_eq!(entry.changes[0].old, "300");
        assert_eq!(entry.changes[0].new, "700");
    }

    #[test]
    fn reading_update_uses_frozen_rates_and_baseline() {
        let inv = base_invoice();
        let amendment = InvoiceAmendment {
            new_reading_units: Some(125),
            ..Default::default()
        };
        let rev = compute_update(&inv, &amendment, "admin", None, Utc::now()).unwrap();

        assert_eq!(rev.invoice.previous_unit_used, 100);
        assert_eq!(rev.invoice.total_units, 25);
        assert_eq!(rev.invoice.water_maintenance_amount, dec!(250));
        assert_eq!(rev.invoice.fixed_maintenance_amount, dec!(500));
        assert_eq!(rev.invoice.total_maintenance_amount, dec!(750));
        assert_eq!(rev.invoice.pending_amount, dec!(450));
        assert_eq!(rev.member_update.map(|b| b.units_used), Some(125));
    }

    #[test]
    fn update_rejects_overpayment() {
        let inv = base_invoice();
        let amendment = InvoiceAmendment {
            collection_amount: Some(dec!(701)),
            ..Default::default()
        };
        let err = compute_update(&inv, &amendment, "admin", None, Utc::now()).unwrap_err();
        assert_eq!(err.kind(), "invalid_collection");
    }

    #[test]
    fn update_rejects_reading_below_previous() {
        let inv = base_invoice();
        let amendment = InvoiceAmendment {
            new_reading_units: Some(99),
            ..Default::default()
        };
        let err = compute_update(&inv, &amendment, "admin", None, Utc::now()).unwrap_err();
        assert_eq!(err.kind(), "invalid_reading");
    }

    #[test]
    fn huge_balance_is_rejected_not_panicking() {
        let m = member(0, Decimal::MAX, MemberType::Owner);
        let r = rates(dec!(1), dec!(1), dec!(1));
        let err = compute_invoice(&m, &r, &input(0, dec!(0), dec!(0))).unwrap_err();
        assert_eq!(err, BillingError::AmountOverflow);
    }

    #[test]
    fn huge_water_charge_is_rejected() {
        let m = member(0, dec!(0), MemberType::Rent);
        let r = rates(Decimal::MAX, dec!(0), dec!(300));
        let err = compute_invoice(&m, &r, &input(2, dec!(0), dec!(0))).unwrap_err();
        assert_eq!(err.kind(), "amount_overflow");
    }

    #[test]
    fn lowering_reading_can_make_collection_invalid() {
        let m = member(100, dec!(0), MemberType::Owner);
        let r = rates(dec!(10), dec!(500), dec!(0));
        let inv = persisted(&compute_invoice(&m, &r, &input(120, dec!(0), dec!(700))).unwrap());
        let amendment = InvoiceAmendment {
            new_reading_units: Some(110),
            ..Default::default()
        };
        let err = compute_update(&inv, &amendment, "admin", None, Utc::now()).unwrap_err();
        assert_eq!(
            err,
            BillingError::InvalidCollection {
                collection: dec!(700),
                total_due: dec!(600)
            }
        );
    }
}
