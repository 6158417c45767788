//! SeaORM implementations of InvoiceRepository and BillingLedger
//!
//! Ledger writes run inside one database transaction each. The member row
//! is re-read inside the transaction and compared with the caller's
//! snapshot before anything is written.

use async_trait::async_trait;
use chrono::Utc;
use log::info;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::convert::{
    db_err, member_type_from_entity, member_type_to_entity, money_from_db, money_to_db,
    units_from_db, units_to_db,
};
use crate::domain::billing::ensure_latest;
use crate::domain::invoice::{
    BillingLedger, Invoice, InvoiceRepository, NewInvoice, UpdateHistoryEntry,
};
use crate::domain::{DomainError, DomainResult, MemberBalance};
use crate::infrastructure::database::entities::{maintenance_record, member};
use crate::shared::errors::InfraError;

// ── Conversion helpers ──────────────────────────────────────────

fn entity_to_domain(r: maintenance_record::Model) -> DomainResult<Invoice> {
    let update_history: Vec<UpdateHistoryEntry> =
        serde_json::from_str(&r.update_history).map_err(InfraError::from)?;

    Ok(Invoice {
        id: r.id,
        member_id: r.member_id,
        flat_number: r.flat_number,
        member_name: r.member_name,
        member_type: member_type_from_entity(r.member_type),
        collection_date: r.collection_date,
        previous_unit_used: units_from_db(r.previous_unit_used)?,
        new_reading_units: units_from_db(r.new_reading_units)?,
        total_units: units_from_db(r.total_units)?,
        water_unit_rate: money_from_db(r.water_unit_rate),
        water_maintenance_amount: money_from_db(r.water_maintenance_amount),
        fixed_maintenance_rate: money_from_db(r.fixed_maintenance_rate),
        fixed_maintenance_amount: money_from_db(r.fixed_maintenance_amount),
        previous_pending_amount: money_from_db(r.previous_pending_amount),
        fine_amount: money_from_db(r.fine_amount),
        fine_reason: r.fine_reason,
        total_maintenance_amount: money_from_db(r.total_maintenance_amount),
        collection_amount: money_from_db(r.collection_amount),
        pending_amount: money_from_db(r.pending_amount),
        update_history,
        created_at: r.created_at,
        updated_at: r.updated_at,
    })
}

fn new_to_active(inv: NewInvoice) -> DomainResult<maintenance_record::ActiveModel> {
    let now = Utc::now();
    Ok(maintenance_record::ActiveModel {
        member_id: Set(inv.member_id),
        flat_number: Set(inv.flat_number),
        member_name: Set(inv.member_name),
        member_type: Set(member_type_to_entity(inv.member_type)),
        collection_date: Set(inv.collection_date),
        previous_unit_used: Set(units_to_db(inv.previous_unit_used)?),
        new_reading_units: Set(units_to_db(inv.new_reading_units)?),
        total_units: Set(units_to_db(inv.total_units)?),
        water_unit_rate: Set(money_to_db(inv.water_unit_rate)?),
        water_maintenance_amount: Set(money_to_db(inv.water_maintenance_amount)?),
        fixed_maintenance_rate: Set(money_to_db(inv.fixed_maintenance_rate)?),
        fixed_maintenance_amount: Set(money_to_db(inv.fixed_maintenance_amount)?),
        previous_pending_amount: Set(money_to_db(inv.previous_pending_amount)?),
        fine_amount: Set(money_to_db(inv.fine_amount)?),
        fine_reason: Set(inv.fine_reason),
        total_maintenance_amount: Set(money_to_db(inv.total_maintenance_amount)?),
        collection_amount: Set(money_to_db(inv.collection_amount)?),
        pending_amount: Set(money_to_db(inv.pending_amount)?),
        update_history: Set("[]".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    })
}

/// Load the member row inside `conn` and compare it with the snapshot.
async fn locked_member<C: ConnectionTrait>(
    conn: &C,
    member_id: i32,
    expected: MemberBalance,
) -> DomainResult<member::Model> {
    let row = member::Entity::find_by_id(member_id)
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| DomainError::not_found("Member", "id", member_id))?;

    if row.units_used != units_to_db(expected.units_used)?
        || row.pending_amount != money_to_db(expected.pending_amount)?
    {
        return Err(DomainError::Conflict(format!(
            "Member {} changed concurrently (expected units {} / pending {})",
            member_id, expected.units_used, expected.pending_amount
        )));
    }
    Ok(row)
}

async fn set_balance<C: ConnectionTrait>(
    conn: &C,
    row: member::Model,
    balance: MemberBalance,
) -> DomainResult<()> {
    let mut model: member::ActiveModel = row.into();
    model.units_used = Set(units_to_db(balance.units_used)?);
    model.pending_amount = Set(money_to_db(balance.pending_amount)?);
    model.updated_at = Set(Utc::now());
    model.update(conn).await.map_err(db_err)?;
    Ok(())
}

async fn newer_for_member<C: ConnectionTrait>(
    conn: &C,
    member_id: i32,
    invoice_id: i32,
) -> DomainResult<Option<i32>> {
    let id = maintenance_record::Entity::find()
        .select_only()
        .column(maintenance_record::Column::Id)
        .filter(maintenance_record::Column::MemberId.eq(member_id))
        .filter(maintenance_record::Column::Id.gt(invoice_id))
        .order_by_asc(maintenance_record::Column::Id)
        .into_tuple::<i32>()
        .one(conn)
        .await
        .map_err(db_err)?;
    Ok(id)
}

// ── SeaOrmInvoiceRepository ─────────────────────────────────────

pub struct SeaOrmInvoiceRepository {
    db: DatabaseConnection,
}

impl SeaOrmInvoiceRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InvoiceRepository for SeaOrmInvoiceRepository {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Invoice>> {
        maintenance_record::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(entity_to_domain)
            .transpose()
    }

    async fn find_all(&self) -> DomainResult<Vec<Invoice>> {
        maintenance_record::Entity::find()
            .order_by_desc(maintenance_record::Column::CreatedAt)
            .order_by_desc(maintenance_record::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(entity_to_domain)
            .collect()
    }

    async fn find_by_member(&self, member_id: i32) -> DomainResult<Vec<Invoice>> {
        maintenance_record::Entity::find()
            .filter(maintenance_record::Column::MemberId.eq(member_id))
            .order_by_desc(maintenance_record::Column::CreatedAt)
            .order_by_desc(maintenance_record::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(entity_to_domain)
            .collect()
    }

    async fn find_newer_for_member(
        &self,
        member_id: i32,
        invoice_id: i32,
    ) -> DomainResult<Option<i32>> {
        newer_for_member(&self.db, member_id, invoice_id).await
    }

    async fn count_for_member(&self, member_id: i32) -> DomainResult<u64> {
        maintenance_record::Entity::find()
            .filter(maintenance_record::Column::MemberId.eq(member_id))
            .count(&self.db)
            .await
            .map_err(db_err)
    }
}

// ── SeaOrmBillingLedger ─────────────────────────────────────────

pub struct SeaOrmBillingLedger {
    db: DatabaseConnection,
}

impl SeaOrmBillingLedger {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BillingLedger for SeaOrmBillingLedger {
    async fn record(
        &self,
        invoice: NewInvoice,
        expected: MemberBalance,
        update: MemberBalance,
    ) -> DomainResult<Invoice> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let row = locked_member(&txn, invoice.member_id, expected).await?;
        let inserted = new_to_active(invoice)?
            .insert(&txn)
            .await
            .map_err(db_err)?;
        set_balance(&txn, row, update).await?;

        txn.commit().await.map_err(db_err)?;

        info!(
            "Maintenance record saved: {} for member {}",
            inserted.id, inserted.member_id
        );
        entity_to_domain(inserted)
    }

    async fn amend(
        &self,
        invoice: Invoice,
        expected: MemberBalance,
        update: Option<MemberBalance>,
    ) -> DomainResult<Invoice> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let existing = maintenance_record::Entity::find_by_id(invoice.id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Invoice", "id", invoice.id))?;
        ensure_latest(
            &invoice,
            newer_for_member(&txn, invoice.member_id, invoice.id).await?,
        )?;
        let row = locked_member(&txn, invoice.member_id, expected).await?;

        let history = serde_json::to_string(&invoice.update_history).map_err(InfraError::from)?;
        let mut model: maintenance_record::ActiveModel = existing.into();
        model.new_reading_units = Set(units_to_db(invoice.new_reading_units)?);
        model.total_units = Set(units_to_db(invoice.total_units)?);
        model.water_maintenance_amount = Set(money_to_db(invoice.water_maintenance_amount)?);
        model.fixed_maintenance_amount = Set(money_to_db(invoice.fixed_maintenance_amount)?);
        model.total_maintenance_amount = Set(money_to_db(invoice.total_maintenance_amount)?);
        model.collection_amount = Set(money_to_db(invoice.collection_amount)?);
        model.pending_amount = Set(money_to_db(invoice.pending_amount)?);
        model.update_history = Set(history);
        model.updated_at = Set(invoice.updated_at);
        let updated = model.update(&txn).await.map_err(db_err)?;

        if let Some(balance) = update {
            set_balance(&txn, row, balance).await?;
        }

        txn.commit().await.map_err(db_err)?;

        info!("Maintenance record updated: {}", updated.id);
        entity_to_domain(updated)
    }

    async fn remove(
        &self,
        invoice: &Invoice,
        expected: MemberBalance,
        restore: MemberBalance,
    ) -> DomainResult<()> {
        let txn = self.db.begin().await.map_err(db_err)?;

        ensure_latest(
            invoice,
            newer_for_member(&txn, invoice.member_id, invoice.id).await?,
        )?;
        let row = locked_member(&txn, invoice.member_id, expected).await?;

        let result = maintenance_record::Entity::delete_by_id(invoice.id)
            .exec(&txn)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Invoice", "id", invoice.id));
        }
        set_balance(&txn, row, restore).await?;

        txn.commit().await.map_err(db_err)?;

        info!("Maintenance record deleted: {}", invoice.id);
        Ok(())
    }
}
