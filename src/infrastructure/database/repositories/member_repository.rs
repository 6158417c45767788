//! SeaORM implementation of MemberRepository

use async_trait::async_trait;
use chrono::Utc;
use log::info;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::convert::{
    db_err, member_type_from_entity, member_type_to_entity, money_from_db, money_to_db,
    units_from_db, units_to_db,
};
use crate::domain::member::{Member, MemberRepository, NewMember};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::member;

pub(super) fn entity_to_domain(m: member::Model) -> DomainResult<Member> {
    Ok(Member {
        id: m.id,
        flat_number: m.flat_number,
        name: m.name,
        member_type: member_type_from_entity(m.member_type),
        mobile: m.mobile,
        email: m.email,
        units_used: units_from_db(m.units_used)?,
        pending_amount: money_from_db(m.pending_amount),
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

// ── SeaOrmMemberRepository ──────────────────────────────────────

pub struct SeaOrmMemberRepository {
    db: DatabaseConnection,
}

impl SeaOrmMemberRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MemberRepository for SeaOrmMemberRepository {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Member>> {
        member::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(entity_to_domain)
            .transpose()
    }

    async fn find_by_flat_number(&self, flat_number: &str) -> DomainResult<Option<Member>> {
        member::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(member::Column::FlatNumber)))
                    .eq(flat_number.trim().to_lowercase()),
            )
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(entity_to_domain)
            .transpose()
    }

    async fn find_all(&self) -> DomainResult<Vec<Member>> {
        member::Entity::find()
            .order_by_asc(member::Column::FlatNumber)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(entity_to_domain)
            .collect()
    }

    async fn create(&self, m: NewMember) -> DomainResult<Member> {
        let now = Utc::now();
        let model = member::ActiveModel {
            flat_number: Set(m.flat_number),
            name: Set(m.name),
            member_type: Set(member_type_to_entity(m.member_type)),
            mobile: Set(m.mobile),
            email: Set(m.email),
            units_used: Set(units_to_db(m.units_used)?),
            pending_amount: Set(money_to_db(m.pending_amount)?),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let result = model.insert(&self.db).await.map_err(db_err)?;
        info!("Member saved: {} ({})", result.flat_number, result.id);
        entity_to_domain(result)
    }

    async fn update(&self, m: Member) -> DomainResult<Member> {
        let existing = member::Entity::find_by_id(m.id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let Some(existing) = existing else {
            return Err(DomainError::not_found("Member", "id", m.id));
        };

        let mut model: member::ActiveModel = existing.into();
        model.flat_number = Set(m.flat_number);
        model.name = Set(m.name);
        model.member_type = Set(member_type_to_entity(m.member_type));
        model.mobile = Set(m.mobile);
        model.email = Set(m.email);
        model.units_used = Set(units_to_db(m.units_used)?);
        model.pending_amount = Set(money_to_db(m.pending_amount)?);
        model.updated_at = Set(Utc::now());

        let result = model.update(&self.db).await.map_err(db_err)?;
        info!("Member updated: {} ({})", result.flat_number, result.id);
        entity_to_domain(result)
    }

    async fn delete(&self, id: i32) -> DomainResult<()> {
        let result = member::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Member", "id", id));
        }
        info!("Member deleted: {}", id);
        Ok(())
    }
}
