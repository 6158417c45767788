//! Billing over SeaORM on an in-memory SQLite database.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use society_billing::application::{
    BillingService, CollectionChange, ExpenseFilter, ExpenseService, ExpenseUpdate,
    InvoiceUpdateRequest, MemberService, RateService,
};
use society_billing::domain::{
    BillingError, DomainError, ExpenseCategory, InvoiceInput, MemberType, NewExpense,
    NewMember, PaymentMode, PaymentStatus, RepositoryProvider, VendorType,
};
use society_billing::shared::PaginationParams;
use society_billing::infrastructure::{init_database, run_migrations, DatabaseConfig};
use society_billing::SeaOrmRepositoryProvider;

struct Fixture {
    repos: Arc<dyn RepositoryProvider>,
    billing: Arc<BillingService>,
    members: MemberService,
    member_id: i32,
}

async fn fixture() -> Fixture {
    let db = init_database(&DatabaseConfig {
        url: "sqlite::memory:".into(),
        max_connections: 1,
    })
    .await
    .unwrap();
    run_migrations(&db).await.unwrap();

    let repos: Arc<dyn RepositoryProvider> = Arc::new(SeaOrmRepositoryProvider::new(db));
    let rates = RateService::new(repos.clone());
    rates
        .create_maintenance_rate(dec!(500), dec!(300))
        .await
        .unwrap();
    rates.create_water_rate(dec!(12.345)).await.unwrap();

    let members = MemberService::new(repos.clone());
    let member = members
        .create(NewMember {
            flat_number: "D-404".into(),
            name: "Farah Khan".into(),
            member_type: MemberType::Rent,
            mobile: None,
            email: Some("farah@example.com".into()),
            units_used: 100,
            pending_amount: dec!(50),
        })
        .await
        .unwrap();

    Fixture {
        billing: Arc::new(BillingService::new(repos.clone(), "MNT")),
        repos,
        members,
        member_id: member.id,
    }
}

fn input(reading: u64, collected: Decimal, day: u32) -> InvoiceInput {
    InvoiceInput {
        new_reading_units: reading,
        fine_amount: Decimal::ZERO,
        fine_reason: None,
        collection_amount: collected,
        collection_date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
    }
}

#[tokio::test]
async fn rates_are_stored_at_money_precision() {
    let fx = fixture().await;
    let water = fx.repos.rates().get_water_rate().await.unwrap().unwrap();
    assert_eq!(water.unit_rate, dec!(12.35));
}

#[tokio::test]
async fn create_amend_delete_round_trip_through_sqlite() {
    let fx = fixture().await;

    // 20 units * 12.35 = 247 water, 300 rent, 50 carried: 597 due
    let invoice = fx
        .billing
        .create_invoice(fx.member_id, input(120, dec!(500), 1))
        .await
        .unwrap();
    assert_eq!(invoice.water_maintenance_amount, dec!(247.00));
    assert_eq!(invoice.total_maintenance_amount, dec!(597.00));
    assert_eq!(invoice.pending_amount, dec!(97.00));

    let member = fx.members.get(fx.member_id).await.unwrap();
    assert_eq!(member.units_used, 120);
    assert_eq!(member.pending_amount, dec!(97.00));

    let amended = fx
        .billing
        .update_invoice(
            invoice.id,
            InvoiceUpdateRequest {
                new_reading_units: Some(130),
                collection: CollectionChange::Keep,
                updated_by: "secretary".into(),
                reason: Some("meter re-read".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(amended.total_units, 30);
    assert_eq!(amended.update_history.len(), 1);

    // History survives a reload from the JSON column
    let reloaded = fx.billing.get_invoice(invoice.id).await.unwrap();
    assert_eq!(reloaded.update_history, amended.update_history);
    assert_eq!(reloaded.pending_amount, amended.pending_amount);

    let member = fx.members.get(fx.member_id).await.unwrap();
    assert_eq!(member.units_used, 130);
    assert_eq!(member.pending_amount, amended.pending_amount);

    fx.billing.delete_invoice(invoice.id).await.unwrap();
    let member = fx.members.get(fx.member_id).await.unwrap();
    assert_eq!(member.units_used, 100);
    assert_eq!(member.pending_amount, dec!(50));
    assert!(fx.billing.get_invoice(invoice.id).await.is_err());
}

#[tokio::test]
async fn older_invoice_is_frozen() {
    let fx = fixture().await;
    let first = fx
        .billing
        .create_invoice(fx.member_id, input(110, dec!(0), 1))
        .await
        .unwrap();
    fx.billing
        .create_invoice(fx.member_id, input(120, dec!(0), 2))
        .await
        .unwrap();

    let err = fx.billing.delete_invoice(first.id).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Billing(BillingError::OrderingViolation { .. })
    ));
}

#[tokio::test]
async fn concurrent_creates_keep_the_chain_consistent() {
    let fx = fixture().await;
    let mut tasks = Vec::new();
    for _ in 0..5 {
        let billing = fx.billing.clone();
        let member_id = fx.member_id;
        tasks.push(tokio::spawn(async move {
            billing.create_invoice(member_id, input(100, dec!(0), 10)).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let mut invoices = fx.repos.invoices().find_by_member(fx.member_id).await.unwrap();
    invoices.sort_by_key(|i| i.id);
    assert_eq!(invoices.len(), 5);
    for pair in invoices.windows(2) {
        assert_eq!(pair[1].previous_pending_amount, pair[0].pending_amount);
    }
    // 50 carried + 5 * 300 rent
    let member = fx.members.get(fx.member_id).await.unwrap();
    assert_eq!(member.pending_amount, dec!(1550));
}

#[tokio::test]
async fn member_with_invoices_cannot_be_deleted() {
    let fx = fixture().await;
    fx.billing
        .create_invoice(fx.member_id, input(101, dec!(0), 1))
        .await
        .unwrap();
    assert!(matches!(
        fx.members.delete(fx.member_id).await,
        Err(DomainError::Conflict(_))
    ));
}

#[tokio::test]
async fn duplicate_flat_is_a_conflict() {
    let fx = fixture().await;
    let err = fx
        .repos
        .members()
        .create(NewMember {
            flat_number: "D-404".into(),
            name: "Other".into(),
            member_type: MemberType::Owner,
            mobile: None,
            email: None,
            units_used: 0,
            pending_amount: Decimal::ZERO,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
}

#[tokio::test]
async fn expenses_round_trip_through_sqlite() {
    let f = fixture().await;
    let expenses = ExpenseService::new(f.repos.clone(), "EXP");

    let created = expenses
        .create(NewExpense {
            date_from: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            date_to: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            category: ExpenseCategory::OfficeAdmin,
            description: "Audit fees".into(),
            amount: dec!(7500.255),
            payment_mode: PaymentMode::BankTransfer,
            payment_status: PaymentStatus::Pending,
            vendor_name: "Rao & Co".into(),
            vendor_type: VendorType::Company,
            vendor_contact: Some("rao@example.com".into()),
        })
        .await
        .unwrap();
    assert_eq!(created.amount, dec!(7500.26));

    let stored = f.repos.expenses().find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(stored.category, ExpenseCategory::OfficeAdmin);
    assert_eq!(stored.payment_mode, PaymentMode::BankTransfer);
    assert_eq!(stored.vendor_contact.as_deref(), Some("rao@example.com"));

    let paid = expenses
        .update(
            created.id,
            ExpenseUpdate {
                payment_status: Some(PaymentStatus::Paid),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!paid.is_pending());

    let listed = expenses
        .list(
            &ExpenseFilter {
                status: Some(PaymentStatus::Paid),
                ..Default::default()
            },
            PaginationParams::default(),
        )
        .await
        .unwrap();
    assert_eq!(listed.total, 1);

    expenses.delete(created.id).await.unwrap();
    assert!(matches!(
        expenses.delete(created.id).await,
        Err(DomainError::NotFound { .. })
    ));
}
