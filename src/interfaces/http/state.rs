//! Shared handler state

use std::sync::Arc;

use crate::application::{
    BillingService, DashboardService, ExpenseService, MemberService, RateService,
};
use crate::domain::RepositoryProvider;

#[derive(Clone)]
pub struct AppState {
    pub members: Arc<MemberService>,
    pub rates: Arc<RateService>,
    pub billing: Arc<BillingService>,
    pub dashboard: Arc<DashboardService>,
    pub expenses: Arc<ExpenseService>,
    /// ISO code shown next to amounts, e.g. `INR`.
    pub currency: String,
}

impl AppState {
    /// Wire every service over one repository provider. `billing` must be
    /// built over the same provider.
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        billing: BillingService,
        expense_prefix: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            members: Arc::new(MemberService::new(repos.clone())),
            rates: Arc::new(RateService::new(repos.clone())),
            expenses: Arc::new(ExpenseService::new(repos.clone(), expense_prefix)),
            dashboard: Arc::new(DashboardService::new(repos)),
            billing: Arc::new(billing),
            currency: currency.into(),
        }
    }
}
