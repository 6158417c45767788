pub mod dashboard;
pub mod expenses;
pub mod health;
pub mod maintenance;
pub mod members;
pub mod metrics;
pub mod rates;
pub mod request_id;
