//! Member aggregate

pub mod model;
pub mod repository;

pub use model::{BulkCreateFailure, BulkCreateResult, Member, MemberBalance, MemberType, NewMember};
pub use repository::MemberRepository;
