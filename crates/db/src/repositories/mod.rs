//! Repository structs providing typed database operations.
//!
//! Each repository is a zero-sized struct with async methods that take
//! `&PgPool` as the first argument. Submissions that touch two tables run
//! inside a single transaction.

pub mod final_report_repo;
pub mod midterm_review_repo;
pub mod money_report_repo;
pub mod project_repo;
pub mod user_repo;

pub use final_report_repo::FinalReportRepo;
pub use midterm_review_repo::MidtermReviewRepo;
pub use money_report_repo::MoneyReportRepo;
pub use project_repo::ProjectRepo;
pub use user_repo::UserRepo;
