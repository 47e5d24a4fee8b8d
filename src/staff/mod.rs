pub mod models;
pub mod password;
pub mod store;

pub use models::{StaffRecord, StaffStatus};
pub use store::{PgStaffStore, StaffListFilter, StaffOrder, StaffPage, StaffStore, StaffSummary};
