mod audit_logs;
mod common;
mod records;

pub use audit_logs::SqliteAuditLogRepo;
pub use records::SqliteRecordRepo;
