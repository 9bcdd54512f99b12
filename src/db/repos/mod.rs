mod audit_logs;
mod records;

pub use audit_logs::*;
pub use records::*;
