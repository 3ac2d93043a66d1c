pub mod audit_log;
pub mod message_store;

pub use audit_log::AuditLog;
pub use message_store::MessageStore;
