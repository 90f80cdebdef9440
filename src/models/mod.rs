pub mod audit_logs;
pub mod commission_payments;
pub mod designers;
pub mod dispute_evidence;
pub mod disputes;
pub mod notifications;
pub mod orders;
