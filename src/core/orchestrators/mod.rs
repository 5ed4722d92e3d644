mod compliance_monitor;

pub use compliance_monitor::ComplianceMonitor;
