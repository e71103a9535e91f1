//! CLI command implementations

pub mod info;
pub mod report;

pub use info::InfoCommand;
pub use report::ReportCommand;
