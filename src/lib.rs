pub mod cases;
pub mod client;
pub mod report;
pub mod runner;
pub mod utils;

#[cfg(test)]
mod testing;

// Re-export common items
pub use cases::build_suite;
pub use report::RunReport;
pub use runner::run_suite;
