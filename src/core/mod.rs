pub mod debug_logger;
pub mod gate;
pub mod probe;
pub mod report;
pub mod runner;

pub use debug_logger::DebugLogger;
pub use gate::IntegrationGate;
pub use report::ReportRenderer;
pub use runner::{exit_code, Scenario, ScenarioOutcome, ScenarioRunner};
