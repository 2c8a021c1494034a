pub mod analyze;
pub mod extract;

pub use analyze::AnalyzeJobHandler;
pub use extract::ExtractJobHandler;
