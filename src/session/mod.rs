//! The query facade: an analysis session owning its point store, projection and spatial index.

mod analysis;
mod report;

pub use analysis::AnalysisSession;
pub use report::{BenchmarkReport, DistributionAnalysis, SiteAssignment, SiteStats};
