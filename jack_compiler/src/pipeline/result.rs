use crate::file_processor::FileMetadata;
use crate::lexical::LexicalMetrics;
use crate::syntax::{ParseNode, ParseSummary};
use std::time::Duration;

/// Everything produced by analyzing one source file
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub file_metadata: FileMetadata,
    /// Indented parse-tree markup
    pub parse_xml: String,
    /// Flat `<tokens>` markup
    pub token_xml: String,
    pub tree: ParseNode,
    pub lexical_metrics: LexicalMetrics,
    pub parse_summary: ParseSummary,
    pub processing_duration: Duration,
}

impl AnalysisResult {
    pub fn token_count(&self) -> usize {
        self.parse_summary.tokens_consumed
    }

    /// Class name from the source file stem
    pub fn class_name(&self) -> &str {
        self.file_metadata.class_name().unwrap_or("Unknown")
    }

    pub fn log_success(&self) {
        let seconds = self.processing_duration.as_secs_f64().max(f64::EPSILON);
        crate::log_success!(
            crate::logging::codes::success::FILE_PROCESSING_SUCCESS,
            "Jack analysis pipeline succeeded",
            "file" => self.file_metadata.path.display(),
            "class" => self.class_name(),
            "tokens" => self.token_count(),
            "duration_ms" => format!("{:.2}", seconds * 1000.0),
            "tokens_per_sec" => format!("{:.0}", self.token_count() as f64 / seconds)
        );
    }
}
