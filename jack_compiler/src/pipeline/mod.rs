//! Single-file analysis: read, tokenize, parse, render

mod error;
pub mod output;
mod result;
mod validation;

pub use error::PipelineError;
pub use output::{write_outputs, write_outputs_under, OutputPaths};
pub use result::AnalysisResult;
pub use validation::validate_pipeline;

use crate::config::runtime::{LexicalPreferences, RuntimeConfig};
use crate::file_processor::FileProcessor;
use crate::lexical::{LexicalMetrics, Tokenizer};
use crate::logging;
use crate::syntax::{
    render_token_xml, CompilationEngine, ParseNode, ParseResult, ParseSummary, Production,
    SyntaxError, TreeBuilder, XmlWriter,
};
use crate::tokens::Token;
use std::path::Path;
use std::time::Instant;

/// Outputs of parsing one source text
#[derive(Debug, Clone)]
pub struct SourceAnalysis {
    pub parse_xml: String,
    pub token_xml: String,
    pub tree: ParseNode,
    pub lexical_metrics: LexicalMetrics,
    pub parse_summary: ParseSummary,
}

/// Parse `source` once, rendering markup and building the tree together
pub fn analyze_source(
    source: &str,
    preferences: &LexicalPreferences,
) -> ParseResult<SourceAnalysis> {
    let mut tokenizer = Tokenizer::with_preferences(source, preferences.clone());
    let mut writer = XmlWriter::new();
    let mut builder = TreeBuilder::new();

    let parse_summary =
        CompilationEngine::new(&mut tokenizer, (&mut writer, &mut builder)).compile_class()?;

    let tree = builder.finish().ok_or_else(|| SyntaxError::UnexpectedEndOfInput {
        production: Production::Class,
        expected: "'class'".to_string(),
    })?;

    // a successful parse emits every token exactly once, in order
    let tokens: Vec<Token> = tree.tokens().into_iter().cloned().collect();

    Ok(SourceAnalysis {
        parse_xml: writer.finish(),
        token_xml: render_token_xml(&tokens),
        tree,
        lexical_metrics: tokenizer.metrics().clone(),
        parse_summary,
    })
}

/// Analyze one file with the given runtime configuration
pub fn analyze_file(file_path: &Path, config: &RuntimeConfig) -> Result<AnalysisResult, PipelineError> {
    analyze_file_with_id(file_path, 0, config)
}

/// Analyze one file, tagging its log events with `file_id`
pub fn analyze_file_with_id(
    file_path: &Path,
    file_id: usize,
    config: &RuntimeConfig,
) -> Result<AnalysisResult, PipelineError> {
    let start_time = Instant::now();

    logging::with_file_context(file_path.to_path_buf(), file_id, || -> Result<_, PipelineError> {
        crate::log_info!("Starting Jack analysis", "file" => file_path.display());

        let processor = FileProcessor::from_preferences(&config.file_processor);
        let file_result = processor.process_file(file_path)?;
        let analysis = analyze_source(&file_result.source, &config.lexical)?;

        let result = AnalysisResult {
            file_metadata: file_result.metadata,
            parse_xml: analysis.parse_xml,
            token_xml: analysis.token_xml,
            tree: analysis.tree,
            lexical_metrics: analysis.lexical_metrics,
            parse_summary: analysis.parse_summary,
            processing_duration: start_time.elapsed(),
        };

        result.log_success();
        Ok(result)
    })
}

/// Analyze one file and write its outputs
pub fn compile_file(
    file_path: &Path,
    file_id: usize,
    config: &RuntimeConfig,
) -> Result<(AnalysisResult, OutputPaths), PipelineError> {
    compile_file_under(file_path, None, file_id, config)
}

/// Analyze one file found under `root` and write its outputs, mirroring its
/// folder below `root` when an output directory is configured
pub fn compile_file_under(
    file_path: &Path,
    root: Option<&Path>,
    file_id: usize,
    config: &RuntimeConfig,
) -> Result<(AnalysisResult, OutputPaths), PipelineError> {
    let result = analyze_file_with_id(file_path, file_id, config)?;
    let paths = logging::with_file_context(file_path.to_path_buf(), file_id, || {
        write_outputs_under(&result, root, &config.output)
    })?;
    Ok((result, paths))
}
