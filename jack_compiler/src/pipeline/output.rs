//! Writing analysis results to disk
//!
//! `Foo.jack` produces `Foo.xml`, and optionally `FooT.xml` (tokens) and
//! `Foo.json` (parse tree), next to the source or in the configured
//! output directory.

use super::error::PipelineError;
use super::result::AnalysisResult;
use crate::config::runtime::OutputPreferences;
use crate::logging::codes;
use crate::{log_error, log_success};
use std::fs;
use std::path::{Path, PathBuf};

/// Paths of the files written for one source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub parse_xml: PathBuf,
    pub token_xml: Option<PathBuf>,
    pub json_tree: Option<PathBuf>,
}

impl OutputPaths {
    /// Output locations for `source` without writing anything
    pub fn plan(source: &Path, preferences: &OutputPreferences) -> Self {
        Self::plan_under(source, None, preferences)
    }

    /// Like `plan`, but with an output directory the source's path relative
    /// to `root` is kept, so `root/a/Main.jack` lands in `out/a/Main.xml`
    pub fn plan_under(source: &Path, root: Option<&Path>, preferences: &OutputPreferences) -> Self {
        let stem = source
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("Out");
        let dir = match &preferences.output_dir {
            Some(dir) => {
                let nested = root
                    .and_then(|root| source.parent()?.strip_prefix(root).ok())
                    .unwrap_or_else(|| Path::new(""));
                dir.join(nested)
            }
            None => source
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };

        Self {
            parse_xml: dir.join(format!("{stem}.xml")),
            token_xml: preferences
                .write_token_xml
                .then(|| dir.join(format!("{stem}T.xml"))),
            json_tree: preferences
                .write_json_tree
                .then(|| dir.join(format!("{stem}.json"))),
        }
    }

    pub fn all(&self) -> Vec<&Path> {
        let mut paths = vec![self.parse_xml.as_path()];
        paths.extend(self.token_xml.as_deref());
        paths.extend(self.json_tree.as_deref());
        paths
    }
}

/// Write the outputs selected by `preferences`
pub fn write_outputs(
    result: &AnalysisResult,
    preferences: &OutputPreferences,
) -> Result<OutputPaths, PipelineError> {
    write_outputs_under(result, None, preferences)
}

/// Write outputs laid out relative to `root`; see `OutputPaths::plan_under`
pub fn write_outputs_under(
    result: &AnalysisResult,
    root: Option<&Path>,
    preferences: &OutputPreferences,
) -> Result<OutputPaths, PipelineError> {
    let paths = OutputPaths::plan_under(&result.file_metadata.path, root, preferences);

    if preferences.output_dir.is_some() {
        if let Some(dir) = paths.parse_xml.parent() {
            fs::create_dir_all(dir).map_err(|e| report(dir, &e))?;
        }
    }

    write_file(&paths.parse_xml, &result.parse_xml)?;
    if let Some(path) = &paths.token_xml {
        write_file(path, &result.token_xml)?;
    }
    if let Some(path) = &paths.json_tree {
        write_file(path, &result.tree.to_json()?)?;
    }

    log_success!(
        codes::success::OUTPUT_WRITTEN,
        "Analysis output written",
        "class" => result.class_name(),
        "files" => paths.all().len()
    );

    Ok(paths)
}

fn write_file(path: &Path, contents: &str) -> Result<(), PipelineError> {
    fs::write(path, contents).map_err(|e| report(path, &e))
}

fn report(path: &Path, error: &std::io::Error) -> PipelineError {
    let error = PipelineError::output_error(path, error);
    log_error!(error.error_code(), &error.to_string(), "path" => path.display());
    error
}
