//! Batch compilation of every `.jack` file in a directory
//!
//! Files are discovered up front, sorted, and then compiled either one after
//! another or by a fixed set of scoped worker threads. Each file gets its own
//! tokenizer and engine, so workers share nothing but the work queue and the
//! result list.

use crate::config::compile_time::batch_processing::{MAX_FILES_PER_BATCH, MAX_WORKER_THREADS};
use crate::config::RuntimeConfig;
use crate::file_processor::is_source_file;
use crate::logging::{codes, Code};
use crate::pipeline::{self, OutputPaths, PipelineError};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// BATCH PROCESSING TYPES
// ============================================================================

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub recursive: bool,
    pub max_files: Option<usize>,
    pub progress_reporting: bool,
    pub fail_fast: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_threads: thread::available_parallelism()
                .map(|n| n.get().min(MAX_WORKER_THREADS))
                .unwrap_or(4),
            recursive: true,
            max_files: None,
            progress_reporting: false,
            fail_fast: false,
        }
    }
}

impl BatchConfig {
    /// Worker count after applying the compile-time ceiling
    pub fn effective_threads(&self) -> usize {
        self.max_threads.clamp(1, MAX_WORKER_THREADS)
    }

    /// File limit after applying the compile-time ceiling
    pub fn effective_max_files(&self) -> usize {
        self.max_files
            .unwrap_or(MAX_FILES_PER_BATCH)
            .min(MAX_FILES_PER_BATCH)
    }
}

/// One successfully compiled file
#[derive(Debug, Clone)]
pub struct CompiledFile {
    pub path: PathBuf,
    pub class_name: String,
    pub outputs: OutputPaths,
    pub token_count: usize,
    pub duration: Duration,
}

#[derive(Debug, Default)]
pub struct BatchResults {
    pub successful_files: Vec<CompiledFile>,
    pub failed_files: Vec<(PathBuf, PipelineError)>,
    pub processing_duration: Duration,
    pub files_processed: usize,
    pub files_discovered: usize,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_count(&self) -> usize {
        self.successful_files.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed_files.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed_files.is_empty()
    }

    pub fn success_rate(&self) -> f64 {
        if self.files_processed == 0 {
            0.0
        } else {
            self.success_count() as f64 / self.files_processed as f64
        }
    }

    pub fn add_success(&mut self, file: CompiledFile) {
        self.successful_files.push(file);
        self.files_processed += 1;
    }

    pub fn add_failure(&mut self, file_path: PathBuf, error: PipelineError) {
        self.failed_files.push((file_path, error));
        self.files_processed += 1;
    }

    /// Order results by path so parallel runs report deterministically
    fn sort(&mut self) {
        self.successful_files.sort_by(|a, b| a.path.cmp(&b.path));
        self.failed_files.sort_by(|a, b| a.0.cmp(&b.0));
    }

    pub fn summary(&self) -> String {
        format!(
            "Batch processing completed: {} files processed, {} successful ({:.1}%), {} failed, {:.2}s total",
            self.files_processed,
            self.success_count(),
            self.success_rate() * 100.0,
            self.failure_count(),
            self.processing_duration.as_secs_f64()
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("No .jack files found in directory: {path}")]
    NoFilesFound { path: String },

    #[error("IO error during directory traversal: {error}")]
    IoError { error: String },

    #[error("Worker thread error: {message}")]
    ThreadError { message: String },
}

impl BatchError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::DirectoryNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            Self::NoFilesFound { .. } => codes::file_processing::INVALID_PATH,
            Self::IoError { .. } => codes::file_processing::IO_ERROR,
            Self::ThreadError { .. } => codes::system::INTERNAL_ERROR,
        }
    }
}

// ============================================================================
// FILE DISCOVERY
// ============================================================================

/// Sorted list of `.jack` files under `dir_path`
pub fn discover_jack_files(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<Vec<PathBuf>, BatchError> {
    crate::log_info!("Starting file discovery",
        "directory" => dir_path.display(),
        "recursive" => config.recursive
    );

    if !dir_path.is_dir() {
        return Err(BatchError::DirectoryNotFound {
            path: dir_path.display().to_string(),
        });
    }

    let mut files = Vec::new();
    visit_directory(dir_path, config.recursive, &mut files)?;

    if files.is_empty() {
        return Err(BatchError::NoFilesFound {
            path: dir_path.display().to_string(),
        });
    }

    files.sort();

    let limit = config.effective_max_files();
    if files.len() > limit {
        crate::log_warning!(
            "Reached maximum file limit",
            "files_found" => files.len(),
            "limit" => limit
        );
        files.truncate(limit);
    }

    crate::log_debug!("File discovery completed",
        "files_found" => files.len(),
        "directory" => dir_path.display()
    );

    Ok(files)
}

fn visit_directory(
    dir_path: &Path,
    recursive: bool,
    files: &mut Vec<PathBuf>,
) -> Result<(), BatchError> {
    let entries = fs::read_dir(dir_path).map_err(|e| BatchError::IoError {
        error: format!("{}: {}", dir_path.display(), e),
    })?;

    for entry in entries {
        let path = entry
            .map_err(|e| BatchError::IoError {
                error: e.to_string(),
            })?
            .path();

        if path.is_dir() {
            if recursive {
                visit_directory(&path, recursive, files)?;
            }
        } else if path.is_file() && is_source_file(&path) {
            files.push(path);
        }
    }

    Ok(())
}

// ============================================================================
// BATCH PROCESSING
// ============================================================================

fn compile_one(
    file_path: &Path,
    root: &Path,
    file_id: usize,
    runtime: &RuntimeConfig,
) -> Result<CompiledFile, PipelineError> {
    let (result, outputs) = pipeline::compile_file_under(file_path, Some(root), file_id, runtime)?;
    Ok(CompiledFile {
        path: file_path.to_path_buf(),
        class_name: result.class_name().to_string(),
        outputs,
        token_count: result.token_count(),
        duration: result.processing_duration,
    })
}

/// Compile the given files, found under `root`, on the current thread
pub fn process_files_sequential(
    files: &[PathBuf],
    root: &Path,
    config: &BatchConfig,
    runtime: &RuntimeConfig,
) -> BatchResults {
    let mut results = BatchResults::new();
    results.files_discovered = files.len();

    for (file_id, file_path) in files.iter().enumerate() {
        if config.progress_reporting {
            println!(
                "Processing file {} of {}: {}",
                file_id + 1,
                files.len(),
                file_path.display()
            );
        }

        match compile_one(file_path, root, file_id, runtime) {
            Ok(compiled) => results.add_success(compiled),
            Err(error) => {
                results.add_failure(file_path.clone(), error);
                if config.fail_fast {
                    crate::log_warning!("Fail-fast mode enabled, stopping batch processing");
                    break;
                }
            }
        }
    }

    results
}

/// Compile the given files, found under `root`, with scoped worker threads
/// pulling from a shared index
pub fn process_files_parallel(
    files: &[PathBuf],
    root: &Path,
    config: &BatchConfig,
    runtime: &RuntimeConfig,
) -> Result<BatchResults, BatchError> {
    let threads = config.effective_threads().min(files.len().max(1));
    let next = AtomicUsize::new(0);
    let stop = AtomicBool::new(false);
    let results = Mutex::new(BatchResults::new());

    crate::log_debug!("Parallel processing configuration",
        "total_files" => files.len(),
        "threads" => threads
    );

    let (next, stop, shared) = (&next, &stop, &results);
    let panicked = thread::scope(|scope| {
        let workers: Vec<_> = (0..threads)
            .map(|_| {
                scope.spawn(move || loop {
                    if stop.load(Ordering::Relaxed) {
                        break;
                    }
                    let file_id = next.fetch_add(1, Ordering::Relaxed);
                    let Some(file_path) = files.get(file_id) else {
                        break;
                    };

                    let outcome = compile_one(file_path, root, file_id, runtime);
                    if outcome.is_err() && config.fail_fast {
                        stop.store(true, Ordering::Relaxed);
                    }

                    let mut guard = shared.lock().unwrap_or_else(|e| e.into_inner());
                    match outcome {
                        Ok(compiled) => guard.add_success(compiled),
                        Err(error) => guard.add_failure(file_path.clone(), error),
                    }
                })
            })
            .collect();

        workers
            .into_iter()
            .map(|worker| worker.join())
            .filter(Result::is_err)
            .count()
    });

    if panicked > 0 {
        return Err(BatchError::ThreadError {
            message: format!("{panicked} worker thread(s) panicked during processing"),
        });
    }

    let mut results = results.into_inner().unwrap_or_else(|e| e.into_inner());
    results.files_discovered = files.len();
    results.sort();

    if config.fail_fast && results.has_failures() {
        crate::log_warning!("Fail-fast mode enabled, stopping batch processing");
    }

    Ok(results)
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Discover and compile every `.jack` file under `dir_path`
pub fn process_directory_with_config(
    dir_path: &Path,
    config: &BatchConfig,
    runtime: &RuntimeConfig,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();
    let files = discover_jack_files(dir_path, config)?;

    crate::log_info!("Starting batch processing",
        "directory" => dir_path.display(),
        "files" => files.len(),
        "threads" => config.effective_threads()
    );

    let mut results = if config.effective_threads() == 1 {
        process_files_sequential(&files, dir_path, config, runtime)
    } else {
        process_files_parallel(&files, dir_path, config, runtime)?
    };
    results.processing_duration = start_time.elapsed();

    crate::log_success!(
        codes::success::BATCH_COMPLETE,
        "Batch processing completed",
        "files_processed" => results.files_processed,
        "successful" => results.success_count(),
        "failed" => results.failure_count(),
        "duration_ms" => format!("{:.2}", results.processing_duration.as_secs_f64() * 1000.0)
    );

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_class(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(format!("{name}.jack"));
        fs::write(&path, format!("class {name} {{ {body} }}\n")).unwrap();
        path
    }

    fn runtime() -> RuntimeConfig {
        let mut runtime = RuntimeConfig::default();
        runtime.output.output_dir = None;
        runtime.output.write_token_xml = true;
        runtime.output.write_json_tree = false;
        runtime
    }

    #[test]
    fn test_file_discovery() {
        let temp_dir = tempdir().unwrap();
        let nested = temp_dir.path().join("nested");
        fs::create_dir(&nested).unwrap();

        write_class(temp_dir.path(), "B", "");
        write_class(temp_dir.path(), "A", "");
        write_class(&nested, "C", "");
        fs::write(temp_dir.path().join("notes.txt"), "not jack").unwrap();

        let files = discover_jack_files(temp_dir.path(), &BatchConfig::default()).unwrap();
        assert_eq!(files.len(), 3);
        assert!(files.windows(2).all(|w| w[0] <= w[1]));

        let flat = BatchConfig {
            recursive: false,
            ..BatchConfig::default()
        };
        assert_eq!(discover_jack_files(temp_dir.path(), &flat).unwrap().len(), 2);

        let limited = BatchConfig {
            max_files: Some(1),
            ..BatchConfig::default()
        };
        assert_eq!(discover_jack_files(temp_dir.path(), &limited).unwrap().len(), 1);
    }

    #[test]
    fn test_discovery_errors() {
        let temp_dir = tempdir().unwrap();
        let config = BatchConfig::default();

        assert!(matches!(
            discover_jack_files(temp_dir.path(), &config),
            Err(BatchError::NoFilesFound { .. })
        ));
        assert!(matches!(
            discover_jack_files(&temp_dir.path().join("missing"), &config),
            Err(BatchError::DirectoryNotFound { .. })
        ));
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let temp_dir = tempdir().unwrap();
        for name in ["Alpha", "Beta", "Gamma", "Delta"] {
            write_class(temp_dir.path(), name, "field int x;");
        }
        write_class(temp_dir.path(), "Broken", "field int");

        let sequential = BatchConfig {
            max_threads: 1,
            ..BatchConfig::default()
        };
        let parallel = BatchConfig {
            max_threads: 3,
            ..BatchConfig::default()
        };

        let a = process_directory_with_config(temp_dir.path(), &sequential, &runtime()).unwrap();
        let b = process_directory_with_config(temp_dir.path(), &parallel, &runtime()).unwrap();

        for results in [&a, &b] {
            assert_eq!(results.files_discovered, 5);
            assert_eq!(results.success_count(), 4);
            assert_eq!(results.failure_count(), 1);
            assert!(results.failed_files[0].0.ends_with("Broken.jack"));
        }

        let names: Vec<&str> = b.successful_files.iter().map(|f| f.class_name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta", "Delta", "Gamma"]);
        assert!(temp_dir.path().join("AlphaT.xml").exists());
        assert!(!temp_dir.path().join("Broken.xml").exists());
    }

    #[test]
    fn test_fail_fast_sequential() {
        let temp_dir = tempdir().unwrap();
        write_class(temp_dir.path(), "A", "static");
        write_class(temp_dir.path(), "B", "");

        let config = BatchConfig {
            max_threads: 1,
            fail_fast: true,
            ..BatchConfig::default()
        };
        let results = process_directory_with_config(temp_dir.path(), &config, &runtime()).unwrap();

        assert_eq!(results.files_processed, 1);
        assert!(results.has_failures());
    }

    #[test]
    fn test_batch_results_accounting() {
        let mut results = BatchResults::new();
        assert_eq!(results.success_rate(), 0.0);

        results.add_failure(
            PathBuf::from("X.jack"),
            PipelineError::Output {
                path: "X.xml".to_string(),
                message: "denied".to_string(),
            },
        );
        assert_eq!(results.files_processed, 1);
        assert_eq!(results.success_rate(), 0.0);
        assert!(results.summary().contains("1 failed"));
    }

    #[test]
    fn test_same_named_files_keep_separate_outputs() {
        let temp_dir = tempdir().unwrap();
        let out_dir = tempdir().unwrap();
        for (folder, field) in [("Square", "size"), ("Pong", "ball")] {
            let dir = temp_dir.path().join(folder);
            fs::create_dir(&dir).unwrap();
            fs::write(
                dir.join("Main.jack"),
                format!("class Main {{ field int {field}; }}\n"),
            )
            .unwrap();
        }

        let mut runtime = runtime();
        runtime.output.output_dir = Some(out_dir.path().to_path_buf());

        for threads in [1, 2] {
            let config = BatchConfig {
                max_threads: threads,
                ..BatchConfig::default()
            };
            let results =
                process_directory_with_config(temp_dir.path(), &config, &runtime).unwrap();
            assert_eq!(results.success_count(), 2);

            let square = out_dir.path().join("Square").join("Main.xml");
            let pong = out_dir.path().join("Pong").join("Main.xml");
            assert!(fs::read_to_string(&square).unwrap().contains("<identifier> size </identifier>"));
            assert!(fs::read_to_string(&pong).unwrap().contains("<identifier> ball </identifier>"));
            assert!(out_dir.path().join("Square").join("MainT.xml").exists());
            assert!(!out_dir.path().join("Main.xml").exists());

            let written: Vec<&Path> = results
                .successful_files
                .iter()
                .map(|f| f.outputs.parse_xml.as_path())
                .collect();
            assert_eq!(written, vec![pong.as_path(), square.as_path()]);
        }
    }

    #[test]
    fn test_config_ceilings() {
        let config = BatchConfig {
            max_threads: 0,
            max_files: Some(usize::MAX),
            ..BatchConfig::default()
        };
        assert_eq!(config.effective_threads(), 1);
        assert_eq!(config.effective_max_files(), MAX_FILES_PER_BATCH);
    }
}
