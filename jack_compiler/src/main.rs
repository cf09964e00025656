use jack_compiler::config::RuntimeConfig;
use jack_compiler::utils::SourceMap;
use jack_compiler::{batch, logging, pipeline};
use std::env;
use std::path::{Path, PathBuf};

/// Options gathered from the command line
#[derive(Debug)]
struct CliOptions {
    input: PathBuf,
    config_file: Option<PathBuf>,
    write_tokens: bool,
    write_json: bool,
    output_dir: Option<PathBuf>,
    batch: batch::BatchConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("jack_compiler");

    if args.len() < 2 {
        eprintln!("Usage: {} <input.jack|directory> [options]", program);
        eprintln!("       {} --help", program);
        std::process::exit(1);
    }

    if args[1] == "--help" {
        print_help(program);
        return Ok(());
    }

    let options = match parse_options(&args[1..]) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            std::process::exit(1);
        }
    };

    let config = load_runtime_config(&options)?;

    // Logging preferences must be in place before the global logger is built
    logging::config::init_runtime_preferences(config.logging.clone())?;
    logging::init_global_logging()?;
    pipeline::validate_pipeline()?;

    if options.input.is_file() {
        process_single_file(&options.input, &config);
    } else if options.input.is_dir() {
        process_directory_batch(&options.input, &options.batch, &config);
    } else {
        eprintln!("Error: Input must be a file (.jack) or directory");
        eprintln!("  Path: {}", options.input.display());
        std::process::exit(1);
    }

    Ok(())
}

fn print_help(program_name: &str) {
    println!("Jack Compiler v{}", env!("CARGO_PKG_VERSION"));
    println!("Tokenizer and syntax analyzer for the Jack language");
    println!();
    println!("USAGE:");
    println!("    {} <input.jack> [options]         # Compile single file", program_name);
    println!("    {} <directory> [options]          # Compile every .jack file", program_name);
    println!();
    println!("OUTPUT OPTIONS:");
    println!("    --tokens            Also write <Name>T.xml with the token stream");
    println!("    --json              Also write <Name>.json with the parse tree");
    println!("    --out DIR           Write outputs to DIR instead of next to the source");
    println!("    --config FILE       Load runtime preferences from a TOML file");
    println!();
    println!("BATCH OPTIONS:");
    println!("    --sequential        Process files one at a time");
    println!("    --threads N         Set maximum number of worker threads");
    println!("    --no-recursive      Don't search subdirectories");
    println!("    --max-files N       Limit maximum files to process");
    println!("    --fail-fast         Stop on first error");
    println!("    --quiet             Suppress progress reporting");
    println!("    --help              Show this help message");
    println!();
    println!("EXAMPLES:");
    println!("    {} Square/Main.jack --tokens", program_name);
    println!("    {} projects/10/ --threads 4 --out build/", program_name);
    println!("    {} tests/ --sequential --fail-fast", program_name);
    println!();
    println!("BUILD CONFIGURATION:");
    println!("    {}", jack_compiler::config::build_info::source_info());
}

fn parse_count(flag: &str, value: Option<&String>) -> Result<usize, String> {
    let value = value.ok_or_else(|| format!("{} requires a number", flag))?;
    value
        .parse::<usize>()
        .map_err(|_| format!("Invalid value '{}' for {}", value, flag))
}

fn parse_path(flag: &str, value: Option<&String>) -> Result<PathBuf, String> {
    value
        .map(PathBuf::from)
        .ok_or_else(|| format!("{} requires a path", flag))
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let (input, rest) = args
        .split_first()
        .ok_or_else(|| "Missing input path".to_string())?;

    let mut options = CliOptions {
        input: PathBuf::from(input),
        config_file: None,
        write_tokens: false,
        write_json: false,
        output_dir: None,
        batch: batch::BatchConfig {
            progress_reporting: true,
            ..batch::BatchConfig::default()
        },
    };

    let mut iter = rest.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--tokens" => options.write_tokens = true,
            "--json" => options.write_json = true,
            "--out" => options.output_dir = Some(parse_path(arg, iter.next())?),
            "--config" => options.config_file = Some(parse_path(arg, iter.next())?),
            "--sequential" => options.batch.max_threads = 1,
            "--threads" => options.batch.max_threads = parse_count(arg, iter.next())?.max(1),
            "--no-recursive" => options.batch.recursive = false,
            "--max-files" => options.batch.max_files = Some(parse_count(arg, iter.next())?),
            "--fail-fast" => options.batch.fail_fast = true,
            "--quiet" => options.batch.progress_reporting = false,
            other => eprintln!("Warning: Unknown option '{}'", other),
        }
    }

    Ok(options)
}

/// Runtime preferences from the environment or a TOML file, with CLI flags on top
fn load_runtime_config(options: &CliOptions) -> Result<RuntimeConfig, Box<dyn std::error::Error>> {
    let mut config = match &options.config_file {
        Some(path) => RuntimeConfig::from_toml_file(path)?,
        None => RuntimeConfig::default(),
    };

    config.output.write_token_xml |= options.write_tokens;
    config.output.write_json_tree |= options.write_json;
    if let Some(dir) = &options.output_dir {
        config.output.output_dir = Some(dir.clone());
    }

    Ok(config)
}

fn process_single_file(file_path: &Path, config: &RuntimeConfig) {
    println!("Compiling file: {}", file_path.display());

    match pipeline::compile_file(file_path, 0, config) {
        Ok((result, outputs)) => {
            println!(
                "\nSUCCESS: {} parsed ({} tokens, depth {}, {:.2}ms)",
                result.class_name(),
                result.token_count(),
                result.parse_summary.max_depth,
                result.processing_duration.as_secs_f64() * 1000.0
            );
            for path in outputs.all() {
                println!("  wrote {}", path.display());
            }
            logging::print_cargo_style_summary();
        }
        Err(error) => {
            eprintln!("\nFAILED: {}", error);
            print_detailed_error(file_path, &error);
            logging::print_cargo_style_summary();
            std::process::exit(1);
        }
    }
}

fn process_directory_batch(dir_path: &Path, config: &batch::BatchConfig, runtime: &RuntimeConfig) {
    println!("Starting batch compilation: {}", dir_path.display());
    println!(
        "Configuration: {} threads, recursive={}, fail_fast={}",
        config.effective_threads(),
        config.recursive,
        config.fail_fast
    );

    match batch::process_directory_with_config(dir_path, config, runtime) {
        Ok(results) => {
            print_batch_results(&results);
            logging::print_cargo_style_summary();
            if results.has_failures() {
                std::process::exit(1);
            }
        }
        Err(error) => {
            eprintln!("Batch processing failed: {}", error);
            logging::print_cargo_style_summary();
            std::process::exit(1);
        }
    }
}

fn print_batch_results(results: &batch::BatchResults) {
    println!("\n{}", results.summary());
    println!("  Files discovered: {}", results.files_discovered);

    let total_tokens: usize = results.successful_files.iter().map(|f| f.token_count).sum();
    let seconds = results.processing_duration.as_secs_f64();
    if seconds > 0.0 && total_tokens > 0 {
        println!("  Processing rate: {:.0} tokens/sec", total_tokens as f64 / seconds);
    }

    if results.has_failures() {
        println!("\nFailed Files:");
        for (file_path, error) in &results.failed_files {
            println!("  {}: {}", file_path.display(), get_error_summary(error));
        }
    }

    if results.success_count() > 0 {
        println!("\nCompiled Classes:");
        for file in results.successful_files.iter().take(10) {
            println!(
                "  {} -> {} ({} tokens)",
                file.class_name,
                file.outputs.parse_xml.display(),
                file.token_count
            );
        }
        if results.success_count() > 10 {
            println!("  ... and {} more", results.success_count() - 10);
        }
    }
}

fn get_error_summary(error: &pipeline::PipelineError) -> String {
    match error {
        pipeline::PipelineError::FileProcessing(_) => "File processing error".to_string(),
        pipeline::PipelineError::Parse(parse_err) => match parse_err {
            jack_compiler::syntax::ParseError::Lexical(_) => "Lexical error".to_string(),
            jack_compiler::syntax::ParseError::Syntax(_) => "Syntax error".to_string(),
            jack_compiler::syntax::ParseError::Usage(_) => "Usage error".to_string(),
        },
        pipeline::PipelineError::Output { .. } => "Output error".to_string(),
        pipeline::PipelineError::Serialization(_) => "Serialization error".to_string(),
    }
}

fn print_detailed_error(file_path: &Path, error: &pipeline::PipelineError) {
    eprintln!("[{}] {}", error.error_code().as_str(), get_error_summary(error));

    let source = error
        .span()
        .and_then(|span| std::fs::read_to_string(file_path).ok().map(|s| (span, s)));
    match source {
        Some((span, source)) => {
            eprint!("{}", SourceMap::new(source).format_error(&span, &error.to_string()));
        }
        None => eprintln!("  {}", error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_batch_options() {
        let options = parse_options(&args(&[
            "src/",
            "--threads",
            "4",
            "--fail-fast",
            "--no-recursive",
            "--max-files",
            "12",
        ]))
        .unwrap();

        assert_eq!(options.input, PathBuf::from("src/"));
        assert_eq!(options.batch.max_threads, 4);
        assert!(options.batch.fail_fast);
        assert!(!options.batch.recursive);
        assert_eq!(options.batch.max_files, Some(12));
    }

    #[test]
    fn test_parse_output_options() {
        let options = parse_options(&args(&[
            "Main.jack", "--tokens", "--json", "--out", "build", "--quiet",
        ]))
        .unwrap();

        assert!(options.write_tokens);
        assert!(options.write_json);
        assert_eq!(options.output_dir, Some(PathBuf::from("build")));
        assert!(!options.batch.progress_reporting);

        let config = load_runtime_config(&options).unwrap();
        assert!(config.output.write_token_xml);
        assert!(config.output.write_json_tree);
        assert_eq!(config.output.output_dir, Some(PathBuf::from("build")));
    }

    #[test]
    fn test_parse_options_invalid() {
        assert!(parse_options(&args(&["dir", "--threads", "many"])).is_err());
        assert!(parse_options(&args(&["dir", "--max-files"])).is_err());
        assert!(parse_options(&args(&["dir", "--out"])).is_err());
        assert!(parse_options(&[]).is_err());

        let options = parse_options(&args(&["dir", "--sequential", "--unknown"])).unwrap();
        assert_eq!(options.batch.max_threads, 1);
    }

    #[test]
    fn test_get_error_summary() {
        let error = pipeline::PipelineError::Output {
            path: "Main.xml".to_string(),
            message: "denied".to_string(),
        };
        assert_eq!(get_error_summary(&error), "Output error");
    }
}
