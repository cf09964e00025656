//! Diagnostic codes and their classification metadata
//!
//! Every error family in the crate maps its variants onto one of these codes.
//! The registry below is the single source for severity, category and
//! recommended action of each code.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const CONFIGURATION_ERROR: Code = Code::new("ERR003");
}

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
    pub const TOO_MANY_LINES: Code = Code::new("E013");
    pub const OUTPUT_WRITE_FAILED: Code = Code::new("E014");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_STRING: Code = Code::new("E021");
    pub const INVALID_NUMBER: Code = Code::new("E022");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E023");
    pub const STRING_TOO_LARGE: Code = Code::new("E024");
    pub const INTEGER_OUT_OF_RANGE: Code = Code::new("E025");
    pub const COMMENT_TOO_LONG: Code = Code::new("E026");
    pub const TOO_MANY_TOKENS: Code = Code::new("E027");
    pub const UNTERMINATED_COMMENT: Code = Code::new("E028");
    pub const END_OF_INPUT: Code = Code::new("E029");
}

/// Syntax analysis error codes
pub mod syntax {
    use super::Code;

    pub const UNEXPECTED_END_OF_INPUT: Code = Code::new("E040");
    pub const TRAILING_TOKENS: Code = Code::new("E044");
    pub const UNEXPECTED_TOKEN: Code = Code::new("E050");
    pub const MAX_RECURSION_DEPTH: Code = Code::new("E087");
}

/// Tokenizer and engine misuse codes
pub mod usage {
    use super::Code;

    pub const ENGINE_ALREADY_USED: Code = Code::new("E060");
    pub const STREAM_ALREADY_ADVANCED: Code = Code::new("E061");
    pub const NO_CURRENT_TOKEN: Code = Code::new("E062");
    pub const WRONG_TOKEN_KIND: Code = Code::new("E063");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");

    // File processing
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const OUTPUT_WRITTEN: Code = Code::new("I008");

    // Lexical
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");

    // Syntax
    pub const PARSE_COMPLETE: Code = Code::new("I040");

    // Batch
    pub const BATCH_COMPLETE: Code = Code::new("I090");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

/// Error metadata registry using OnceLock for thread safety
static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let mut registry = HashMap::new();
        let mut add = |metadata: ErrorMetadata| {
            registry.insert(metadata.code, metadata);
        };

        // System errors
        add(ErrorMetadata::new(
            "ERR001",
            "System",
            Severity::Critical,
            false,
            true,
            "Critical internal system error",
            "File a bug report with the input that triggered it",
        ));
        add(ErrorMetadata::new(
            "ERR002",
            "System",
            Severity::Critical,
            false,
            true,
            "Logging or runtime initialization failed",
            "Check environment variables and configuration files",
        ));
        add(ErrorMetadata::new(
            "ERR003",
            "System",
            Severity::High,
            false,
            true,
            "Runtime configuration could not be loaded",
            "Fix the TOML configuration file or remove the override",
        ));

        // File processing errors
        add(ErrorMetadata::new(
            "E005",
            "FileProcessing",
            Severity::High,
            true,
            false,
            "Source file does not exist",
            "Verify the file path",
        ));
        add(ErrorMetadata::new(
            "E006",
            "FileProcessing",
            Severity::Medium,
            true,
            false,
            "Source file does not have a .jack extension",
            "Rename the file or disable the extension requirement",
        ));
        add(ErrorMetadata::new(
            "E007",
            "FileProcessing",
            Severity::High,
            true,
            false,
            "Source file exceeds the configured size limit",
            "Split the class or raise max_file_size in the build profile",
        ));
        add(ErrorMetadata::new(
            "E008",
            "FileProcessing",
            Severity::Medium,
            true,
            false,
            "Source file is empty",
            "A compilation unit must contain one class declaration",
        ));
        add(ErrorMetadata::new(
            "E009",
            "FileProcessing",
            Severity::High,
            true,
            false,
            "Permission denied while reading the source file",
            "Check file permissions",
        ));
        add(ErrorMetadata::new(
            "E010",
            "FileProcessing",
            Severity::High,
            true,
            false,
            "Source file is not valid UTF-8",
            "Re-save the file with UTF-8 encoding",
        ));
        add(ErrorMetadata::new(
            "E011",
            "FileProcessing",
            Severity::High,
            true,
            false,
            "I/O error while reading the source file",
            "Retry or check the underlying storage",
        ));
        add(ErrorMetadata::new(
            "E012",
            "FileProcessing",
            Severity::Medium,
            true,
            false,
            "Path is not a regular file",
            "Pass a .jack file or a directory",
        ));
        add(ErrorMetadata::new(
            "E013",
            "FileProcessing",
            Severity::Medium,
            true,
            false,
            "Source file has too many lines",
            "Split the class or raise max_line_count in the build profile",
        ));
        add(ErrorMetadata::new(
            "E014",
            "FileProcessing",
            Severity::High,
            true,
            false,
            "Output file could not be written",
            "Check permissions of the output directory",
        ));

        // Lexical errors
        add(ErrorMetadata::new(
            "E020",
            "Lexical",
            Severity::High,
            false,
            true,
            "Character is not part of the Jack alphabet",
            "Remove the character or place it inside a string constant",
        ));
        add(ErrorMetadata::new(
            "E021",
            "Lexical",
            Severity::High,
            false,
            true,
            "String constant is missing its closing quote",
            "Close the string before the end of the line",
        ));
        add(ErrorMetadata::new(
            "E022",
            "Lexical",
            Severity::High,
            false,
            true,
            "Integer constant is malformed",
            "Write integer constants in decimal without leading zeros",
        ));
        add(ErrorMetadata::new(
            "E023",
            "Lexical",
            Severity::Medium,
            false,
            true,
            "Identifier exceeds the configured length limit",
            "Shorten the identifier",
        ));
        add(ErrorMetadata::new(
            "E024",
            "Lexical",
            Severity::Medium,
            false,
            true,
            "String constant exceeds the configured size limit",
            "Split the string constant",
        ));
        add(ErrorMetadata::new(
            "E025",
            "Lexical",
            Severity::High,
            false,
            true,
            "Integer constant is outside 0..=32767",
            "Use a value that fits in 15 bits",
        ));
        add(ErrorMetadata::new(
            "E026",
            "Lexical",
            Severity::Medium,
            false,
            true,
            "Comment exceeds the configured length limit",
            "Shorten the comment",
        ));
        add(ErrorMetadata::new(
            "E027",
            "Lexical",
            Severity::High,
            false,
            true,
            "Source produced more tokens than the configured limit",
            "Split the class into smaller units",
        ));
        add(ErrorMetadata::new(
            "E028",
            "Lexical",
            Severity::High,
            false,
            true,
            "Block comment is never closed",
            "Add the closing */",
        ));
        add(ErrorMetadata::new(
            "E029",
            "Lexical",
            Severity::Medium,
            false,
            true,
            "Tokenizer advanced past the end of input",
            "Check has_more_tokens before advancing",
        ));

        // Syntax errors
        add(ErrorMetadata::new(
            "E040",
            "Syntax",
            Severity::High,
            false,
            true,
            "Input ended while a production was still open",
            "Complete the class declaration",
        ));
        add(ErrorMetadata::new(
            "E044",
            "Syntax",
            Severity::High,
            false,
            true,
            "Tokens follow the end of the class declaration",
            "Place exactly one class in each file",
        ));
        add(ErrorMetadata::new(
            "E050",
            "Syntax",
            Severity::High,
            false,
            true,
            "Token does not match the grammar at this position",
            "Compare the token with the expected construct",
        ));
        add(ErrorMetadata::new(
            "E087",
            "Syntax",
            Severity::High,
            false,
            true,
            "Expression or statement nesting exceeds the parse depth limit",
            "Reduce nesting or raise max_parse_depth in the build profile",
        ));

        // Usage errors
        add(ErrorMetadata::new(
            "E060",
            "Usage",
            Severity::High,
            false,
            true,
            "Compilation engine entry point called more than once",
            "Create a new engine and tokenizer for each parse",
        ));
        add(ErrorMetadata::new(
            "E061",
            "Usage",
            Severity::High,
            false,
            true,
            "Compilation engine received an already advanced tokenizer",
            "Hand the engine a fresh tokenizer",
        ));
        add(ErrorMetadata::new(
            "E062",
            "Usage",
            Severity::Medium,
            false,
            true,
            "Token accessor called before the first advance",
            "Call advance before reading the current token",
        ));
        add(ErrorMetadata::new(
            "E063",
            "Usage",
            Severity::Medium,
            false,
            true,
            "Token accessor does not match the current token kind",
            "Dispatch on token_type before calling a typed accessor",
        ));

        registry
    })
}

// ============================================================================
// METADATA LOOKUP
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(if code.starts_with('I') {
            Severity::Low
        } else {
            Severity::Medium
        })
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Category from the registry; success and info codes report "Success"/"Info"
pub fn get_category(code: &str) -> &'static str {
    match get_error_registry().get(code) {
        Some(metadata) => metadata.category,
        None if code == "I000" => "Info",
        None if code.starts_with('I') => "Success",
        None if code.starts_with('W') => "Warning",
        None if code.starts_with('D') => "Debug",
        None => "Unknown",
    }
}

/// All error codes known to the registry, sorted
pub fn registered_codes() -> Vec<&'static str> {
    let mut codes: Vec<&'static str> = get_error_registry().keys().copied().collect();
    codes.sort_unstable();
    codes
}
