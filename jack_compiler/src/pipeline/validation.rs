/// Check that every stage's diagnostic codes and the logging limits are configured
pub fn validate_pipeline() -> Result<(), String> {
    crate::log_debug!("Validating pipeline configuration");

    crate::lexical::validate_lexical_codes()?;
    crate::syntax::validate_syntax_codes()?;
    crate::logging::config::validate_config()?;

    crate::log_success!(
        crate::logging::codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Pipeline validation succeeded",
        "stages_validated" => 3,
        "lexical_analysis" => true,
        "syntax_analysis" => true
    );

    Ok(())
}
