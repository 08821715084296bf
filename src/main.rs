use areacode_picker::adapters::candidates::load_candidates;
use areacode_picker::app::record::save_selection;
use areacode_picker::utils::error::ErrorSeverity;
use areacode_picker::utils::{logger, validation::Validate};
use areacode_picker::{
    AreaCodeOracleClient, AreaCodeResolver, CandidateSelector, CliConfig, LocalStorage,
    NumberPlanner, OpenAiOracle, PickerError, PlanRequest, PostalCodeInput,
};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse().with_env_api_key();

    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting areacode-picker CLI");

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(&config).await {
        tracing::error!(
            "❌ Number selection failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(config: &CliConfig) -> Result<(), PickerError> {
    let oracle = OpenAiOracle::new(config)?;
    if !oracle.has_credentials() && config.area_code.is_none() {
        tracing::warn!("⚠️ No oracle API key configured, ZIP codes will not resolve");
    }

    let storage = LocalStorage::new(config.output_path.clone());
    let candidates = match &config.candidates {
        Some(path) => load_candidates(&LocalStorage::new("."), path).await?,
        None => Vec::new(),
    };

    let planner = NumberPlanner::new(
        AreaCodeResolver::new(AreaCodeOracleClient::new(oracle)),
        CandidateSelector::with_criteria(config.selection_criteria()),
    );

    let report = planner
        .run(PlanRequest {
            explicit_area_code: config.area_code.clone(),
            postal_input: PostalCodeInput::Text(config.zip_codes.clone().unwrap_or_default()),
            candidates,
        })
        .await;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if config.candidates.is_some() {
        if let Some(record) = save_selection(&storage, &config.output_filename, &report).await? {
            println!("✅ Selected {} ({:?})", record.phone_number, record.reason);
        } else {
            println!("⚠️ No phone number selected ({:?})", report.outcome.reason);
        }
    }

    Ok(())
}
