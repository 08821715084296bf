use areacode_picker::adapters::candidates::load_candidates;
use areacode_picker::app::record::save_selection;
use areacode_picker::config::toml_config::TomlConfig;
use areacode_picker::core::ConfigProvider;
use areacode_picker::utils::{logger, validation::Validate};
use areacode_picker::{
    AreaCodeOracleClient, AreaCodeResolver, CandidateSelector, LocalStorage, NumberPlanner,
    OpenAiOracle, PlanRequest, PostalCodeInput, PostalCodeParser,
};
use clap::Parser;

#[derive(Parser)]
#[command(name = "toml-pick")]
#[command(about = "Area code lookup and number selection driven by a TOML configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "areacode-picker.toml")]
    config: String,

    /// ZIP codes to resolve
    #[arg(short, long)]
    zip_codes: Option<String>,

    /// Explicit area code (skips the lookup)
    #[arg(short, long)]
    area_code: Option<String>,

    /// JSON listing of phone number candidates
    #[arg(long)]
    candidates: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Only resolve area codes, do not select or save anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based area code picker");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config);

    let zip_codes = args.zip_codes.clone().unwrap_or_default();
    let oracle = OpenAiOracle::new(&config)?;
    let resolver = AreaCodeResolver::new(AreaCodeOracleClient::new(oracle));

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - resolving area codes only");
        let postal_codes = PostalCodeParser::parse(zip_codes.as_str());
        let resolution = resolver.resolve(&postal_codes).await;
        println!("{}", serde_json::to_string_pretty(&resolution)?);
        return Ok(());
    }

    let candidates = match &args.candidates {
        Some(path) => load_candidates(&LocalStorage::new("."), path).await?,
        None => Vec::new(),
    };

    let planner = NumberPlanner::new(
        resolver,
        CandidateSelector::with_criteria(config.selection_criteria()),
    );
    let report = planner
        .run(PlanRequest {
            explicit_area_code: args.area_code.clone(),
            postal_input: PostalCodeInput::Text(zip_codes),
            candidates,
        })
        .await;

    println!("{}", serde_json::to_string_pretty(&report)?);

    let storage = LocalStorage::new(config.output_path().to_string());
    match save_selection(&storage, &config.output.filename, &report).await? {
        Some(record) => {
            println!("✅ Selected {} ({:?})", record.phone_number, record.reason);
            println!("📁 Saved to: {}/{}", config.output_path(), config.output.filename);
        }
        None => println!("⚠️ No phone number selected ({:?})", report.outcome.reason),
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Configuration Summary:");
    tracing::info!("   Oracle endpoint: {}", config.oracle_endpoint());
    tracing::info!("   Model: {}", config.oracle_model());
    tracing::info!(
        "   API key: {}",
        if config.api_key().is_some() { "configured" } else { "missing" }
    );
    tracing::info!("   Output: {}/{}", config.output_path(), config.output.filename);
    if !config.selection.is_empty() {
        tracing::info!("   Selection criteria: {:?}", config.selection);
    }
}
