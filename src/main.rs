use anyhow::Context;
use billing_import::config::ImportCommand;
use billing_import::domain::ports::ConfigProvider;
use billing_import::utils::error::{ErrorSeverity, ImportError};
use billing_import::utils::logger;
use billing_import::{
    AccountServiceImport, BatchImportEngine, CliConfig, CreditCardImport, EngineSettings,
    HttpBillingApi, ImportSummary, ImportVariant,
};
use clap::Parser;
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 不存在時直接略過
    let _ = dotenvy::dotenv();

    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting billing-import");

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };
    if cli.verbose {
        tracing::debug!(
            "Remote: {}, output: {}, concurrency: {}",
            config.api_uri(),
            config.output_dir().display(),
            config.concurrent_requests()
        );
    }

    let api = HttpBillingApi::from_config(&config).context("failed to build HTTP client")?;
    let engine = BatchImportEngine::new(api, EngineSettings::from_config(&config));
    let strategy = cli.strategy_override(config.concurrent_requests());

    let result = match &cli.command {
        ImportCommand::Services { file } => {
            run(&engine, &AccountServiceImport, file, strategy, config.concurrent_requests()).await
        }
        ImportCommand::Cards { file } => {
            run(&engine, &CreditCardImport, file, strategy, config.concurrent_requests()).await
        }
    };

    match result {
        Ok(summary) => {
            println!("✅ Import finished");
            println!("   Successes: {}", summary.successes);
            println!("   Failures:  {}", summary.failures);
            println!("📁 Success log: {}", summary.success_log_name.display());
            println!("📁 Failure log: {}", summary.failure_log_name.display());
            Ok(())
        }
        Err(e) => exit_with(&e),
    }
}

async fn run<V: ImportVariant>(
    engine: &BatchImportEngine<HttpBillingApi>,
    variant: &V,
    file: &Path,
    strategy: Option<billing_import::DispatchStrategy>,
    concurrency: usize,
) -> billing_import::Result<ImportSummary> {
    let strategy = strategy.unwrap_or_else(|| variant.default_strategy(concurrency));
    engine.import(variant, file, strategy).await
}

fn exit_with(e: &ImportError) -> ! {
    tracing::error!("❌ Import failed: {} (Severity: {:?})", e, e.severity());
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
