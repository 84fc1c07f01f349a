use clap::Parser;
use medguard::utils::error::ErrorSeverity;
use medguard::utils::{logger, validation::Validate};
use medguard::{AppConfig, Cli, Command, MedGuardError, SafetyClassifier};
use std::io::Read;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 載入配置
    let mut config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    logger::init_logger(cli.verbose, cli.json_logs || config.logging.json);
    tracing::info!("Starting medguard");
    if cli.verbose {
        tracing::debug!("CLI args: {:?}", cli);
    }

    match cli.command() {
        Command::Serve { host, port } => {
            // 應用命令列覆蓋設定
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            if let Err(e) = config.validate() {
                exit_with(&e);
            }
            tracing::info!("✅ Configuration loaded and validated successfully");
            tracing::info!(
                "🔧 LLM provider: {} ({:?} format), OCR enabled: {}",
                config.llm.provider.as_str(),
                config.llm.response_format,
                config.ocr.enabled
            );

            if let Err(e) = medguard::run_server(&config).await {
                exit_with(&e);
            }
        }
        Command::Classify { text } => {
            let text = match text {
                Some(text) => text,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };

            let classifier = SafetyClassifier::new(
                config.classifier.keyword_table(),
                config.classifier.titles(),
            );
            let verdict = classifier.classify(&text);
            let output = serde_json::json!({
                "level": verdict.level,
                "safe": verdict.is_safe(),
                "color": verdict.color(),
                "title": verdict.title,
                "matched": verdict.matched,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

fn exit_with(e: &MedGuardError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 4,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
