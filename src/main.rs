use clap::Parser;
use travel_fx::utils::error::ErrorSeverity;
use travel_fx::utils::{logger, validation::Validate};
use travel_fx::{build_service, CliConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting travel-fx");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.load().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let service = match build_service(&config) {
        Ok(service) => service,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let mut worst: Option<ErrorSeverity> = None;

    for destination in &cli.destinations {
        match service.get_info(destination).await {
            Ok(result) => println!("{}", serde_json::to_string(&result)?),
            Err(e) => {
                tracing::error!(
                    "Lookup for '{}' failed: {} (Category: {:?}, Severity: {:?})",
                    destination,
                    e,
                    e.category(),
                    e.severity()
                );
                eprintln!("❌ {}", e.user_friendly_message());
                eprintln!("💡 {}", e.recovery_suggestion());
                worst = worst.max(Some(e.severity()));
            }
        }
    }

    let exit_code = match worst {
        None | Some(ErrorSeverity::Low) => 0,
        Some(ErrorSeverity::Medium) => 2,
        Some(ErrorSeverity::High) => 1,
        Some(ErrorSeverity::Critical) => 3,
    };

    if exit_code > 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}
