use asset_decode::utils::{logger, validation::Validate};
use asset_decode::{CliConfig, DecodeError, DecoderPass, LocalStorage};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();

    if args.json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }
    tracing::debug!("CLI args: {:?}", args);

    let config = match args.resolve().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => fail(e),
    };
    tracing::debug!("Resolved config: {:?}", config);

    let storage = LocalStorage::new(config.directory.clone());
    let pass = DecoderPass::new(storage, config).with_echo(!args.json);

    match pass.run() {
        Ok(report) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            Ok(())
        }
        Err(e) => fail(e),
    }
}

fn fail(e: DecodeError) -> ! {
    tracing::error!(
        "Run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("{}", e.user_friendly_message());
    eprintln!("Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}
