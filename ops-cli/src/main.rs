use clap::Parser;
use config_engine::ConfigLoader;
use error_common::log_error;
use ops_cli::{run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    let mut config = loader.load()?;
    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
    let log_guard = logger_redacted::init_tracing(&config.logging)?;

    let failed = match run(cli.command, config, std::io::stdin()).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            false
        }
        Err(error) => {
            log_error("nightingale command", &error);
            eprintln!("{}", serde_json::to_string_pretty(&error.report())?);
            true
        }
    };

    // Flush file logs before a non-zero exit
    drop(log_guard);
    if failed {
        std::process::exit(1);
    }
    Ok(())
}
