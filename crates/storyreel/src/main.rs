//! Storyreel CLI binary.
//!
//! This binary provides command-line access to Storyreel's functionality:
//! - Activate, inspect and forget a license key
//! - Generate and extend shot-list scripts
//! - Issue offline-verifiable keys

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{
        Cli, Commands, GenerateArgs, handle_activate, handle_extend, handle_generate,
        handle_keygen, handle_logout, handle_status, init_logging, load_config,
    };

    // Parse command-line arguments
    let cli = Cli::parse();

    // Load .env for GEMINI_API_KEY
    dotenvy::dotenv().ok();

    init_logging(cli.verbose, cli.json_logs);
    let config = load_config(cli.config.as_deref())?;

    // Execute the requested command
    match cli.command {
        Commands::Activate { key } => {
            handle_activate(&config, &key).await?;
        }

        Commands::Status => {
            handle_status(&config).await?;
        }

        Commands::Logout => {
            handle_logout(&config)?;
        }

        Commands::Generate {
            idea,
            style,
            count,
            language,
            prompt_type,
            output,
            format,
        } => {
            let args = GenerateArgs {
                idea,
                style,
                count,
                language,
                prompt_type,
                output,
                format,
            };
            handle_generate(&config, args).await?;
        }

        Commands::Extend {
            script,
            idea,
            count,
            output,
        } => {
            handle_extend(&config, &script, &idea, count, output.as_deref()).await?;
        }

        Commands::Keygen { days, type_code } => {
            handle_keygen(&config, days, &type_code)?;
        }
    }

    Ok(())
}
