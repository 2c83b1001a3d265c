use std::process::ExitCode;

use clap::Parser;
use dndimg::cli::CliOptions;
use dndimg::config::{Config, load_dotenv, setup_logging};
use dndimg::image_gen::OpenAiImageGenerator;
use dndimg::openai::OpenAiClient;
use dndimg::pipeline::run;
use dndimg::prompt::OpenAiPromptGenerator;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    // Logging isn't up yet.
    if let Err(err) = load_dotenv() {
        eprintln!("Failed to load .env: {err}");
    }

    let cli = CliOptions::parse();

    if setup_logging(cli.debug).is_err() {
        return ExitCode::FAILURE;
    }

    let config = match Config::from_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let client = OpenAiClient::new(&config.openai_token, &config.openai_base_url);
    let prompts = OpenAiPromptGenerator::new(client.clone(), &config);
    let images = OpenAiImageGenerator::new(client, &config);

    match run(&cli, &config, &prompts, &images).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
