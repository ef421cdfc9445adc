use anyhow::Result;
use clap::Parser;

use guichet::{
    app::load_config,
    cli::{open_gateway, Cli},
    models::ConversationId,
    runtime::{NonInteractiveRunner, Orchestrator},
    utils::init_logger,
    Config, Language, SessionController,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Set up logging if verbose
    if cli.verbose {
        init_logger();
    }

    let config = load_config(cli.config.as_deref())?;

    // Check if running in non-interactive mode
    if let Some(prompt) = cli.prompt.clone() {
        run_non_interactive(cli, config, prompt).await
    } else {
        // Create and run the orchestrator for interactive mode
        Orchestrator::new(cli, config).run().await
    }
}

/// Run in non-interactive mode
async fn run_non_interactive(cli: Cli, config: Config, prompt: String) -> Result<()> {
    let language = match &cli.language {
        Some(code) => code.parse::<Language>()?,
        None => config.ui.language,
    };

    let controller = SessionController::new(open_gateway(&config)?, language);
    let runner = NonInteractiveRunner::new(&controller);

    if let Some(id) = &cli.conversation {
        runner.resume(ConversationId::from(id.as_str())).await?;
    }

    // Send the prompt
    let result = runner.execute(prompt).await;

    // Format and output the result
    println!("{}", runner.format_result(&result, cli.output_format));

    // Exit with appropriate code
    if !result.errors.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}
