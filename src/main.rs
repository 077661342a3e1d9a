use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use laurel::cli::{Cli, Command};
use laurel::config::LaurelConfig;
use laurel::demo;
use laurel::lifecycle::Details;
use laurel::scoring::Scorer;
use laurel::ui::Terminal;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = LaurelConfig::load(&cli.config)?;
    init_tracing(&config, cli.verbose);

    let term = Terminal::new();
    match cli.command {
        Command::Score {
            achievement_type,
            details,
        } => {
            let details: Details = details.into_iter().collect();
            let points = Scorer::points(achievement_type, &details);
            term.print_score(achievement_type, &details, points);
        }
        Command::Transitions => term.print_transitions(),
        Command::Demo => demo::run(&config, &term).await?,
    }

    Ok(())
}

fn init_tracing(config: &LaurelConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("laurel=debug,info")
    } else {
        EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
