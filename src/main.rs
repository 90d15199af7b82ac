use clap::Parser;
use tracing_subscriber::EnvFilter;

use roofdesk::cli::{self, Commands};
use roofdesk::errors::{Locale, RoofdeskError};

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(!cli.no_color)
            .init();
    }

    let locale = Locale::from_tag(&cli.lang);

    let result = match cli.command {
        Commands::Serve(args) => cli::serve::handle_serve(args).await,
        Commands::Validate(args) => cli::validate::handle_validate(args).await,
        Commands::Area(args) => cli::area::handle_area(args).await,
        Commands::Draft(args) => cli::drafts::handle_draft(args).await,
        Commands::Geocode(args) => cli::geocode::handle_geocode(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        if !e.classify().user_facing {
            eprintln!("{}", e.user_message(locale).text);
        }
        std::process::exit(exit_code(&e));
    }
}

fn exit_code(error: &RoofdeskError) -> i32 {
    match error {
        RoofdeskError::Config(_) | RoofdeskError::Yaml(_) => 2,
        RoofdeskError::Validation(_) => 3,
        RoofdeskError::NotFound(_) => 4,
        _ => 1,
    }
}
