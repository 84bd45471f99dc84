use clap::Parser;

use tnlens::capture;
use tnlens::capture::CaptureError;
use tnlens::commands::Cli;
use tnlens::commands::Commands;
use tnlens::handlers;
use tnlens::handlers::CliError;
use tnlens::handlers::HandlerContext;
use tnlens::presenter::JsonPresenter;
use tnlens::presenter::Presenter;
use tnlens::presenter::TextPresenter;
use tnlens::telemetry;
use tnlens_common::Colors;
use tnlens_common::color_init;
use tnlens_core::ScanConfig;

fn main() {
    let cli = Cli::parse();
    color_init(cli.no_color);
    let _telemetry = telemetry::init_tracing("warn");

    if let Err(e) = run(cli) {
        if let Some(capture_error) = e.downcast_ref::<CaptureError>() {
            eprintln!("{} {}", Colors::error("Error:"), capture_error);
            eprintln!(
                "{} {}",
                Colors::dim("Suggestion:"),
                capture_error.suggestion()
            );
            std::process::exit(capture_error.exit_code());
        } else if let Some(cli_error) = e.downcast_ref::<CliError>() {
            eprintln!("{} {}", Colors::error("Error:"), cli_error);
            eprintln!("{} {}", Colors::dim("Suggestion:"), cli_error.suggestion());
            std::process::exit(1);
        } else {
            eprintln!("{} {}", Colors::error("Error:"), e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => capture::load_config(path)?,
        None => ScanConfig::default(),
    };

    let presenter: Box<dyn Presenter> = if cli.json {
        Box::new(JsonPresenter)
    } else {
        Box::new(TextPresenter)
    };

    match cli.command {
        Commands::Scan { capture } => {
            let ctx = HandlerContext {
                presenter: presenter.as_ref(),
                config,
            };
            handlers::handle_scan(&ctx, &capture)
        }
        Commands::Fields {
            capture,
            pattern,
            input,
            display,
        } => {
            let ctx = HandlerContext {
                presenter: presenter.as_ref(),
                config,
            };
            handlers::handle_fields(&ctx, &capture, pattern.as_deref(), input, display)
        }
        Commands::Table { captures, max_pages } => {
            if let Some(pages) = max_pages {
                config.max_pages = pages;
            }
            let ctx = HandlerContext {
                presenter: presenter.as_ref(),
                config,
            };
            handlers::handle_table(&ctx, &captures)
        }
    }
}
