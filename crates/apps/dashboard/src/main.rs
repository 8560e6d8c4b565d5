use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use service::{HttpService, SpeciesService};
use session::dashboard::{Dashboard, UserAction};
use species_dashboard::config::{AppConfig, Cli, Command};
use species_dashboard::driver::Driver;
use species_dashboard::render;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env().with_overrides(&cli);

    let service = match HttpService::with_timeout(config.api_base.clone(), config.timeout) {
        Ok(service) => service,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };
    info!(api_base = %service.base_url(), country = %config.session.country, "species dashboard");

    let mut driver = Driver::new(Dashboard::new(&config.session), Arc::new(service));
    match cli.command {
        Command::Search { text } => {
            type_query(&mut driver, &text).await;
            print!("{}", render::search_panel(driver.dashboard()));
        }
        Command::Show { text, index } => {
            type_query(&mut driver, &text).await;
            if driver.dashboard().search().results().get(index).is_none() {
                print!("{}", render::search_panel(driver.dashboard()));
                return ExitCode::FAILURE;
            }
            driver.dispatch(UserAction::PickResult(index));
            driver.settle().await;
            print!("{}", render::selection(driver.dashboard()));
        }
        Command::Popular { pick } => {
            driver.dispatch(UserAction::Mount);
            driver.settle().await;
            print!("{}", render::popular_list(driver.dashboard()));
            if let Some(index) = pick {
                if driver.dashboard().popular().species().get(index).is_none() {
                    return ExitCode::FAILURE;
                }
                driver.dispatch(UserAction::PickPopular(index));
                driver.settle().await;
                print!("{}", render::selection(driver.dashboard()));
            }
        }
        Command::Interactive => {
            if let Err(err) = interactive(&mut driver).await {
                error!("stdin: {err}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

/// Enters `text` one keystroke at a time, as typing into the search box
/// would, then waits for the debounced search to finish.
async fn type_query<S: SpeciesService + 'static>(driver: &mut Driver<S>, text: &str) {
    driver.dispatch(UserAction::Focus);
    let mut typed = String::new();
    for ch in text.chars() {
        typed.push(ch);
        driver.dispatch(UserAction::Input(typed.clone()));
    }
    driver.settle().await;
}

async fn interactive<S: SpeciesService + 'static>(driver: &mut Driver<S>) -> std::io::Result<()> {
    driver.dispatch(UserAction::Mount);
    driver.settle().await;
    print!("{}", render::popular_list(driver.dashboard()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let action = match parse_line(&line) {
            Some(Line::Quit) => break,
            Some(Line::Action(action)) => action,
            None => {
                eprintln!("unrecognised command: {line}");
                continue;
            }
        };
        driver.dispatch(action);
        driver.settle().await;

        let dashboard = driver.dashboard();
        print!("{}", render::search_panel(dashboard));
        if dashboard.popular_visible() {
            print!("{}", render::popular_list(dashboard));
        } else {
            print!("{}", render::selection(dashboard));
        }
    }
    Ok(())
}

enum Line {
    Action(UserAction),
    Quit,
}

fn parse_line(line: &str) -> Option<Line> {
    let Some(rest) = line.strip_prefix(':') else {
        return Some(Line::Action(UserAction::Input(line.to_string())));
    };
    let mut parts = rest.split_whitespace();
    let action = match (parts.next()?, parts.next()) {
        ("quit" | "q", None) => return Some(Line::Quit),
        ("pick", Some(n)) => UserAction::PickResult(n.parse().ok()?),
        ("popular", Some(n)) => UserAction::PickPopular(n.parse().ok()?),
        ("clear", None) => UserAction::ClearSelection,
        ("focus", None) => UserAction::Focus,
        ("blur", None) => UserAction::Blur,
        _ => return None,
    };
    Some(Line::Action(action))
}
