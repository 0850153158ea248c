mod auth;
mod catalog;
mod config;
mod controller;
mod error;
mod logging;
mod model;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use auth::YtMusicSession;
use catalog::{Catalog, SpotifyCatalog, YtMusicCatalog};
use config::{Cli, Command, SpotifyTokenArgs, SyncArgs};
use controller::SyncController;
use model::{DirectionReport, SyncReport};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let dotenv_warning = dotenv_problem(dotenvy::dotenv());
    let cli = Cli::parse();

    let _log_guard = match logging::init_logging() {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    if let Some(error) = dotenv_warning {
        tracing::warn!(error = %error, ".env file could not be loaded");
    }

    tracing::info!("=== playlist-sync starting ===");

    let code = match cli.command {
        Command::Sync(args) => run_sync(args).await?,
        Command::SpotifyToken(args) => print_spotify_token(args).await?,
    };

    tracing::info!("playlist-sync finished");
    Ok(code)
}

async fn run_sync(args: SyncArgs) -> Result<ExitCode> {
    tracing::debug!(direction = %args.direction, dry_run = args.dry_run, "Preparing sessions");

    let spotify = auth::spotify_session(&args.spotify)
        .await
        .context("Spotify authentication failed")?;
    let source: Arc<dyn Catalog> = Arc::new(SpotifyCatalog::new(spotify).with_max_batch_size(args.spotify_batch_size));

    let session = YtMusicSession::from_cookie(&args.ytmusic.cookie)?.with_auth_user(&args.ytmusic.auth_user);
    let mut ytmusic = YtMusicCatalog::new(session)?.with_max_batch_size(args.ytmusic_batch_size);
    if let Some(base_url) = &args.ytmusic_base_url {
        ytmusic = ytmusic.with_base_url(base_url);
    }
    let target: Arc<dyn Catalog> = Arc::new(ytmusic);

    let controller = SyncController::new(source.clone(), target.clone(), args.playlists(), args.options());
    let report = controller.run(args.direction).await?;

    println!("{}", summary(&report, source.name(), target.name()));

    if report.has_failures() {
        for error in report.failures() {
            tracing::error!(direction = ?error.direction(), stage = error.stage(), "Sync leg failed");
            eprintln!("error: {}", error.describe());
        }
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

async fn print_spotify_token(args: SpotifyTokenArgs) -> Result<ExitCode> {
    let refresh_token = auth::obtain_spotify_refresh_token(&args.client_id, &args.redirect_uri).await?;

    println!("\n==== SPOTIFY REFRESH TOKEN ====");
    println!("{}", refresh_token);
    println!("===============================");
    println!("Store it as SPOTIFY_REFRESH_TOKEN.");
    Ok(ExitCode::SUCCESS)
}

/// A missing .env is fine since the environment may already hold everything;
/// anything else is worth a warning once logging is up.
fn dotenv_problem(loaded: Result<PathBuf, dotenvy::Error>) -> Option<dotenvy::Error> {
    match loaded {
        Ok(_) => None,
        Err(dotenvy::Error::Io(error)) if error.kind() == io::ErrorKind::NotFound => None,
        Err(error) => Some(error),
    }
}

fn summary(report: &SyncReport, source_name: &str, target_name: &str) -> String {
    let dry_run = [&report.source_to_target, &report.target_to_source]
        .into_iter()
        .flatten()
        .any(|leg| matches!(leg, Ok(DirectionReport { dry_run: true, .. })));

    if dry_run {
        let would_add = |leg: &Option<Result<DirectionReport, error::SyncError>>| match leg {
            Some(Ok(r)) => r.resolved,
            _ => 0,
        };
        format!(
            "Dry run: would add {} tracks to {} and {} to {}.",
            would_add(&report.source_to_target),
            target_name,
            would_add(&report.target_to_source),
            source_name
        )
    } else {
        format!(
            "Added {} tracks to {} and {} to {}.",
            report.added_to_target(),
            target_name,
            report.added_to_source(),
            source_name
        )
    }
}
