//! Command line and environment configuration
//!
//! Every value can come from a flag or from the environment (a `.env` file is
//! loaded at start-up). Credentials have no built-in fallbacks.

use std::fmt;

use clap::{Args, Parser, Subcommand};
use strum::{Display, EnumString};

pub const DEFAULT_CONCURRENCY: usize = 4;
pub const SPOTIFY_MAX_BATCH: usize = 100;
pub const YTMUSIC_MAX_BATCH: usize = 99;

/// Which legs of the reconciliation to run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum SyncDirection {
    #[strum(
        to_string = "sourceToTarget",
        serialize = "source_to_target",
        serialize = "spotify_to_yt"
    )]
    SourceToTarget,
    #[strum(
        to_string = "targetToSource",
        serialize = "target_to_source",
        serialize = "yt_to_spotify"
    )]
    TargetToSource,
    #[strum(to_string = "both")]
    Both,
}

impl SyncDirection {
    /// Legs to run, in execution order
    pub fn legs(self) -> &'static [Leg] {
        match self {
            SyncDirection::SourceToTarget => &[Leg::SourceToTarget],
            SyncDirection::TargetToSource => &[Leg::TargetToSource],
            SyncDirection::Both => &[Leg::SourceToTarget, Leg::TargetToSource],
        }
    }
}

/// A single directional pass
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum Leg {
    #[strum(to_string = "sourceToTarget")]
    SourceToTarget,
    #[strum(to_string = "targetToSource")]
    TargetToSource,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Keep a Spotify playlist and a YouTube Music playlist in sync")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add the tracks missing on either side
    Sync(SyncArgs),
    /// Run the browser login and print a Spotify refresh token
    SpotifyToken(SpotifyTokenArgs),
}

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// sourceToTarget, targetToSource or both
    #[arg(long, env = "SYNC_DIRECTION", default_value = "both")]
    pub direction: SyncDirection,

    #[arg(long, env = "SPOTIFY_PLAYLIST_ID")]
    pub spotify_playlist: String,

    #[arg(long, env = "YTMUSIC_PLAYLIST_ID")]
    pub ytmusic_playlist: String,

    /// Resolve and report, but do not add anything
    #[arg(long, env = "SYNC_DRY_RUN")]
    pub dry_run: bool,

    /// Searches in flight at once
    #[arg(long, env = "SYNC_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    #[arg(long, env = "SPOTIFY_BATCH_SIZE", default_value_t = SPOTIFY_MAX_BATCH)]
    pub spotify_batch_size: usize,

    #[arg(long, env = "YTMUSIC_BATCH_SIZE", default_value_t = YTMUSIC_MAX_BATCH)]
    pub ytmusic_batch_size: usize,

    #[arg(long, env = "YTMUSIC_BASE_URL")]
    pub ytmusic_base_url: Option<String>,

    #[command(flatten)]
    pub spotify: SpotifyCredentials,

    #[command(flatten)]
    pub ytmusic: YtMusicCredentials,
}

#[derive(Args, Debug)]
pub struct SpotifyTokenArgs {
    #[arg(long, env = "SPOTIFY_CLIENT_ID")]
    pub client_id: String,

    /// Must be registered on the Spotify application, e.g. http://127.0.0.1:8898/login
    #[arg(long, env = "SPOTIFY_REDIRECT_URI")]
    pub redirect_uri: String,
}

#[derive(Args, Clone)]
pub struct SpotifyCredentials {
    #[arg(long = "spotify-client-id", env = "SPOTIFY_CLIENT_ID")]
    pub client_id: String,

    #[arg(long = "spotify-client-secret", env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,

    #[arg(long = "spotify-refresh-token", env = "SPOTIFY_REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: String,

    #[arg(long = "spotify-redirect-uri", env = "SPOTIFY_REDIRECT_URI")]
    pub redirect_uri: String,
}

impl fmt::Debug for SpotifyCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotifyCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

#[derive(Args, Clone)]
pub struct YtMusicCredentials {
    /// Raw `Cookie` header copied from an authenticated music.youtube.com request
    #[arg(long = "ytmusic-cookie", env = "YTMUSIC_COOKIE", hide_env_values = true)]
    pub cookie: String,

    /// Index of the signed-in Google account the cookie belongs to
    #[arg(long = "ytmusic-auth-user", env = "YTMUSIC_AUTH_USER", default_value = "0")]
    pub auth_user: String,
}

impl fmt::Debug for YtMusicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YtMusicCredentials")
            .field("cookie", &"[REDACTED]")
            .field("auth_user", &self.auth_user)
            .finish()
    }
}

/// Playlist identifiers for both sides, treated as opaque strings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaylistPair {
    pub source: String,
    pub target: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncOptions {
    pub concurrency: usize,
    pub dry_run: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            dry_run: false,
        }
    }
}

impl SyncArgs {
    pub fn playlists(&self) -> PlaylistPair {
        PlaylistPair {
            source: self.spotify_playlist.clone(),
            target: self.ytmusic_playlist.clone(),
        }
    }

    pub fn options(&self) -> SyncOptions {
        SyncOptions {
            concurrency: self.concurrency.max(1),
            dry_run: self.dry_run,
        }
    }
}
