//! Session builders for both catalogs
//!
//! Credentials always come from configuration; this module only turns them
//! into ready-to-use sessions.

use anyhow::{anyhow, Result};
use chrono::Utc;
use rspotify::{prelude::*, AuthCodeSpotify, Config, Credentials, OAuth, Token};
use sha1::{Digest, Sha1};

use crate::config::SpotifyCredentials;

pub const SCOPES: &str = "playlist-read-private playlist-read-collaborative playlist-modify-private playlist-modify-public";

const RESPONSE: &str = r#"
<!doctype html>
<html>
<head><title>Success</title></head>
<body><h1>Authentication Successful!</h1><p>You can close this window and copy the refresh token from the terminal.</p><script>window.close();</script></body>
</html>
"#;

/// Runs the browser login and returns the refresh token to store as `SPOTIFY_REFRESH_TOKEN`
pub async fn obtain_spotify_refresh_token(client_id: &str, redirect_uri: &str) -> Result<String> {
    tracing::info!("Starting browser-based OAuth flow");
    let client = librespot_oauth::OAuthClientBuilder::new(
        client_id,
        redirect_uri,
        SCOPES.split_whitespace().collect(),
    )
    .open_in_browser()
    .with_custom_message(RESPONSE)
    .build()?;

    let token = client.get_access_token_async().await?;
    if token.refresh_token.is_empty() {
        return Err(anyhow!("Spotify did not return a refresh token; check the scopes and redirect URI"));
    }

    tracing::info!("Browser authentication completed successfully");
    Ok(token.refresh_token)
}

/// Authorized rspotify client built from a stored refresh token
pub async fn spotify_session(credentials: &SpotifyCredentials) -> Result<AuthCodeSpotify> {
    let oauth = OAuth {
        redirect_uri: credentials.redirect_uri.clone(),
        scopes: SCOPES.split_whitespace().map(|s| s.to_string()).collect(),
        ..Default::default()
    };
    let spotify = AuthCodeSpotify::with_config(
        Credentials::new(&credentials.client_id, &credentials.client_secret),
        oauth,
        Config {
            token_cached: false,
            token_refreshing: true,
            ..Default::default()
        },
    );

    *spotify
        .token
        .lock()
        .await
        .map_err(|_| anyhow!("Spotify token lock unavailable"))? = Some(Token {
        refresh_token: Some(credentials.refresh_token.clone()),
        ..Default::default()
    });

    spotify.refresh_token().await?;
    tracing::debug!("Spotify access token refreshed");
    Ok(spotify)
}

/// Cookie-authenticated YouTube Music browser session
#[derive(Clone)]
pub struct YtMusicSession {
    cookie: String,
    sapisid: String,
    auth_user: String,
}

impl YtMusicSession {
    pub fn from_cookie(cookie: &str) -> Result<Self> {
        let cookie = cookie.trim();
        let sapisid = cookie_value(cookie, "__Secure-3PAPISID")
            .or_else(|| cookie_value(cookie, "SAPISID"))
            .ok_or_else(|| anyhow!("YouTube Music cookie has no SAPISID; copy it from a signed-in request"))?;

        Ok(Self {
            cookie: cookie.to_string(),
            sapisid: sapisid.to_string(),
            auth_user: "0".to_string(),
        })
    }

    pub fn with_auth_user(mut self, auth_user: &str) -> Self {
        self.auth_user = auth_user.to_string();
        self
    }

    pub fn cookie(&self) -> &str {
        &self.cookie
    }

    pub fn auth_user(&self) -> &str {
        &self.auth_user
    }

    /// `Authorization` header value for a request sent from `origin`
    pub fn authorization(&self, origin: &str) -> String {
        self.authorization_at(Utc::now().timestamp(), origin)
    }

    fn authorization_at(&self, timestamp: i64, origin: &str) -> String {
        let digest = Sha1::digest(format!("{} {} {}", timestamp, self.sapisid, origin).as_bytes());
        format!("SAPISIDHASH {}_{}", timestamp, hex::encode(digest))
    }
}

fn cookie_value<'a>(cookie: &'a str, name: &str) -> Option<&'a str> {
    cookie
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}
