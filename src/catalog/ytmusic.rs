//! YouTube Music catalog over the InnerTube web API
//!
//! Requests are signed with the browser cookie of a signed-in user, the same
//! way music.youtube.com signs its own calls. Responses are walked as raw JSON
//! since the renderer layout nests differently between pages.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{AUTHORIZATION, COOKIE, ORIGIN};
use serde::Serialize;
use serde_json::Value;

use super::Catalog;
use crate::auth::YtMusicSession;
use crate::config::YTMUSIC_MAX_BATCH;
use crate::model::{PlaylistSnapshot, Track};

pub const DEFAULT_BASE_URL: &str = "https://music.youtube.com/youtubei/v1";
const MUSIC_ORIGIN: &str = "https://music.youtube.com";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Search params restricting results to songs
const SONGS_FILTER: &str = "EgWKAQIIAWoMEA4QChADEAQQCRAF";
const LIST_ITEM: &str = "musicResponsiveListItemRenderer";

#[derive(Serialize)]
struct ClientContext {
    client: ClientInfo,
    user: EmptyObject,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientInfo {
    client_name: &'static str,
    client_version: String,
    hl: &'static str,
}

#[derive(Serialize)]
struct EmptyObject {}

#[derive(Serialize)]
struct Request<P: Serialize> {
    context: ClientContext,
    #[serde(flatten)]
    payload: P,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BrowseRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    browse_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    continuation: Option<&'a str>,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    params: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EditPlaylistRequest<'a> {
    playlist_id: &'a str,
    actions: Vec<EditAction<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EditAction<'a> {
    action: &'static str,
    added_video_id: &'a str,
    dedupe_option: &'static str,
}

/// One page of a playlist listing
#[derive(Debug, Default, PartialEq)]
pub struct PlaylistPage {
    pub tracks: Vec<Track>,
    pub continuation: Option<String>,
}

pub struct YtMusicCatalog {
    http: reqwest::Client,
    base_url: String,
    session: YtMusicSession,
    max_batch_size: usize,
}

impl YtMusicCatalog {
    pub fn new(session: YtMusicSession) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            session,
            max_batch_size: YTMUSIC_MAX_BATCH,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = size.max(1);
        self
    }

    async fn post<P: Serialize + Send>(&self, endpoint: &str, payload: P) -> Result<Value> {
        let url = format!("{}/{}?alt=json&prettyPrint=false", self.base_url, endpoint);
        let body = Request {
            context: context(),
            payload,
        };

        let response = self
            .http
            .post(&url)
            .header(COOKIE, self.session.cookie())
            .header(AUTHORIZATION, self.session.authorization(MUSIC_ORIGIN))
            .header(ORIGIN, MUSIC_ORIGIN)
            .header("X-Origin", MUSIC_ORIGIN)
            .header("X-Goog-AuthUser", self.session.auth_user())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("YouTube Music {} returned {}: {}", endpoint, status, text);
        }
        Ok(response.json().await?)
    }
}

fn context() -> ClientContext {
    ClientContext {
        client: ClientInfo {
            client_name: "WEB_REMIX",
            client_version: format!("1.{}.01.00", Utc::now().format("%Y%m%d")),
            hl: "en",
        },
        user: EmptyObject {},
    }
}

/// Browse id of a playlist page; accepts ids with or without the `VL` prefix
pub fn browse_id(playlist_id: &str) -> String {
    if playlist_id.starts_with("VL") {
        playlist_id.to_string()
    } else {
        format!("VL{}", playlist_id)
    }
}

/// Playlist id expected by the edit endpoint
pub fn edit_playlist_id(playlist_id: &str) -> &str {
    playlist_id.strip_prefix("VL").unwrap_or(playlist_id)
}

fn collect_list_items<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == LIST_ITEM {
                    out.push(child);
                } else {
                    collect_list_items(child, out);
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_list_items(item, out)),
        _ => {}
    }
}

fn find_string<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    match value {
        Value::Object(map) => map
            .get(key)
            .and_then(Value::as_str)
            .or_else(|| map.values().find_map(|child| find_string(child, key))),
        Value::Array(items) => items.iter().find_map(|item| find_string(item, key)),
        _ => None,
    }
}

fn find_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map
            .get(key)
            .or_else(|| map.values().find_map(|child| find_key(child, key))),
        Value::Array(items) => items.iter().find_map(|item| find_key(item, key)),
        _ => None,
    }
}

/// Rows of the playlist shelf and the shelf itself when the page has one.
///
/// Only the shelf is read: a browse response also carries suggestion
/// sections with rows and continuations of their own.
fn playlist_rows(response: &Value) -> (&[Value], Option<&Value>) {
    let shelf = find_key(response, "musicPlaylistShelfRenderer")
        .or_else(|| find_key(response, "musicPlaylistShelfContinuation"));
    let rows = match shelf {
        Some(shelf) => shelf["contents"].as_array(),
        None => find_key(response, "appendContinuationItemsAction")
            .and_then(|action| action["continuationItems"].as_array()),
    };
    (rows.map(Vec::as_slice).unwrap_or_default(), shelf)
}

fn column_text(item: &Value, column: usize) -> String {
    item["flexColumns"][column]["musicResponsiveListItemFlexColumnRenderer"]["text"]["runs"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

/// Tracks and next-page token of a `browse` response
pub fn parse_playlist_page(response: &Value) -> PlaylistPage {
    let (rows, shelf) = playlist_rows(response);

    let tracks = rows
        .iter()
        .filter_map(|row| row.get(LIST_ITEM))
        .map(|item| Track::new(column_text(item, 0), column_text(item, 1)))
        .collect();

    // Newer pages end the row list with a continuation item, older ones keep
    // the token next to the rows.
    let continuation = rows
        .iter()
        .rev()
        .find_map(|row| row["continuationItemRenderer"]["continuationEndpoint"]["continuationCommand"]["token"].as_str())
        .or_else(|| shelf.and_then(|shelf| shelf["continuations"][0]["nextContinuationData"]["continuation"].as_str()))
        .map(str::to_string);

    PlaylistPage { tracks, continuation }
}

/// Video id of the first playable result of a `search` response
pub fn parse_top_hit(response: &Value) -> Option<String> {
    let mut items = Vec::new();
    collect_list_items(response, &mut items);
    items
        .into_iter()
        .find_map(|item| find_string(item, "videoId"))
        .map(|id| id.to_string())
}

#[async_trait]
impl Catalog for YtMusicCatalog {
    fn name(&self) -> &str {
        "YouTube Music"
    }

    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    async fn ensure_ready(&self) -> Result<()> {
        self.post("account/account_menu", EmptyObject {})
            .await
            .context("YouTube Music rejected the session cookie")?;
        tracing::debug!("YouTube Music session ready");
        Ok(())
    }

    async fn list_playlist_tracks(&self, playlist_id: &str) -> Result<PlaylistSnapshot> {
        tracing::debug!(playlist_id, "API: browse playlist");
        let browse_id = browse_id(playlist_id);
        let response = self
            .post(
                "browse",
                BrowseRequest {
                    browse_id: Some(&browse_id),
                    continuation: None,
                },
            )
            .await
            .with_context(|| format!("page 1 of playlist {}", playlist_id))?;

        let mut page = parse_playlist_page(&response);
        let mut tracks = std::mem::take(&mut page.tracks);
        let mut seen = HashSet::new();
        let mut pages = 1;

        while let Some(token) = page.continuation.take() {
            if !seen.insert(token.clone()) {
                bail!("playlist {} repeated a continuation token after page {}", playlist_id, pages);
            }
            pages += 1;
            let response = self
                .post(
                    "browse",
                    BrowseRequest {
                        browse_id: None,
                        continuation: Some(&token),
                    },
                )
                .await
                .with_context(|| format!("page {} of playlist {}", pages, playlist_id))?;
            page = parse_playlist_page(&response);
            tracks.append(&mut page.tracks);
        }

        tracing::info!(playlist_id, pages, count = tracks.len(), "YouTube Music playlist listed");
        Ok(tracks)
    }

    async fn find_track(&self, query: &str) -> Result<Option<String>> {
        tracing::trace!(query, "API: search");
        let response = self
            .post(
                "search",
                SearchRequest {
                    query,
                    params: SONGS_FILTER,
                },
            )
            .await?;
        Ok(parse_top_hit(&response))
    }

    async fn add_batch(&self, playlist_id: &str, identifiers: &[String]) -> Result<()> {
        tracing::debug!(playlist_id, count = identifiers.len(), "API: edit_playlist");
        let request = EditPlaylistRequest {
            playlist_id: edit_playlist_id(playlist_id),
            actions: identifiers
                .iter()
                .map(|video_id| EditAction {
                    action: "ACTION_ADD_VIDEO",
                    added_video_id: video_id,
                    dedupe_option: "DEDUPE_OPTION_SKIP",
                })
                .collect(),
        };

        let response = self.post("browse/edit_playlist", request).await?;
        match response.get("status").and_then(Value::as_str) {
            Some("STATUS_SUCCEEDED") => Ok(()),
            status => Err(anyhow!(
                "edit_playlist on {} returned status {}",
                playlist_id,
                status.unwrap_or("<missing>")
            )),
        }
    }
}
