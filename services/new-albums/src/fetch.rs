//!
//! src/fetch.rs  Andrew Belles  Oct 2025
//!
//! Spotify Web API client. Builds requests for each endpoint the
//! curator touches and decodes the typed responses. No retries:
//! the first failure ends the run
//!

use async_trait::async_trait;
use reqwest::{header, redirect, Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};
use url::Url;

use crate::catalog::Catalog;
use crate::config::{HttpConfig, SpotifyConfig};
use crate::errors::CurateError;
use crate::types::{Album, Artist, Market, PlaylistId, PlaylistItem, Track};

/// Scopes the refresh token must have been granted
pub const SCOPES: [&str; 4] = [
    "playlist-read-private",
    "playlist-read-collaborative",
    "playlist-modify-public",
    "playlist-modify-private"
];

/// Client building functionality
fn client_helper(http: &HttpConfig) -> reqwest::ClientBuilder {
    Client::builder()
        .timeout(http.timeout)
        .connect_timeout(http.connect_timeout)
        .pool_max_idle_per_host(http.pool_max_idle_per_host)
        .pool_idle_timeout(Some(http.pool_idle_timeout))
        .redirect(redirect::Policy::limited(http.max_redirects as usize))
}

pub fn base_client(http: &HttpConfig) -> Result<Client, CurateError> {
    let mut h = header::HeaderMap::new();
    h.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
    client_helper(http)
        .default_headers(h)
        .build()
        .map_err(|e| CurateError::Http(format!("build client: {e}")))
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    items: Vec<T>
}

#[derive(Debug, Deserialize)]
struct NewReleasesResponse {
    albums: Page<Album>
}

#[derive(Debug, Deserialize)]
struct ArtistsResponse {
    artists: Vec<Option<Artist>>
}

#[derive(Debug, Deserialize)]
struct SnapshotResponse {
    snapshot_id: String
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    scope: Option<String>
}

/// Maps a failed response onto the error taxonomy
fn status_error(
    status: StatusCode,
    url: &Url,
    retry_after: Option<&str>,
    body: &str
) -> CurateError {
    match status {
        StatusCode::NOT_FOUND => CurateError::NotFound(format!("{url}")),
        StatusCode::TOO_MANY_REQUESTS => CurateError::RateLimited(
            format!("{url} retry-after {}", retry_after.unwrap_or("?"))
        ),
        _ => CurateError::Http(format!("status {status} for {url}: {body}"))
    }
}

/// Sends the request and decodes a successful body
async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, CurateError> {
    let response = request.send().await?;
    let status = response.status();

    if status.is_success() {
        let body = response.text().await?;
        return Ok(serde_json::from_str(&body)?);
    }

    let retry_after = response.headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let url = response.url().clone();
    let body = response.text().await.unwrap_or_default();

    Err(status_error(status, &url, retry_after.as_deref(), &body))
}

#[derive(Clone, Debug)]
pub struct SpotifyClient {
    pub http: Client,
    pub cfg: SpotifyConfig,
    bearer: String
}

impl SpotifyClient {
    pub fn new(http_config: &HttpConfig, cfg: &SpotifyConfig) ->
        Result<Self, CurateError> {

        let http = base_client(http_config)?;
        Ok( Self {
            http,
            cfg: cfg.clone(),
            bearer: String::new()
        })
    }

    /// Exchanges the configured refresh token for a bearer token
    pub async fn authorize(&mut self) -> Result<(), CurateError> {
        let token: TokenResponse = send_json(self.token_request()).await?;
        info!(scope = token.scope.as_deref().unwrap_or(""), "spotify.authorized");
        self.bearer = token.access_token;
        Ok(())
    }

    pub fn token_request(&self) -> RequestBuilder {
        self.http
            .post(self.cfg.token_url.clone())
            .basic_auth(&self.cfg.client_id, Some(&self.cfg.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.cfg.refresh_token.as_str())
            ])
    }

    fn endpoint(&self, path: &str) -> Result<Url, CurateError> {
        self.cfg.api_base.join(path)
            .map_err(|e| CurateError::Config(format!("endpoint {path}: {e}")))
    }

    /// GET /v1/browse/new-releases?country=&limit=&offset=
    pub fn new_releases_request(&self, market: &Market, limit: u32, offset: u32) ->
        Result<RequestBuilder, CurateError> {
        let url = self.endpoint("browse/new-releases")?;
        let mut rb = self.http.get(url).bearer_auth(&self.bearer).query(&[
            ("limit", limit.to_string()),
            ("offset", offset.to_string())
        ]);
        if let Some(country) = market.code() {
            rb = rb.query(&[("country", country)]);
        }
        Ok(rb)
    }

    /// GET /v1/albums/{id}/tracks?limit=&offset=
    pub fn album_tracks_request(&self, album_id: &str, limit: u32, offset: u32) ->
        Result<RequestBuilder, CurateError> {
        let url = self.endpoint(&format!("albums/{album_id}/tracks"))?;
        Ok(self.http.get(url).bearer_auth(&self.bearer).query(&[
            ("limit", limit.to_string()),
            ("offset", offset.to_string())
        ]))
    }

    /// GET /v1/artists?ids=...
    pub fn artists_request(&self, ids: &[String]) -> Result<RequestBuilder, CurateError> {
        let url = self.endpoint("artists")?;
        Ok(self.http.get(url).bearer_auth(&self.bearer).query(&[("ids", ids.join(","))]))
    }

    /// GET /v1/playlists/{id}/tracks?limit=&offset=
    pub fn playlist_items_request(&self, playlist: &PlaylistId, limit: u32, offset: u32) ->
        Result<RequestBuilder, CurateError> {
        let url = self.endpoint(&format!("playlists/{playlist}/tracks"))?;
        Ok(self.http.get(url).bearer_auth(&self.bearer).query(&[
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
            ("fields", "items(track(id,uri,name))".to_string())
        ]))
    }

    /// DELETE /v1/playlists/{id}/tracks
    pub fn remove_request(&self, playlist: &PlaylistId, uris: &[String]) ->
        Result<RequestBuilder, CurateError> {
        let url = self.endpoint(&format!("playlists/{playlist}/tracks"))?;
        let tracks: Vec<_> = uris.iter().map(|uri| json!({ "uri": uri })).collect();
        Ok(self.http.delete(url).bearer_auth(&self.bearer).json(&json!({ "tracks": tracks })))
    }

    /// POST /v1/playlists/{id}/tracks
    pub fn add_request(&self, playlist: &PlaylistId, uris: &[String]) ->
        Result<RequestBuilder, CurateError> {
        let url = self.endpoint(&format!("playlists/{playlist}/tracks"))?;
        Ok(self.http.post(url).bearer_auth(&self.bearer).json(&json!({ "uris": uris })))
    }
}

#[async_trait]
impl Catalog for SpotifyClient {
    async fn new_releases(&self, market: &Market, limit: u32, offset: u32) ->
        Result<Vec<Album>, CurateError> {
        let response: NewReleasesResponse =
            send_json(self.new_releases_request(market, limit, offset)?).await?;
        Ok(response.albums.items)
    }

    async fn album_tracks(&self, album_id: &str, limit: u32, offset: u32) ->
        Result<Vec<Track>, CurateError> {
        let response: Page<Track> =
            send_json(self.album_tracks_request(album_id, limit, offset)?).await?;
        Ok(response.items)
    }

    async fn artists(&self, ids: &[String]) -> Result<Vec<Artist>, CurateError> {
        let response: ArtistsResponse = send_json(self.artists_request(ids)?).await?;
        Ok(response.artists.into_iter().flatten().collect())
    }

    async fn playlist_items(&self, playlist: &PlaylistId, limit: u32, offset: u32) ->
        Result<Vec<PlaylistItem>, CurateError> {
        let response: Page<PlaylistItem> =
            send_json(self.playlist_items_request(playlist, limit, offset)?).await?;
        Ok(response.items)
    }

    async fn playlist_remove_all(&self, playlist: &PlaylistId, uris: &[String]) ->
        Result<(), CurateError> {
        let response: SnapshotResponse = send_json(self.remove_request(playlist, uris)?).await?;
        debug!(snapshot = %response.snapshot_id, n = uris.len(), "spotify.removed");
        Ok(())
    }

    async fn playlist_add(&self, playlist: &PlaylistId, uris: &[String]) ->
        Result<(), CurateError> {
        let response: SnapshotResponse = send_json(self.add_request(playlist, uris)?).await?;
        debug!(snapshot = %response.snapshot_id, n = uris.len(), "spotify.added");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SpotifyClient {
        let cfg = SpotifyConfig {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            refresh_token: "refresh".to_string(),
            token_url: Url::parse("https://accounts.spotify.com/api/token").unwrap(),
            api_base: Url::parse("https://api.spotify.com/v1/").unwrap()
        };
        SpotifyClient::new(&HttpConfig::default(), &cfg).unwrap()
    }

    fn query(request: &reqwest::Request) -> Vec<(String, String)> {
        request.url().query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect()
    }

    #[test]
    fn new_releases_without_country() {
        let request = client()
            .new_releases_request(&Market(None), 50, 100).unwrap()
            .build().unwrap();
        assert_eq!(request.url().path(), "/v1/browse/new-releases");
        assert_eq!(query(&request), vec![
            ("limit".to_string(), "50".to_string()),
            ("offset".to_string(), "100".to_string())
        ]);
    }

    #[test]
    fn new_releases_with_country() {
        let request = client()
            .new_releases_request(&Market(Some("SE".to_string())), 50, 0).unwrap()
            .build().unwrap();
        assert!(query(&request).contains(&("country".to_string(), "SE".to_string())));
    }

    #[test]
    fn artists_are_comma_joined() {
        let ids = vec!["a".to_string(), "b".to_string()];
        let request = client().artists_request(&ids).unwrap().build().unwrap();
        assert_eq!(request.url().path(), "/v1/artists");
        assert_eq!(query(&request), vec![("ids".to_string(), "a,b".to_string())]);
    }

    #[test]
    fn add_posts_uris_in_order() {
        let uris = vec!["spotify:track:1".to_string(), "spotify:track:2".to_string()];
        let request = client()
            .add_request(&PlaylistId("p1".to_string()), &uris).unwrap()
            .build().unwrap();
        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().path(), "/v1/playlists/p1/tracks");

        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        let body: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(body, json!({ "uris": ["spotify:track:1", "spotify:track:2"] }));
    }

    #[test]
    fn remove_deletes_track_objects() {
        let uris = vec!["spotify:track:1".to_string()];
        let request = client()
            .remove_request(&PlaylistId("p1".to_string()), &uris).unwrap()
            .build().unwrap();
        assert_eq!(request.method(), reqwest::Method::DELETE);

        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        let body: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(body, json!({ "tracks": [{ "uri": "spotify:track:1" }] }));
    }

    #[test]
    fn token_request_uses_refresh_grant() {
        let request = client().token_request().build().unwrap();
        assert_eq!(request.method(), reqwest::Method::POST);
        assert!(request.headers().contains_key(header::AUTHORIZATION));

        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        let body = std::str::from_utf8(body).unwrap();
        assert_eq!(body, "grant_type=refresh_token&refresh_token=refresh");
    }

    fn tracks_url() -> Url {
        Url::parse("https://api.spotify.com/v1/albums/abc/tracks").unwrap()
    }

    #[test]
    fn missing_resource_is_not_found() {
        let err = status_error(StatusCode::NOT_FOUND, &tracks_url(), None, "");
        assert!(matches!(err, CurateError::NotFound(ref m) if m.contains("/albums/abc/tracks")));
    }

    #[test]
    fn throttled_response_carries_retry_after() {
        let err = status_error(StatusCode::TOO_MANY_REQUESTS, &tracks_url(), Some("30"), "");
        assert!(matches!(err, CurateError::RateLimited(ref m) if m.ends_with("retry-after 30")));

        let err = status_error(StatusCode::TOO_MANY_REQUESTS, &tracks_url(), None, "");
        assert!(matches!(err, CurateError::RateLimited(ref m) if m.ends_with("retry-after ?")));
    }

    #[test]
    fn other_failures_are_http_errors() {
        let body = r#"{"error":{"status":500,"message":"Server error"}}"#;
        let err = status_error(StatusCode::INTERNAL_SERVER_ERROR, &tracks_url(), None, body);
        assert!(matches!(err, CurateError::Http(ref m)
            if m.starts_with("status 500") && m.contains("Server error")));

        let err = status_error(StatusCode::UNAUTHORIZED, &tracks_url(), Some("5"), "");
        assert!(matches!(err, CurateError::Http(_)));
    }

    #[test]
    fn new_releases_page_decodes() {
        let raw = json!({
            "albums": {
                "href": "https://api.spotify.com/v1/browse/new-releases?offset=0&limit=1",
                "items": [{
                    "id": "5Z9iiGl2FcIfa3BMiv6OIw",
                    "uri": "spotify:album:5Z9iiGl2FcIfa3BMiv6OIw",
                    "name": "Currents",
                    "album_type": "album",
                    "release_date": "2015-07-17",
                    "artists": [{
                        "id": "5INjqkS1o8h1imAzPqGZBb",
                        "uri": "spotify:artist:5INjqkS1o8h1imAzPqGZBb",
                        "name": "Tame Impala"
                    }]
                }],
                "limit": 1,
                "offset": 0,
                "total": 100
            }
        });
        let page: NewReleasesResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(page.albums.items.len(), 1);
        assert_eq!(page.albums.items[0].artists[0].name, "Tame Impala");
    }
}
