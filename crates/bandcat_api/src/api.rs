//! Catalog request handlers.
//!
//! # Contract
//! | Call          | Success | Failure                                    |
//! |---------------|---------|--------------------------------------------|
//! | `get_bands`   | 200     | 404 named band absent                      |
//! | `list_songs`  | 200     | 400 bad page, bad query or offset past end |
//! | `get_song`    | 200     | 404 absent                                 |
//! | `create_song` | 201     | 400 missing title or unknown band          |
//! | `update_song` | 200     | 404 absent or unknown band, 400 blank field|
//! | `delete_song` | 204     | 404 absent                                 |
//!
//! Storage failures map to 500 on every call.

use bandcat_core::service::catalog_service::{DEFAULT_PAGE_INDEX, DEFAULT_PAGE_SIZE};
use bandcat_core::{
    CatalogError, CatalogRepository, CatalogService, ErrorKind, NewSong, SongId, SongListQuery,
    SongPatch,
};
use log::{debug, error};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const STATUS_OK: u16 = 200;
pub const STATUS_CREATED: u16 = 201;
pub const STATUS_NO_CONTENT: u16 = 204;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Status plus optional JSON body, ready for any transport to frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiResponse {
    fn json(status: u16, value: impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => Self {
                status,
                body: Some(body),
            },
            Err(err) => Self::error(STATUS_INTERNAL_ERROR, format!("encode failed: {err}")),
        }
    }

    fn no_content() -> Self {
        Self {
            status: STATUS_NO_CONTENT,
            body: None,
        }
    }

    fn error(status: u16, detail: impl Into<String>) -> Self {
        Self {
            status,
            body: Some(json!({ "detail": detail.into() })),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Query parameters for song listing; absent paging values use defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SongListParams {
    pub band: Option<String>,
    pub title: Option<String>,
    pub page_index: Option<u32>,
    pub page_size: Option<u32>,
}

impl SongListParams {
    fn to_query(&self) -> SongListQuery {
        SongListQuery {
            band: self.band.clone(),
            title: self.title.clone(),
            page_index: self.page_index.unwrap_or(DEFAULT_PAGE_INDEX),
            page_size: self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }
}

/// Which handler produced an error; some mappings differ per endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    GetBands,
    ListSongs,
    GetSong,
    CreateSong,
    UpdateSong,
    DeleteSong,
}

impl Endpoint {
    fn label(self) -> &'static str {
        match self {
            Self::GetBands => "get_bands",
            Self::ListSongs => "list_songs",
            Self::GetSong => "get_song",
            Self::CreateSong => "create_song",
            Self::UpdateSong => "update_song",
            Self::DeleteSong => "delete_song",
        }
    }
}

/// API handlers bound to one backend chosen at startup.
pub struct CatalogApi<R: CatalogRepository> {
    service: CatalogService<R>,
}

impl<R: CatalogRepository> CatalogApi<R> {
    pub fn new(repo: R) -> Self {
        Self {
            service: CatalogService::new(repo),
        }
    }

    pub fn service(&self) -> &CatalogService<R> {
        &self.service
    }

    /// Landing payload naming the active storage kind.
    pub fn root(&self) -> ApiResponse {
        ApiResponse::json(
            STATUS_OK,
            json!({
                "message": "BanG Dream! band catalog API",
                "storage_type": self.service.storage_kind().as_str(),
                "version": bandcat_core::core_version(),
            }),
        )
    }

    pub fn health(&self) -> ApiResponse {
        ApiResponse::json(STATUS_OK, json!({ "status": "healthy" }))
    }

    /// `GET /bands?name=`
    pub fn get_bands(&self, name: Option<&str>) -> ApiResponse {
        let result = self.service.get_bands(name);
        respond(Endpoint::GetBands, result, STATUS_OK)
    }

    /// `GET /songs?band=&title=&page_index=&page_size=`
    pub fn list_songs(&self, params: &SongListParams) -> ApiResponse {
        let result = self.service.list_songs(&params.to_query());
        respond(Endpoint::ListSongs, result, STATUS_OK)
    }

    /// `GET /songs` with the query already decoded into a JSON object.
    pub fn list_songs_json(&self, query: &str) -> ApiResponse {
        match parse_body::<SongListParams>(query) {
            Ok(params) => self.list_songs(&params),
            Err(response) => response,
        }
    }

    /// `GET /songs/{id}`
    pub fn get_song(&self, id: SongId) -> ApiResponse {
        respond(Endpoint::GetSong, self.service.get_song(id), STATUS_OK)
    }

    /// `POST /songs`
    pub fn create_song(&self, song: &NewSong) -> ApiResponse {
        let result = self.service.create_song(song);
        respond(Endpoint::CreateSong, result, STATUS_CREATED)
    }

    /// `POST /songs` with a raw JSON body.
    pub fn create_song_json(&self, body: &str) -> ApiResponse {
        match parse_body::<NewSong>(body) {
            Ok(song) => self.create_song(&song),
            Err(response) => response,
        }
    }

    /// `PUT /songs/{id}`
    pub fn update_song(&self, id: SongId, patch: &SongPatch) -> ApiResponse {
        let result = self.service.update_song(id, patch);
        respond(Endpoint::UpdateSong, result, STATUS_OK)
    }

    /// `PUT /songs/{id}` with a raw JSON body.
    pub fn update_song_json(&self, id: SongId, body: &str) -> ApiResponse {
        match parse_body::<SongPatch>(body) {
            Ok(patch) => self.update_song(id, &patch),
            Err(response) => response,
        }
    }

    /// `DELETE /songs/{id}`
    pub fn delete_song(&self, id: SongId) -> ApiResponse {
        match self.service.delete_song(id) {
            Ok(()) => {
                debug!(
                    "event=api_call module=api status=ok endpoint={} http_status={}",
                    Endpoint::DeleteSong.label(),
                    STATUS_NO_CONTENT
                );
                ApiResponse::no_content()
            }
            Err(err) => error_response(Endpoint::DeleteSong, &err),
        }
    }
}

fn respond<T: Serialize>(
    endpoint: Endpoint,
    result: Result<T, CatalogError>,
    success_status: u16,
) -> ApiResponse {
    match result {
        Ok(value) => {
            debug!(
                "event=api_call module=api status=ok endpoint={} http_status={}",
                endpoint.label(),
                success_status
            );
            ApiResponse::json(success_status, value)
        }
        Err(err) => error_response(endpoint, &err),
    }
}

fn error_response(endpoint: Endpoint, err: &CatalogError) -> ApiResponse {
    let status = status_for(endpoint, err);
    if status == STATUS_INTERNAL_ERROR {
        error!(
            "event=api_call module=api status=error endpoint={} http_status={} error={}",
            endpoint.label(),
            status,
            err
        );
    } else {
        debug!(
            "event=api_call module=api status=rejected endpoint={} http_status={}",
            endpoint.label(),
            status
        );
    }
    ApiResponse::error(status, err.to_string())
}

fn status_for(endpoint: Endpoint, err: &CatalogError) -> u16 {
    match (endpoint, err.kind()) {
        (_, ErrorKind::NotFound) => STATUS_NOT_FOUND,
        (_, ErrorKind::Storage) => STATUS_INTERNAL_ERROR,
        (Endpoint::UpdateSong, ErrorKind::Validation)
            if matches!(err, CatalogError::UnknownBand(_)) =>
        {
            STATUS_NOT_FOUND
        }
        (_, ErrorKind::Validation) => STATUS_BAD_REQUEST,
    }
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiResponse> {
    serde_json::from_str(body).map_err(|err| {
        ApiResponse::error(STATUS_BAD_REQUEST, format!("malformed request body: {err}"))
    })
}
