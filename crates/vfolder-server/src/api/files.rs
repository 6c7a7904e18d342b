//! Browse, download and upload endpoints

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::io::Cursor;
use vfolder::{ListResult, Resource};

/// Fallback when neither the part nor the file name tells us the type
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Query parameters for paginated listings
#[derive(Debug, Default, Deserialize)]
pub struct CursorQuery {
    pub cursor: Option<String>,
}

/// Query parameters for `/list/folder`
#[derive(Debug, Default, Deserialize)]
pub struct FolderQuery {
    #[serde(rename = "folderId")]
    pub folder_id: Option<String>,
    pub cursor: Option<String>,
}

/// Query parameters for id-addressed endpoints
#[derive(Debug, Default, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

/// GET /list
pub async fn list_root(
    State(state): State<AppState>,
    Query(query): Query<CursorQuery>,
) -> ApiResult<Json<ListResult<Resource>>> {
    let page = state.service.list_root(query.cursor.as_deref()).await?;
    Ok(Json(page))
}

/// GET /list/:folder_id
pub async fn list_folder(
    State(state): State<AppState>,
    Path(folder_id): Path<String>,
    Query(query): Query<CursorQuery>,
) -> ApiResult<Json<ListResult<Resource>>> {
    let page = state
        .service
        .list_folder(&folder_id, query.cursor.as_deref())
        .await?;
    Ok(Json(page))
}

/// GET /list/folder?folderId=&cursor=
pub async fn list_folder_by_query(
    State(state): State<AppState>,
    Query(query): Query<FolderQuery>,
) -> ApiResult<Json<ListResult<Resource>>> {
    let folder_id = query.folder_id.unwrap_or_default();
    let page = state
        .service
        .list_folder(&folder_id, query.cursor.as_deref())
        .await?;
    Ok(Json(page))
}

/// GET /resource/:id
pub async fn get_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Resource>> {
    Ok(Json(state.service.get_resource(&id).await?))
}

/// GET /resource?id=
pub async fn get_resource_by_query(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Json<Resource>> {
    let id = query.id.unwrap_or_default();
    Ok(Json(state.service.get_resource(&id).await?))
}

/// GET /download/:id
pub async fn download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    download_response(&state, &id).await
}

/// GET /download?id=
pub async fn download_by_query(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Response> {
    download_response(&state, &query.id.unwrap_or_default()).await
}

async fn download_response(state: &AppState, id: &str) -> ApiResult<Response> {
    let (resource, file) = state.service.download(id).await?;
    let len = file.len();

    // The stream owns the temporary file; it is removed when the body is dropped
    let stream = file
        .into_stream()
        .map_err(|e| ApiError::Internal(format!("Failed to open downloaded file: {}", e)))?;

    let disposition = content_disposition(resource.name());
    let mut response = Body::from_stream(stream).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(DEFAULT_CONTENT_TYPE),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    tracing::debug!("Serving {} ({} bytes)", resource.id(), len);
    Ok(response)
}

/// `attachment; filename="<name>"` with quotes and backslashes escaped
fn content_disposition(name: &str) -> String {
    let escaped: String = name
        .chars()
        .filter(|c| !c.is_control())
        .flat_map(|c| match c {
            '"' | '\\' => vec!['\\', c],
            _ => vec![c],
        })
        .collect();
    format!("attachment; filename=\"{}\"", escaped)
}

/// POST /upload (multipart: `file`, `key`)
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<String> {
    let mut key: Option<String> = None;
    let mut file_data: Option<axum::body::Bytes> = None;
    let mut content_type: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "key" => {
                key = Some(field.text().await?);
            }
            "file" => {
                content_type = field
                    .content_type()
                    .map(str::to_string)
                    .or_else(|| {
                        field
                            .file_name()
                            .and_then(|f| mime_guess::from_path(f).first_raw())
                            .map(str::to_string)
                    })
                    .or_else(|| Some(DEFAULT_CONTENT_TYPE.to_string()));
                file_data = Some(field.bytes().await?);
            }
            _ => {}
        }
    }

    let key = key.ok_or_else(|| ApiError::BadRequest("Missing key part".to_string()))?;
    let file_data =
        file_data.ok_or_else(|| ApiError::BadRequest("Missing file part".to_string()))?;

    let length = file_data.len() as u64;
    state
        .service
        .upload_file(&key, Box::new(Cursor::new(file_data)), content_type, length)
        .await?;

    Ok(format!("File uploaded successfully with key: {}", key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition() {
        assert_eq!(
            content_disposition("report.pdf"),
            "attachment; filename=\"report.pdf\""
        );
        assert_eq!(
            content_disposition("say \"hi\".txt"),
            "attachment; filename=\"say \\\"hi\\\".txt\""
        );
    }
}
