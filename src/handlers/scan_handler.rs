use actix_web::{get, post, web, HttpResponse};
use serde_json::json;

use crate::{
    app_state::AppState,
    errors::AppError,
    relay::{parse_relay_message, ScanResponse},
    services::scan_router,
};

/// Phone-camera scan callout. The path shape matches what the printed QR
/// codes encode: `/parties/main/{room_id}/{token}`.
#[get("/parties/main/{room_id}/{token}")]
pub async fn scan_callout(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (room_id, token) = path.into_inner();

    let room = state.room(&room_id).await;
    room.handle_scan(&token).await;

    // Scan noise still gets a friendly page; it just does nothing.
    Ok(HttpResponse::Ok().json(ScanResponse::ok(scan_router::scan_message(&token))))
}

/// Relay-delivered message for a room. The payload is validated as a tagged
/// union at this boundary; anything malformed is a 400, never field-probed.
#[post("/api/rooms/{room_id}/messages")]
pub async fn relay_message(
    state: web::Data<AppState>,
    room_id: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let body = std::str::from_utf8(&body)
        .map_err(|_| AppError::BadRequest("relay message is not valid UTF-8".to_string()))?;
    let message = parse_relay_message(body)?;

    let room = state.room(&room_id).await;
    room.handle_scan(message.token()).await;

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[get("/api/rooms/{room_id}/state")]
pub async fn room_state(
    state: web::Data<AppState>,
    room_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let room = state.room(&room_id).await;
    Ok(HttpResponse::Ok().json(room.snapshot().await))
}

#[post("/api/rooms/{room_id}/start")]
pub async fn start_round(
    state: web::Data<AppState>,
    room_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let room = state.room(&room_id).await;
    room.start_round().await;
    Ok(HttpResponse::Ok().json(room.snapshot().await))
}

#[get("/api/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
