//! Theme catalogue routes.

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use crate::poll::theme::{self, ColorScheme, PALETTES, Palette};

/// `GET /api/themes` — every palette with both schemes.
pub async fn list_themes() -> Json<Vec<Palette>> {
    Json(PALETTES.to_vec())
}

#[derive(Deserialize)]
pub struct CssQuery {
    #[serde(default)]
    pub scheme: ColorScheme,
}

/// `GET /api/themes/:name/css` — CSS custom properties for one palette.
pub async fn theme_css(Path(name): Path<String>, Query(query): Query<CssQuery>) -> Response {
    let Some(palette) = theme::find_palette(&name) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    ([(CONTENT_TYPE, "text/css; charset=utf-8")], palette.css(query.scheme)).into_response()
}

#[cfg(test)]
#[path = "themes_test.rs"]
mod tests;
