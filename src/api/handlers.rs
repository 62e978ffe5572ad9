//! HTTP handlers for the link API

use actix_web::http::StatusCode;
use actix_web::http::header::{LOCATION, REFERER, USER_AGENT};
use actix_web::{HttpRequest, HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::helpers::{api_result, error_from_snaplink, success_response};
use crate::services::{CreateLinkRequest, LinkService, RequestContext};
use crate::storage::ShortUrlRecord;
use crate::utils::client_identity;

/// POST /shorten 请求体
#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    pub url: String,
    #[serde(default)]
    pub custom_alias: Option<String>,
}

/// POST /shorten 响应
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,
    pub custom_alias: Option<String>,
    pub created_at: DateTime<Utc>,
    /// `false` when an existing link for the same URL was returned
    pub created: bool,
}

/// GET /urls 查询参数
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

fn header_value(req: &HttpRequest, name: actix_web::http::header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn request_context(req: &HttpRequest) -> RequestContext {
    RequestContext {
        client_id: client_identity(req),
        user_agent: header_value(req, USER_AGENT),
        referrer: header_value(req, REFERER),
    }
}

/// Absolute redirect URL for `short_code`, built from the request's host.
fn short_url_for(req: &HttpRequest, short_code: &str) -> String {
    let conn = req.connection_info();
    format!(
        "{}://{}/api/expand/{}",
        conn.scheme(),
        conn.host(),
        short_code
    )
}

pub struct LinkApi;

impl LinkApi {
    pub async fn info(service: web::Data<LinkService>) -> HttpResponse {
        success_response(service.info())
    }

    pub async fn shorten(
        req: HttpRequest,
        body: web::Json<ShortenRequest>,
        service: web::Data<LinkService>,
    ) -> HttpResponse {
        let ctx = request_context(&req);
        let body = body.into_inner();
        let request = CreateLinkRequest {
            url: body.url,
            custom_alias: body.custom_alias,
        };

        match service.create(request, &ctx).await {
            Ok(result) => {
                let ShortUrlRecord {
                    short_code,
                    original_url,
                    custom_alias,
                    created_at,
                    ..
                } = result.record;
                success_response(ShortenResponse {
                    short_url: short_url_for(&req, &short_code),
                    short_code,
                    original_url,
                    custom_alias,
                    created_at,
                    created: result.created,
                })
            }
            Err(e) => error_from_snaplink(&e),
        }
    }

    pub async fn expand(
        req: HttpRequest,
        path: web::Path<String>,
        service: web::Data<LinkService>,
    ) -> HttpResponse {
        let short_code = path.into_inner();
        let ctx = request_context(&req);

        match service.resolve(&short_code, &ctx).await {
            Ok(url) => {
                trace!("Redirecting '{}' -> '{}'", short_code, url);
                HttpResponse::build(StatusCode::FOUND)
                    .insert_header((LOCATION, url))
                    .finish()
            }
            Err(e) => error_from_snaplink(&e),
        }
    }

    pub async fn stats(path: web::Path<String>, service: web::Data<LinkService>) -> HttpResponse {
        api_result(service.stats(&path.into_inner()).await)
    }

    pub async fn list(
        query: web::Query<ListQuery>,
        service: web::Data<LinkService>,
    ) -> HttpResponse {
        api_result(service.list(query.limit).await)
    }

    pub async fn delete(path: web::Path<String>, service: web::Data<LinkService>) -> HttpResponse {
        let short_code = path.into_inner();
        api_result(
            service
                .delete(&short_code)
                .await
                .map(|()| serde_json::json!({ "short_code": short_code })),
        )
    }

    pub async fn metrics(service: web::Data<LinkService>) -> HttpResponse {
        api_result(service.metrics().await)
    }

    pub async fn clear_cache(service: web::Data<LinkService>) -> HttpResponse {
        service.clear_cache();
        success_response(service.cache().stats())
    }
}
