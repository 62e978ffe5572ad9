use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::web;

use super::error_code::ErrorCode;
use super::handlers::LinkApi;
use super::helpers::error_response;

/// 路由前缀
pub const API_PREFIX: &str = "/api";

/// Register the `/api` scope and its JSON error handling.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        let response = error_response(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, &message);
        InternalError::from_response(err, response).into()
    });
    let query_config = web::QueryConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        let response = error_response(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, &message);
        InternalError::from_response(err, response).into()
    });

    cfg.service(
        web::scope(API_PREFIX)
            .app_data(json_config)
            .app_data(query_config)
            .route("", web::get().to(LinkApi::info))
            .route("/", web::get().to(LinkApi::info))
            .route("/shorten", web::post().to(LinkApi::shorten))
            .route("/expand/{code}", web::get().to(LinkApi::expand))
            .route("/stats/{code}", web::get().to(LinkApi::stats))
            .route("/urls", web::get().to(LinkApi::list))
            .route("/urls/{code}", web::delete().to(LinkApi::delete))
            .route("/metrics", web::get().to(LinkApi::metrics))
            .route("/cache/clear", web::post().to(LinkApi::clear_cache)),
    );
}
