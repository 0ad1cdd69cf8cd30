#![cfg(feature = "server")]

use super::*;
use crate::error::Error;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::http::StatusCode;
use actix_web::web;
use serde::Serialize;

pub async fn regions(api: web::Data<API>) -> impl Responder {
    reply(api.regions().await)
}
pub async fn legend(api: web::Data<API>) -> impl Responder {
    HttpResponse::Ok().json(api.legend())
}
pub async fn extent(api: web::Data<API>) -> impl Responder {
    reply(api.extent().await)
}
pub async fn overview(api: web::Data<API>, req: web::Json<OverviewRequest>) -> impl Responder {
    reply(api.overview(req.region.as_deref(), req.range()).await)
}
pub async fn draw(api: web::Data<API>, req: web::Json<DrawRequest>) -> impl Responder {
    match req.ring.len() {
        0..4 => HttpResponse::BadRequest().body("ring needs at least four points"),
        _ => reply(api.draw(&req.name, &req.points(), req.envelope).await),
    }
}

fn reply<T: Serialize>(result: anyhow::Result<T>) -> HttpResponse {
    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => HttpResponse::build(status(&e)).body(e.to_string()),
    }
}

/// Caller mistakes are 4xx; store and I/O failures are 500.
fn status(error: &anyhow::Error) -> StatusCode {
    match error.downcast_ref::<Error>() {
        Some(Error::NotFound(_)) => StatusCode::NOT_FOUND,
        Some(
            Error::Validation { .. }
            | Error::AreaExceeded { .. }
            | Error::Transform(_)
            | Error::SanitizationRejected { .. }
            | Error::RangeInverted { .. },
        ) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_errors_map_to_client_statuses() {
        let missing = anyhow::Error::from(Error::NotFound("region atlantis".into()));
        let large = anyhow::Error::from(Error::AreaExceeded {
            name: "big".into(),
            area: 300.,
            max: 200.,
        });
        let io = anyhow::Error::from(Error::Io(std::io::Error::other("disk")));
        assert_eq!(status(&missing), StatusCode::NOT_FOUND);
        assert_eq!(status(&large), StatusCode::BAD_REQUEST);
        assert_eq!(status(&io), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
