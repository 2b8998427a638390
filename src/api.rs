//! Read-only HTTP routes.

use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use futures::future::{self, Either};
use futures::Future;
use postgres::Connection;
use serde::Serialize;

use crate::error::Error;
use crate::models::{Entity, Track, TrackInfo};
use crate::pagination::{PageParams, PageRequest};
use crate::queries;
use crate::serializers::{serialize_track, serialize_trackinfo};
use crate::DbPool;

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl Error {
    pub fn http_status(&self) -> StatusCode {
        match self {
            Error::InvalidPage(_) => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Pool(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ResponseError for Error {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.http_status()).json(ErrorBody {
            message: self.to_string(),
        })
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/tracks").route(web::get().to_async(list_tracks)))
        .service(web::resource("/api/tracks/{id}").route(web::get().to_async(get_track)))
        .service(web::resource("/api/trackinfo").route(web::get().to_async(list_trackinfo)))
        .service(
            web::resource("/api/trackinfo/{id}").route(web::get().to_async(get_trackinfo)),
        );
}

/// Runs `load` with a pooled connection on the blocking thread pool.
fn with_connection<T, F>(
    pool: web::Data<DbPool>,
    load: F,
) -> impl Future<Item = HttpResponse, Error = actix_web::Error>
where
    T: Serialize + Send + 'static,
    F: FnOnce(&Connection) -> Result<T, Error> + Send + 'static,
{
    web::block(move || {
        let db = pool.get_ref().get()?;
        load(&db)
    })
    .then(|res| -> Result<HttpResponse, actix_web::Error> {
        match res {
            Ok(body) => Ok(HttpResponse::Ok().json(body)),
            Err(BlockingError::Error(err)) => {
                if err.http_status().is_server_error() {
                    log::error!("Request failed: {}", err);
                } else {
                    log::debug!("Request rejected: {}", err);
                }
                Ok(err.error_response())
            }
            Err(BlockingError::Canceled) => {
                log::error!("Blocking database call was canceled");
                Ok(HttpResponse::InternalServerError().finish())
            }
        }
    })
}

/// Rejects bad paging input before a connection is checked out.
fn paged<T, F>(
    pool: web::Data<DbPool>,
    params: &PageParams,
    load: F,
) -> impl Future<Item = HttpResponse, Error = actix_web::Error>
where
    T: Serialize + Send + 'static,
    F: FnOnce(&Connection, PageRequest) -> Result<T, Error> + Send + 'static,
{
    match params.resolve() {
        Ok(request) => Either::A(with_connection(pool, move |db| load(db, request))),
        Err(err) => {
            log::debug!("Request rejected: {}", err);
            Either::B(future::ok(err.error_response()))
        }
    }
}

fn not_found<E: Entity>(id: i32) -> Error {
    Error::NotFound {
        table: E::TABLE_NAME,
        id,
    }
}

fn list_tracks(
    pool: web::Data<DbPool>,
    params: web::Query<PageParams>,
) -> impl Future<Item = HttpResponse, Error = actix_web::Error> {
    paged(pool, &params, |db, request| {
        queries::serialize_page::<Track, _, _>(db, request, |track| serialize_track(track, db))
    })
}

fn get_track(
    pool: web::Data<DbPool>,
    id: web::Path<i32>,
) -> impl Future<Item = HttpResponse, Error = actix_web::Error> {
    let id = id.into_inner();
    with_connection(pool, move |db| {
        let track = queries::fetch_by_id::<Track>(db, id)?.ok_or_else(|| not_found::<Track>(id))?;
        serialize_track(&track, db)
    })
}

fn list_trackinfo(
    pool: web::Data<DbPool>,
    params: web::Query<PageParams>,
) -> impl Future<Item = HttpResponse, Error = actix_web::Error> {
    paged(pool, &params, |db, request| {
        queries::serialize_page::<TrackInfo, _, _>(db, request, |info| {
            Ok(serialize_trackinfo(info))
        })
    })
}

fn get_trackinfo(
    pool: web::Data<DbPool>,
    id: web::Path<i32>,
) -> impl Future<Item = HttpResponse, Error = actix_web::Error> {
    let id = id.into_inner();
    with_connection(pool, move |db| {
        queries::fetch_by_id::<TrackInfo>(db, id)?
            .map(|info| serialize_trackinfo(&info))
            .ok_or_else(|| not_found::<TrackInfo>(id))
    })
}
