//! Request extractors that render rejections in the API error envelope.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use std::fmt::Display;
use std::str::FromStr;

use crate::utils::error::AppError;

/// `Json<T>` whose rejection is a `ValidationError`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

/// `Query<T>` whose rejection is a `ValidationError`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(ApiQuery(value)),
            Err(rejection) => Err(query_rejection(rejection)),
        }
    }
}

/// `Path<T>` whose rejection is a `ValidationError`.
#[derive(Debug, Clone, Copy)]
pub struct ApiPath<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(ApiPath(value)),
            Err(rejection) => Err(path_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    AppError::ValidationError(rejection.body_text())
}

fn query_rejection(rejection: QueryRejection) -> AppError {
    AppError::ValidationError(rejection.body_text())
}

fn path_rejection(rejection: PathRejection) -> AppError {
    AppError::ValidationError(rejection.body_text())
}

/// Query value where a blank string means "absent".
pub fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().map(Some).map_err(D::Error::custom),
        _ => Ok(None),
    }
}

/// Id filter where blank and zero both mean "no filter".
pub fn optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(blank_as_none::<D, i64>(deserializer)?.filter(|id| *id != 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Uri;
    use chrono::NaiveDate;

    #[derive(Debug, Deserialize)]
    struct Filters {
        #[serde(default, deserialize_with = "optional_id")]
        venue_id: Option<i64>,
        #[serde(default, deserialize_with = "optional_id")]
        service_id: Option<i64>,
        #[serde(default, deserialize_with = "blank_as_none")]
        date: Option<NaiveDate>,
    }

    fn parse(uri: &str) -> Result<Filters, QueryRejection> {
        let uri: Uri = uri.parse().unwrap();
        Query::<Filters>::try_from_uri(&uri).map(|Query(f)| f)
    }

    #[test]
    fn test_blank_and_zero_ids_are_unfiltered() {
        let f = parse("/x?venue_id=&service_id=&date=").unwrap();
        assert_eq!((f.venue_id, f.service_id, f.date), (None, None, None));

        let f = parse("/x?venue_id=0&service_id=0").unwrap();
        assert_eq!((f.venue_id, f.service_id), (None, None));

        let f = parse("/x").unwrap();
        assert_eq!(f.venue_id, None);
    }

    #[test]
    fn test_ids_and_dates_still_parse() {
        let f = parse("/x?venue_id=4&service_id=7&date=2024-03-01").unwrap();
        assert_eq!(f.venue_id, Some(4));
        assert_eq!(f.service_id, Some(7));
        assert_eq!(f.date, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn test_garbage_is_still_rejected() {
        assert!(parse("/x?venue_id=abc").is_err());
        assert!(parse("/x?date=yesterday").is_err());
    }
}
