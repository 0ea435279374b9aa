use std::convert::Infallible;

use serde::Deserialize;
use skylog_core::{Coordinates, LocationQuery};
use warp::reply::Response;
use warp::{Filter, Reply};

use crate::reply::{app_error_response, handle_rejection};
use crate::AppState;

#[derive(Debug, Deserialize)]
struct CityQuery {
    #[serde(default)]
    city: String,
}

#[derive(Debug, Deserialize)]
struct CoordinatesQuery {
    lat: f64,
    lon: f64,
}

/// The public HTTP API.
///
/// - `GET /weather?city=..`
/// - `GET /weather/coordinates?lat=..&lon=..`
/// - `GET /weather/history`
pub fn routes(state: &AppState) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let weather_by_city = warp::path!("weather")
        .and(warp::get())
        .and(warp::query::<CityQuery>())
        .and(with_state(state.clone()))
        .and_then(handle_weather_by_city);

    let weather_by_coordinates = warp::path!("weather" / "coordinates")
        .and(warp::get())
        .and(warp::query::<CoordinatesQuery>())
        .and(with_state(state.clone()))
        .and_then(handle_weather_by_coordinates);

    let history = warp::path!("weather" / "history")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handle_history);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET"])
        .allow_headers(vec!["content-type"]);

    weather_by_city
        .or(weather_by_coordinates)
        .or(history)
        .with(cors)
        .recover(handle_rejection)
        .with(warp::trace::request())
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

async fn handle_weather_by_city(query: CityQuery, state: AppState) -> Result<Response, Infallible> {
    Ok(resolve(&state, LocationQuery::City(query.city)).await)
}

async fn handle_weather_by_coordinates(
    query: CoordinatesQuery,
    state: AppState,
) -> Result<Response, Infallible> {
    let coords = Coordinates::new(query.lat, query.lon);
    Ok(resolve(&state, LocationQuery::Coordinates(coords)).await)
}

async fn resolve(state: &AppState, query: LocationQuery) -> Response {
    match state.resolution.resolve(query).await {
        Ok(record) => warp::reply::json(&record.weather_data).into_response(),
        Err(e) => app_error_response(&e),
    }
}

async fn handle_history(state: AppState) -> Result<Response, Infallible> {
    let response = match state.history.recent().await {
        Ok(records) => warp::reply::json(&records).into_response(),
        Err(e) => app_error_response(&e),
    };
    Ok(response)
}
