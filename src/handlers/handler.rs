use std::sync::Arc;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::{error, warn};
use crate::handlers::processor::DistanceService;
use crate::models::distance::DistanceRequest;
use crate::models::error::{CodecError, RpcFault, RpcStatus};

pub const GEODESIC_DISTANCE_PATH: &str = "/geodesic_distance";

const RPC_STATUS: &str = "rpc-status";

const JSON_CONTENT_TYPE: &str = "application/json";
const MSGPACK_CONTENT_TYPE: &str = "application/msgpack";

#[derive(Clone)]
pub struct RpcState {
    service: Arc<dyn DistanceService + Send + Sync>,
}

pub fn router(service: Arc<dyn DistanceService + Send + Sync>, max_concurrent_calls: usize) -> Router {
    Router::new()
        .route(GEODESIC_DISTANCE_PATH, post(geodesic_distance))
        .with_state(RpcState { service })
        .layer(GlobalConcurrencyLimitLayer::new(max_concurrent_calls))
        // logging so we can see whats going on
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
}

/// Payload encoding, picked from the request's `Content-Type`. Replies use the
/// same encoding as the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    Json,
    MessagePack,
}

impl WireFormat {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        if content_type.starts_with(MSGPACK_CONTENT_TYPE)
            || content_type.starts_with("application/x-msgpack") {
            WireFormat::MessagePack
        } else {
            WireFormat::Json
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            WireFormat::Json => JSON_CONTENT_TYPE,
            WireFormat::MessagePack => MSGPACK_CONTENT_TYPE,
        }
    }

    pub fn decode<T: DeserializeOwned>(&self, body: &[u8]) -> Result<T, CodecError> {
        match self {
            WireFormat::Json => Ok(serde_json::from_slice(body)?),
            WireFormat::MessagePack => Ok(rmp_serde::from_slice(body)?),
        }
    }

    pub fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        match self {
            WireFormat::Json => Ok(serde_json::to_vec(value)?),
            WireFormat::MessagePack => Ok(rmp_serde::to_vec_named(value)?),
        }
    }

    fn reply<T: Serialize>(&self, status: RpcStatus, value: &T) -> Response {
        match self.encode(value) {
            Ok(body) => (
                http_status(status),
                [
                    (header::CONTENT_TYPE, HeaderValue::from_static(self.content_type())),
                    (HeaderName::from_static(RPC_STATUS), HeaderValue::from(status.code())),
                ],
                body,
            ).into_response(),
            Err(e) => {
                error!("Error serializing reply: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    [(HeaderName::from_static(RPC_STATUS), HeaderValue::from(RpcStatus::Unknown.code()))],
                ).into_response()
            }
        }
    }

    fn fault(&self, fault: RpcFault) -> Response {
        self.reply(fault.code, &fault)
    }
}

fn http_status(status: RpcStatus) -> StatusCode {
    match status {
        RpcStatus::Ok => StatusCode::OK,
        RpcStatus::InvalidArgument => StatusCode::BAD_REQUEST,
        RpcStatus::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub async fn geodesic_distance(
    State(state): State<RpcState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let format = WireFormat::from_headers(&headers);

    let request: DistanceRequest = match format.decode(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Error deserializing request: {}", e);
            return format.fault(RpcFault::invalid_argument(e));
        }
    };

    match state.service.geodesic_distance(request).await {
        Ok(result) => format.reply(RpcStatus::Ok, &result),
        Err(e) => {
            error!("geodesic_distance failed: {}", e);
            format.fault(RpcFault::unknown(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;
    use tower::ServiceExt;
    use crate::handlers::processor::GeodesicDistanceProcessor;
    use crate::models::distance::DistanceResult;
    use super::*;

    fn app() -> Router {
        router(Arc::new(GeodesicDistanceProcessor::new()), 16)
    }

    fn json_call(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(GEODESIC_DISTANCE_PATH)
            .header(header::CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn santiago_to_valparaiso(unit: &str) -> serde_json::Value {
        json!({
            "source": {"latitude": -33.0351516, "longitude": -70.5955963},
            "destination": {"latitude": -33.0348327, "longitude": -71.5980458},
            "unit": unit,
        })
    }

    async fn body_bytes(response: Response) -> Bytes {
        hyper::body::to_bytes(response.into_body()).await.unwrap()
    }

    #[tokio::test]
    async fn returns_distance_for_valid_call() {
        let response = app().oneshot(json_call(santiago_to_valparaiso("km"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["rpc-status"], "0");
        assert_eq!(response.headers()[header::CONTENT_TYPE], JSON_CONTENT_TYPE);

        let result: DistanceResult = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert!(result.distance > 0.0);
        assert_eq!(result.unit, "km");
        assert_eq!(result.method, "geodesic");
    }

    #[tokio::test]
    async fn returns_sentinel_for_out_of_range_coordinates() {
        let body = json!({
            "source": {"latitude": 91.0, "longitude": -70.5955963},
            "destination": {"latitude": -33.0348327, "longitude": -71.5980458},
            "unit": "km",
        });
        let response = app().oneshot(json_call(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let result: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(result, json!({"distance": -1.0, "unit": "invalid", "method": "geodesic"}));
    }

    #[tokio::test]
    async fn unknown_unit_fails_with_unknown_status() {
        let response = app().oneshot(json_call(santiago_to_valparaiso("invalid"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()["rpc-status"], "2");

        let fault: RpcFault = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(fault.code, RpcStatus::Unknown);
        assert!(fault.message.contains("Exception calling application"));
    }

    #[tokio::test]
    async fn missing_unit_defaults_to_km() {
        let mut body = santiago_to_valparaiso("");
        body.as_object_mut().unwrap().remove("unit");
        let response = app().oneshot(json_call(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let result: DistanceResult = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(result.unit, "km");
        assert!(result.distance > 0.0);
    }

    #[tokio::test]
    async fn malformed_body_is_invalid_argument() {
        let request = Request::builder()
            .method("POST")
            .uri(GEODESIC_DISTANCE_PATH)
            .header(header::CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(Body::from("{\"source\": "))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["rpc-status"], "3");

        let fault: RpcFault = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(fault.code, RpcStatus::InvalidArgument);
        assert!(fault.message.starts_with("Error deserializing request"));
    }

    #[tokio::test]
    async fn speaks_msgpack_when_asked() {
        let call = DistanceRequest::new(
            crate::models::position::Position::new(-33.0351516, -70.5955963),
            crate::models::position::Position::new(-33.0348327, -71.5980458),
            "nm",
        );
        let request = Request::builder()
            .method("POST")
            .uri(GEODESIC_DISTANCE_PATH)
            .header(header::CONTENT_TYPE, "application/x-msgpack")
            .body(Body::from(rmp_serde::to_vec_named(&call).unwrap()))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], MSGPACK_CONTENT_TYPE);

        let result: DistanceResult = rmp_serde::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(result.unit, "nm");
        assert!(result.distance > 0.0);
    }

    #[tokio::test]
    async fn rejects_other_methods() {
        let request = Request::builder()
            .method("GET")
            .uri(GEODESIC_DISTANCE_PATH)
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn picks_format_from_content_type() {
        let mut headers = HeaderMap::new();
        assert_eq!(WireFormat::from_headers(&headers), WireFormat::Json);
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/msgpack"));
        assert_eq!(WireFormat::from_headers(&headers), WireFormat::MessagePack);
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json; charset=utf-8"));
        assert_eq!(WireFormat::from_headers(&headers), WireFormat::Json);
    }
}
