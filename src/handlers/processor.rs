use async_trait::async_trait;
use tracing::debug;
use crate::handlers::geodesic;
use crate::models::distance::{DistanceRequest, DistanceResult, DistanceUnit};
use crate::models::error::ServiceError;

#[async_trait]
pub trait DistanceService {
    /// Invalid coordinates come back as the sentinel result; only an
    /// unrecognized unit fails the call.
    async fn geodesic_distance(&self, request: DistanceRequest) -> Result<DistanceResult, ServiceError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GeodesicDistanceProcessor;

impl GeodesicDistanceProcessor {
    pub fn new() -> Self {
        Self
    }

    pub fn compute(&self, request: &DistanceRequest) -> Result<DistanceResult, ServiceError> {
        if let Err(e) = request.source.validate().and_then(|_| request.destination.validate()) {
            debug!("Rejecting coordinates: {}", e);
            return Ok(DistanceResult::invalid());
        }

        let unit: DistanceUnit = request.unit.parse()?;
        let km = geodesic::distance_km(&request.source, &request.destination);
        let distance = unit.convert_km(km);

        debug!(
            source = ?request.source,
            destination = ?request.destination,
            "Computed {:.6} {}", distance, unit.token()
        );
        Ok(DistanceResult::measured(distance, unit))
    }
}

#[async_trait]
impl DistanceService for GeodesicDistanceProcessor {
    async fn geodesic_distance(&self, request: DistanceRequest) -> Result<DistanceResult, ServiceError> {
        self.compute(&request)
    }
}
