use std::f64::consts::PI;
use crate::models::position::Position;

/// WGS-84 semi-major axis in metres.
const WGS84_A: f64 = 6_378_137.0;
/// WGS-84 flattening.
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const WGS84_B: f64 = (1.0 - WGS84_F) * WGS84_A;

/// IUGG mean Earth radius, used only when the ellipsoidal solution fails.
const MEAN_EARTH_RADIUS_KM: f64 = 6_371.008_8;

const MAX_ITERATIONS: usize = 200;
const CONVERGENCE_THRESHOLD: f64 = 1e-12;

/// Geodesic distance in kilometres between two validated positions.
///
/// Uses Vincenty's inverse solution on the WGS-84 ellipsoid, which is accurate
/// to well under a millimetre. Nearly antipodal pairs can keep the iteration
/// from converging; those fall back to a great-circle distance on the mean
/// sphere, which stays within 0.5% of the true geodesic.
pub fn distance_km(source: &Position, destination: &Position) -> f64 {
    match vincenty_inverse_m(source, destination) {
        Some(metres) => metres / 1000.0,
        None => great_circle_km(source, destination),
    }
}

fn vincenty_inverse_m(source: &Position, destination: &Position) -> Option<f64> {
    let l = normalize_longitude((destination.longitude - source.longitude).to_radians());
    let u1 = ((1.0 - WGS84_F) * source.latitude.to_radians().tan()).atan();
    let u2 = ((1.0 - WGS84_F) * destination.latitude.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    let mut converged = false;
    let (mut sin_sigma, mut cos_sigma, mut sigma) = (0.0, 0.0, 0.0);
    let (mut cos_sq_alpha, mut cos_2sigma_m) = (0.0, 0.0);

    for _ in 0..MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
            .sqrt();
        if sin_sigma == 0.0 {
            // coincident points
            return Some(0.0);
        }
        cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        sigma = sin_sigma.atan2(cos_sigma);

        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        // Equatorial lines have cos²α = 0.
        cos_2sigma_m = if cos_sq_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        } else {
            0.0
        };

        let c = WGS84_F / 16.0 * cos_sq_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos_sq_alpha));
        let previous = lambda;
        lambda = l + (1.0 - c) * WGS84_F * sin_alpha
            * (sigma + c * sin_sigma
                * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

        if lambda.abs() > PI {
            return None;
        }
        if (lambda - previous).abs() < CONVERGENCE_THRESHOLD {
            converged = true;
            break;
        }
    }

    if !converged {
        return None;
    }

    let u_sq = cos_sq_alpha * (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);
    let a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
    let delta_sigma = b * sin_sigma
        * (cos_2sigma_m + b / 4.0
            * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)
                - b / 6.0 * cos_2sigma_m
                    * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                    * (-3.0 + 4.0 * cos_2sigma_m * cos_2sigma_m)));

    Some(WGS84_B * a * (sigma - delta_sigma))
}

/// Great-circle distance on the mean sphere, using the atan2 form of the
/// central angle so it stays well conditioned for both tiny and antipodal
/// separations.
fn great_circle_km(source: &Position, destination: &Position) -> f64 {
    let (sin_lat1, cos_lat1) = source.latitude.to_radians().sin_cos();
    let (sin_lat2, cos_lat2) = destination.latitude.to_radians().sin_cos();
    let (sin_dlon, cos_dlon) = (destination.longitude - source.longitude).to_radians().sin_cos();

    let num = ((cos_lat2 * sin_dlon).powi(2)
        + (cos_lat1 * sin_lat2 - sin_lat1 * cos_lat2 * cos_dlon).powi(2))
        .sqrt();
    let den = sin_lat1 * sin_lat2 + cos_lat1 * cos_lat2 * cos_dlon;

    MEAN_EARTH_RADIUS_KM * num.atan2(den)
}

fn normalize_longitude(radians: f64) -> f64 {
    radians.sin().atan2(radians.cos())
}
