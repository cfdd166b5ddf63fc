//! Request types and validation for HTTP endpoints.

use serde::{Deserialize, Serialize};

use waypath_lib::{RouteMode, SnapPolicy, MANUAL_SNAP_DISTANCE_M};

use crate::ProblemDetails;

/// Validation trait for request types.
///
/// Implementations check every field and return a `ProblemDetails` for the
/// first invalid one. The `request_id` populates the problem's `instance`.
pub trait Validate {
    /// Returns a boxed `ProblemDetails` to avoid large `Result::Err` variants.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

/// Request for a route between two node ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    pub source_id: i64,

    pub target_id: i64,

    /// `shortest`, `energy_efficient` or `least_turn`.
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Graph to route on. Falls back to the preloaded graph when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_url: Option<String>,
}

fn default_mode() -> String {
    RouteMode::default().as_str().to_string()
}

impl RouteRequest {
    pub fn route_mode(&self) -> waypath_lib::Result<RouteMode> {
        self.mode.parse()
    }
}

impl Validate for RouteRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if let Err(err) = self.route_mode() {
            return Err(Box::new(ProblemDetails::bad_request(
                err.to_string(),
                request_id,
            )));
        }

        validate_map_url(self.map_url.as_deref(), request_id)
    }
}

/// Request for the graph node closest to a coordinate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearestRequest {
    pub lat: f64,

    pub lon: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_url: Option<String>,

    /// Reject matches further away than this, in metres.
    #[serde(default = "default_max_distance")]
    pub max_distance_m: f64,
}

fn default_max_distance() -> f64 {
    MANUAL_SNAP_DISTANCE_M
}

impl NearestRequest {
    pub fn snap_policy(&self) -> SnapPolicy {
        SnapPolicy::new(self.max_distance_m)
    }
}

impl Validate for NearestRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'lat' field must be between -90 and 90",
                request_id,
            )));
        }

        if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'lon' field must be between -180 and 180",
                request_id,
            )));
        }

        if !self.max_distance_m.is_finite() || self.max_distance_m <= 0.0 {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'max_distance_m' field must be a positive number",
                request_id,
            )));
        }

        validate_map_url(self.map_url.as_deref(), request_id)
    }
}

fn validate_map_url(map_url: Option<&str>, request_id: &str) -> Result<(), Box<ProblemDetails>> {
    match map_url {
        Some(url) if url.trim().is_empty() => Err(Box::new(ProblemDetails::bad_request(
            "The 'map_url' field cannot be empty",
            request_id,
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_request_defaults_to_shortest() {
        let request: RouteRequest =
            serde_json::from_str(r#"{"source_id":1,"target_id":16}"#).unwrap();
        assert_eq!(request.mode, "shortest");
        assert_eq!(request.route_mode().unwrap(), RouteMode::Shortest);
        assert!(request.map_url.is_none());
        assert!(request.validate("req").is_ok());
    }

    #[test]
    fn route_request_accepts_all_modes() {
        for mode in ["shortest", "energy_efficient", "least_turn", "least-turn"] {
            let request = RouteRequest {
                source_id: 1,
                target_id: 2,
                mode: mode.to_string(),
                map_url: None,
            };
            assert!(request.validate("req").is_ok(), "mode {mode}");
        }
    }

    #[test]
    fn unknown_mode_is_a_bad_request() {
        let request = RouteRequest {
            source_id: 1,
            target_id: 2,
            mode: "fastest".to_string(),
            map_url: None,
        };
        let problem = request.validate("req-9").unwrap_err();
        assert_eq!(problem.status, 400);
        assert_eq!(problem.instance.as_deref(), Some("req-9"));
        assert!(problem.detail.as_deref().unwrap().contains("fastest"));
    }

    #[test]
    fn blank_map_url_is_rejected() {
        let request = RouteRequest {
            source_id: 1,
            target_id: 2,
            mode: "shortest".to_string(),
            map_url: Some("  ".to_string()),
        };
        assert!(request.validate("req").is_err());
    }

    #[test]
    fn nearest_request_defaults_to_manual_snap_distance() {
        let request: NearestRequest =
            serde_json::from_str(r#"{"lat":12.97,"lon":77.59}"#).unwrap();
        assert_eq!(request.max_distance_m, MANUAL_SNAP_DISTANCE_M);
        assert_eq!(request.snap_policy().max_distance_m, MANUAL_SNAP_DISTANCE_M);
        assert!(request.validate("req").is_ok());
    }

    #[test]
    fn nearest_request_checks_ranges() {
        let base = NearestRequest {
            lat: 12.97,
            lon: 77.59,
            map_url: None,
            max_distance_m: 150.0,
        };

        let bad_lat = NearestRequest {
            lat: 91.0,
            ..base.clone()
        };
        assert!(bad_lat.validate("req").is_err());

        let bad_lon = NearestRequest {
            lon: f64::NAN,
            ..base.clone()
        };
        assert!(bad_lon.validate("req").is_err());

        let bad_limit = NearestRequest {
            max_distance_m: 0.0,
            ..base
        };
        let problem = bad_limit.validate("req").unwrap_err();
        assert!(problem.detail.as_deref().unwrap().contains("max_distance_m"));
    }
}
