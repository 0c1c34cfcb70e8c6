use crate::dto::HealthRes;

/// Simple health service shared by the REST server and the run binary.
///
/// Provides a standardised way to report the health status of the Carebook
/// service for monitoring and load balancer checks.
#[derive(Clone)]
pub struct HealthService;

impl HealthService {
    /// Creates a new instance of HealthService.
    pub fn new() -> Self {
        Self
    }

    /// Static method to check health without creating an instance.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Carebook API is alive".into(),
        }
    }
}

impl Default for HealthService {
    fn default() -> Self {
        Self::new()
    }
}
