use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Aggregate outcome of a notification fan-out
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendSummaryDto {
    /// Subscribers the send was attempted for
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
    /// Emails whose send failed, for the admin dashboard
    pub failed_recipients: Vec<String>,
}
