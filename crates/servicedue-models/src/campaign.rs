//! Campaign launch request and receipt.

use serde::{Deserialize, Deserializer, Serialize};

use crate::channel::Channel;
use crate::lead::LeadId;
use crate::segment::Segment;

/// Body of `POST /api/campaigns/launch`.
///
/// Built once per confirmed launch and sent exactly once.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CampaignLaunchRequest {
    pub lead_ids: Vec<LeadId>,
    pub segment: Segment,
    pub channel: Channel,
    pub template_id: String,
}

/// What the backend acknowledged for a launch.
///
/// The response body is not pinned down by the backend, so every field is
/// optional and unknown fields are ignored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct LaunchReceipt {
    #[serde(default, deserialize_with = "opt_id_as_string")]
    pub campaign_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Number of messages the backend queued.
    #[serde(default)]
    pub queued: Option<u64>,
}

fn opt_id_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
