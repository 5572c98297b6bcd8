//! Messaging channel catalog.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::pricing::Amount;

/// The messaging medium used for a campaign.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Channel {
    /// WhatsApp template message.
    Whatsapp,
    /// Automated voice call.
    Voice,
    /// WhatsApp first, then a voice call.
    Mix,
}

impl Channel {
    /// Catalog order used by the channel drawer.
    pub const ALL: [Channel; 3] = [Channel::Whatsapp, Channel::Voice, Channel::Mix];

    /// Wire id (`whatsapp`, `voice`, `mix`).
    pub fn id(self) -> &'static str {
        match self {
            Channel::Whatsapp => "whatsapp",
            Channel::Voice => "voice",
            Channel::Mix => "mix",
        }
    }

    /// Display name.
    pub fn label(self) -> &'static str {
        match self {
            Channel::Whatsapp => "WhatsApp",
            Channel::Voice => "Voice Call",
            Channel::Mix => "WhatsApp + Voice",
        }
    }

    /// Price per recipient.
    pub fn unit_cost(self) -> Amount {
        match self {
            Channel::Whatsapp => Amount::from_paise(70),
            Channel::Voice => Amount::from_paise(250),
            Channel::Mix => Amount::from_paise(320),
        }
    }

    /// Short description shown next to the price.
    pub fn description(self) -> &'static str {
        match self {
            Channel::Whatsapp => "Template message with booking link",
            Channel::Voice => "Automated reminder call in the customer's language",
            Channel::Mix => "WhatsApp first, voice follow-up for non-responders",
        }
    }

    /// Parse a channel id, reporting unknown ids as [`ModelError::UnknownChannel`].
    pub fn from_id(id: &str) -> Result<Self, ModelError> {
        id.trim()
            .to_ascii_lowercase()
            .parse()
            .map_err(|_| ModelError::UnknownChannel { id: id.to_string() })
    }
}
