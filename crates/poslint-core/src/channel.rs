//! Tracking-source channels.
//!
//! A link's channel is derived from its `utm_source` query value. The set is
//! closed; anything unrecognized (including an absent or empty value) resolves
//! to [`Channel::Undefined`].

use serde::Serialize;

/// Recognized `utm_source` channels, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Vk,
    Vk1,
    Vk2,
    Undefined,
}

impl Channel {
    /// All channels with a real schema, in resolution order.
    pub const RECOGNIZED: [Channel; 3] = [Channel::Vk, Channel::Vk1, Channel::Vk2];

    /// The literal `utm_source` value for this channel, if any.
    pub fn literal(&self) -> Option<&'static str> {
        match self {
            Channel::Vk => Some("vk"),
            Channel::Vk1 => Some("vk1"),
            Channel::Vk2 => Some("vk2"),
            Channel::Undefined => None,
        }
    }

    /// Resolve a raw `utm_source` value to a channel.
    ///
    /// Exact, case-sensitive match against the recognized literals, first
    /// match wins. Absent or empty input resolves to `Undefined`.
    pub fn resolve(value: Option<&str>) -> Channel {
        let Some(value) = value else {
            return Channel::Undefined;
        };
        for ch in Self::RECOGNIZED {
            if Some(value) == ch.literal() {
                return ch;
            }
        }
        Channel::Undefined
    }
}
