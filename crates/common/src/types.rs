//! Common data types for Dark Tower client components.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of room the client joins.
///
/// Only a hint for the UI (e.g. to pick layout defaults); the media
/// backend decides the actual topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoomType {
    /// Large group room routed through the media servers.
    Group,
    /// Group room capped at a handful of participants.
    GroupSmall,
    /// Direct peer-to-peer room.
    PeerToPeer,
    /// Free tier room with a two participant limit.
    Go,
}

impl RoomType {
    /// Wire spelling of the room type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Group => "group",
            RoomType::GroupSmall => "group-small",
            RoomType::PeerToPeer => "peer-to-peer",
            RoomType::Go => "go",
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "group" => Ok(RoomType::Group),
            "group-small" => Ok(RoomType::GroupSmall),
            "peer-to-peer" => Ok(RoomType::PeerToPeer),
            "go" => Ok(RoomType::Go),
            other => Err(ParseError::unknown("room type", other)),
        }
    }
}
