//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Playable parties
///
/// Declaration order is the default turn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartyId {
    Spd,
    Zentrum,
    Kpd,
    Dnvp,
}

impl PartyId {
    pub const ALL: [PartyId; 4] = [PartyId::Spd, PartyId::Zentrum, PartyId::Kpd, PartyId::Dnvp];

    pub fn as_str(&self) -> &'static str {
        match self {
            PartyId::Spd => "SPD",
            PartyId::Zentrum => "ZENTRUM",
            PartyId::Kpd => "KPD",
            PartyId::Dnvp => "DNVP",
        }
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartyId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SPD" => Ok(PartyId::Spd),
            "ZENTRUM" => Ok(PartyId::Zentrum),
            "KPD" => Ok(PartyId::Kpd),
            "DNVP" => Ok(PartyId::Dnvp),
            other => Err(format!("unknown party '{}'", other)),
        }
    }
}

/// Permanent allegiance of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Faction {
    Kpd,
    Spd,
    Dnvp,
    Government,
}

/// City identifier (knowledge-base key)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityId(pub String);

impl CityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unit or threat template identifier (knowledge-base key)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(pub String);

impl TemplateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of one physical unit or threat marker on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub u32);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where an instance currently sits
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Location {
    /// Off-board, free to be placed
    AvailablePool,
    /// Holding box for threat markers
    DrBox,
    City(CityId),
}

impl Location {
    pub fn city(id: impl Into<String>) -> Self {
        Location::City(CityId::new(id))
    }

    pub fn as_city(&self) -> Option<&CityId> {
        match self {
            Location::City(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::AvailablePool => f.write_str("AVAILABLE_POOL"),
            Location::DrBox => f.write_str("DR_BOX"),
            Location::City(id) => write!(f, "{}", id),
        }
    }
}

/// Game round counter
pub type Round = u32;
