use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{CoreError, CoreResult};

/// Aircraft models a trip can be flown on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Plane {
    #[serde(rename = "Airbus A220")]
    AirbusA220,
    #[serde(rename = "Airbus A320")]
    AirbusA320,
    #[serde(rename = "Airbus A330")]
    AirbusA330,
    #[serde(rename = "Airbus A350")]
    AirbusA350,
    #[serde(rename = "Airbus A380")]
    AirbusA380,
    #[serde(rename = "Boeing-737")]
    Boeing737,
    #[serde(rename = "Boeing-747")]
    Boeing747,
    #[serde(rename = "Boeing-777")]
    Boeing777,
    #[serde(rename = "Boeing-787")]
    Boeing787,
    #[serde(rename = "Bombardier CRJ")]
    BombardierCrj,
    #[serde(rename = "Embraer 170/190")]
    Embraer170,
    #[serde(rename = "Superjet-100")]
    Superjet100,
}

impl Plane {
    pub const ALL: [Plane; 12] = [
        Plane::AirbusA220,
        Plane::AirbusA320,
        Plane::AirbusA330,
        Plane::AirbusA350,
        Plane::AirbusA380,
        Plane::Boeing737,
        Plane::Boeing747,
        Plane::Boeing777,
        Plane::Boeing787,
        Plane::BombardierCrj,
        Plane::Embraer170,
        Plane::Superjet100,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Plane::AirbusA220 => "Airbus A220",
            Plane::AirbusA320 => "Airbus A320",
            Plane::AirbusA330 => "Airbus A330",
            Plane::AirbusA350 => "Airbus A350",
            Plane::AirbusA380 => "Airbus A380",
            Plane::Boeing737 => "Boeing-737",
            Plane::Boeing747 => "Boeing-747",
            Plane::Boeing777 => "Boeing-777",
            Plane::Boeing787 => "Boeing-787",
            Plane::BombardierCrj => "Bombardier CRJ",
            Plane::Embraer170 => "Embraer 170/190",
            Plane::Superjet100 => "Superjet-100",
        }
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plane {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Plane::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CoreError::ValidationError(format!("Unknown plane: {}", s)))
    }
}

/// Trip data as submitted, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTrip {
    pub company: i64,
    pub plane: Plane,
    pub town_from: String,
    pub town_to: String,
    pub time_out: DateTime<Utc>,
    pub time_in: DateTime<Utc>,
}

const MAX_TOWN_LEN: usize = 64;

impl NewTrip {
    pub fn validate(&self) -> CoreResult<()> {
        if self.company <= 0 {
            return Err(CoreError::ValidationError("Company id must be positive".into()));
        }
        for town in [&self.town_from, &self.town_to] {
            let len = town.chars().count();
            if len == 0 || len > MAX_TOWN_LEN {
                return Err(CoreError::ValidationError(format!(
                    "Town name must be 1..={} characters",
                    MAX_TOWN_LEN
                )));
            }
        }
        if self.town_from == self.town_to {
            return Err(CoreError::ValidationError(
                "Trips to the same town shouldn't be planned".into(),
            ));
        }
        if self.time_in <= self.time_out {
            return Err(CoreError::ValidationError(
                "Time out must be lesser than time in".into(),
            ));
        }
        Ok(())
    }

    pub fn with_id(self, id: i64) -> Trip {
        Trip {
            id,
            company: self.company,
            plane: self.plane,
            town_from: self.town_from,
            town_to: self.town_to,
            time_out: self.time_out,
            time_in: self.time_in,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: i64,
    pub company: i64,
    pub plane: Plane,
    pub town_from: String,
    pub town_to: String,
    pub time_out: DateTime<Utc>,
    pub time_in: DateTime<Utc>,
}
