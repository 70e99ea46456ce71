use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::shared::forms::Choice;

/// Why the visitor wants an appointment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    SellVehicle,
    Interested,
    Other,
}

impl Reason {
    pub const ALL: [Reason; 3] = [Reason::SellVehicle, Reason::Interested, Reason::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::SellVehicle => "sell_vehicle",
            Reason::Interested => "interested",
            Reason::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Reason::SellVehicle => "Sell my vehicle",
            Reason::Interested => "Interested in a vehicle",
            Reason::Other => "Other",
        }
    }

    pub fn choices() -> Vec<Choice> {
        Self::ALL
            .iter()
            .map(|r| Choice {
                value: r.as_str(),
                label: r.label(),
            })
            .collect()
    }
}

impl FromStr for Reason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("Unknown reason: {}", s))
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Database model for a contact/appointment request
#[derive(Debug, Clone, FromRow)]
pub struct AppointmentRequest {
    pub id: i64,
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub phone: String,
    pub reason: Reason,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes_round_trip() {
        for reason in Reason::ALL {
            assert_eq!(reason.as_str().parse::<Reason>(), Ok(reason));
        }
        assert!("vendre".parse::<Reason>().is_err());
        assert_eq!(Reason::choices()[0].label, "Sell my vehicle");
    }
}
