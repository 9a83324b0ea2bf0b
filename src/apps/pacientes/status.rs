// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Appointment lifecycle.
//!
//! ```text
//! PROGRAMADO ──► EN_SALA ──► ATENDIDO
//!     │
//!     └────────► NO_SE_PRESENTO
//! ```
//!
//! `ATENDIDO` and `NO_SE_PRESENTO` are terminal.

use crate::{PlatformError, PlatformResult};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentStatus {
    #[default]
    #[serde(rename = "PROGRAMADO")]
    Scheduled,
    #[serde(rename = "EN_SALA")]
    CheckedIn,
    #[serde(rename = "ATENDIDO")]
    Attended,
    #[serde(rename = "NO_SE_PRESENTO")]
    NoShow,
}

use AppointmentStatus::*;

/// Every allowed `(from, to)` pair.
const TRANSITIONS: &[(AppointmentStatus, AppointmentStatus)] = &[
    (Scheduled, CheckedIn),
    (Scheduled, NoShow),
    (CheckedIn, Attended),
];

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 4] = [Scheduled, CheckedIn, Attended, NoShow];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scheduled => "PROGRAMADO",
            CheckedIn => "EN_SALA",
            Attended => "ATENDIDO",
            NoShow => "NO_SE_PRESENTO",
        }
    }

    pub fn allowed_next(self) -> Vec<AppointmentStatus> {
        TRANSITIONS
            .iter()
            .filter(|(from, _)| *from == self)
            .map(|(_, to)| *to)
            .collect()
    }

    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        TRANSITIONS.contains(&(self, next))
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_next().is_empty()
    }

    /// The state after moving to `next`, or a validation error naming the
    /// disallowed move.
    pub fn transition(self, next: AppointmentStatus) -> PlatformResult<AppointmentStatus> {
        if !self.can_transition_to(next) {
            return Err(PlatformError::Validation(format!(
                "transition {self} -> {next} is not allowed"
            )));
        }
        Ok(next)
    }

    /// Stored payloads written before the status field existed, or with a
    /// value no longer known, read as `PROGRAMADO`.
    pub fn from_legacy(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }

    pub(crate) fn deserialize_legacy<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(Self::from_legacy(raw.as_deref()))
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        AppointmentStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                PlatformError::Validation(format!("unknown appointment status '{wanted}'"))
            })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_allowed_transitions() {
        assert_eq!(Scheduled.transition(CheckedIn), Ok(CheckedIn));
        assert_eq!(Scheduled.transition(NoShow), Ok(NoShow));
        assert_eq!(CheckedIn.transition(Attended), Ok(Attended));
    }

    #[test]
    fn test_every_other_pair_is_rejected() {
        for from in AppointmentStatus::ALL {
            for to in AppointmentStatus::ALL {
                if TRANSITIONS.contains(&(from, to)) {
                    continue;
                }
                assert_eq!(
                    from.transition(to),
                    Err(PlatformError::Validation(format!(
                        "transition {} -> {} is not allowed",
                        from.as_str(),
                        to.as_str()
                    )))
                );
            }
        }
    }

    #[test]
    fn test_skipping_check_in_is_rejected() {
        assert!(Scheduled.transition(Attended).is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(Attended.is_terminal());
        assert!(NoShow.is_terminal());
        assert!(!Scheduled.is_terminal());
        assert_eq!(CheckedIn.allowed_next(), vec![Attended]);
    }

    #[test]
    fn test_parse() {
        assert_eq!("en_sala".parse::<AppointmentStatus>(), Ok(CheckedIn));
        assert_eq!(" NO_SE_PRESENTO ".parse::<AppointmentStatus>(), Ok(NoShow));
        assert!("CANCELADO".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn test_legacy_values_read_as_scheduled() {
        assert_eq!(AppointmentStatus::from_legacy(None), Scheduled);
        assert_eq!(AppointmentStatus::from_legacy(Some("CONFIRMADA")), Scheduled);
        assert_eq!(AppointmentStatus::from_legacy(Some("ATENDIDO")), Attended);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_value(NoShow).expect("json"),
            serde_json::json!("NO_SE_PRESENTO")
        );
        for status in AppointmentStatus::ALL {
            let json = serde_json::to_value(status).expect("json");
            assert_eq!(json.as_str(), Some(status.as_str()));
        }
    }
}
