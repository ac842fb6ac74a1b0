//! Delta export time bounds.

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use flowhook_core::error::AppError;

/// Time window of a delta export: changes after the previous run up to
/// the start of the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaWindow {
    /// The last time the export was executed.
    pub last_export_date_time: DateTime<Utc>,
    /// The time of the export currently running.
    pub current_export_date_time: DateTime<Utc>,
}

impl DeltaWindow {
    /// Creates a window, rejecting one that ends before it starts.
    pub fn new(last: DateTime<Utc>, current: DateTime<Utc>) -> Result<Self, AppError> {
        let window = Self {
            last_export_date_time: last,
            current_export_date_time: current,
        };
        window.validate()?;
        Ok(window)
    }

    /// Checks `last <= current`.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.last_export_date_time > self.current_export_date_time {
            return Err(AppError::validation(format!(
                "lastExportDateTime {} is after currentExportDateTime {}",
                self.last_export_date_time, self.current_export_date_time
            )));
        }
        Ok(())
    }

    /// Whether `ts` falls in `[last, current)`.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.last_export_date_time && ts < self.current_export_date_time
    }
}

/// The two delta members as they appear among other options, each possibly
/// absent. Presence decides whether the options describe a delta export.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaMembers {
    /// Raw `lastExportDateTime`, if present.
    #[serde(default)]
    pub last_export_date_time: Option<Value>,
    /// Raw `currentExportDateTime`, if present.
    #[serde(default)]
    pub current_export_date_time: Option<Value>,
}

impl DeltaMembers {
    /// Whether neither member is present.
    pub fn is_absent(&self) -> bool {
        self.last_export_date_time.is_none() && self.current_export_date_time.is_none()
    }

    /// Resolves the members into a window.
    ///
    /// Both absent yields `None`. Only one present, an unparseable timestamp
    /// or an inverted window is a validation error.
    pub fn into_window(self) -> Result<Option<DeltaWindow>, AppError> {
        match (self.last_export_date_time, self.current_export_date_time) {
            (None, None) => Ok(None),
            (Some(last), Some(current)) => {
                let last = parse_timestamp("lastExportDateTime", last)?;
                let current = parse_timestamp("currentExportDateTime", current)?;
                DeltaWindow::new(last, current).map(Some)
            }
            (Some(_), None) => Err(AppError::validation(
                "lastExportDateTime is present without currentExportDateTime",
            )),
            (None, Some(_)) => Err(AppError::validation(
                "currentExportDateTime is present without lastExportDateTime",
            )),
        }
    }
}

fn parse_timestamp(member: &str, value: Value) -> Result<DateTime<Utc>, AppError> {
    serde_json::from_value(value)
        .map_err(|e| AppError::validation(format!("{member} is not a valid timestamp: {e}")))
}

/// `deserialize_with` for a flattened `Option<DeltaWindow>`: rejects
/// half-present or malformed members instead of reading them as absent.
pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<DeltaWindow>, D::Error>
where
    D: Deserializer<'de>,
{
    DeltaMembers::deserialize(deserializer)?
        .into_window()
        .map_err(|e| D::Error::custom(e.message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_contains_is_half_open() {
        let last = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let current = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let window = DeltaWindow::new(last, current).expect("valid");
        assert!(window.contains(last));
        assert!(!window.contains(current));
    }

    #[test]
    fn test_inverted_window_rejected() {
        let last = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let current = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(DeltaWindow::new(last, current).is_err());
    }

    #[test]
    fn test_members_resolve_by_presence() {
        assert_eq!(DeltaMembers::default().into_window().expect("absent"), None);

        let both = DeltaMembers {
            last_export_date_time: Some(serde_json::json!("2024-01-01T00:00:00Z")),
            current_export_date_time: Some(serde_json::json!("2024-01-02T00:00:00Z")),
        };
        assert!(both.into_window().expect("valid").is_some());
    }

    #[test]
    fn test_half_present_or_malformed_members_rejected() {
        let only_last = DeltaMembers {
            last_export_date_time: Some(serde_json::json!("2024-01-01T00:00:00Z")),
            current_export_date_time: None,
        };
        assert!(only_last.into_window().is_err());

        let garbage = DeltaMembers {
            last_export_date_time: Some(serde_json::json!("not-a-date")),
            current_export_date_time: Some(serde_json::json!("2024-01-02T00:00:00Z")),
        };
        let err = garbage.into_window().expect_err("malformed");
        assert_eq!(err.kind, flowhook_core::error::ErrorKind::Validation);
    }
}
