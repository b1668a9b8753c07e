//! Project item domain model.
//!
//! # Responsibility
//! - Define the resolved `Item` record consumed by timeline computations.
//! - Define the loosely-typed `RawItem` shape accepted from editors/imports.
//!
//! # Invariants
//! - `Item::months >= 1`, recomputed from `start_date`/`end_date`.
//! - `end_date` may precede `start_date`; months still floor to 1.

use crate::model::project::ProjectId;
use crate::model::team::Team;
use crate::timeline::duration::{display_months, months_between};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Item identifier, unique within a store (for example `I007`).
pub type ItemId = String;

/// Name assigned to items submitted without one.
pub const UNTITLED_ITEM_NAME: &str = "Untitled Item";

/// Team-owned task attached to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: ItemId,
    pub project_id: ProjectId,
    pub item_name: String,
    pub team: Team,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Whole months between the dates, derived.
    pub months: u32,
}

impl Item {
    /// Creates an item and derives `months` from the dates.
    pub fn new(
        item_id: impl Into<String>,
        project_id: impl Into<String>,
        item_name: impl Into<String>,
        team: Team,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            project_id: project_id.into(),
            item_name: item_name.into(),
            team,
            start_date,
            end_date,
            months: months_between(start_date, end_date),
        }
    }

    /// Re-derives `months` after a date change.
    pub fn recompute_months(&mut self) {
        self.months = months_between(self.start_date, self.end_date);
    }

    /// Months clipped for chart display. Does not modify `months`.
    pub fn display_months(&self) -> u32 {
        display_months(self.months)
    }
}

/// Date value as received at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDate {
    Date(NaiveDate),
    Text(String),
    #[default]
    Missing,
}

impl RawDate {
    /// True for `Missing` and for whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Date(_) => false,
            Self::Text(text) => text.trim().is_empty(),
            Self::Missing => true,
        }
    }
}

impl From<NaiveDate> for RawDate {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<Option<NaiveDate>> for RawDate {
    fn from(value: Option<NaiveDate>) -> Self {
        value.map_or(Self::Missing, Self::Date)
    }
}

impl From<&str> for RawDate {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawDate {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Unresolved item row with optional fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub item_id: Option<String>,
    pub project_id: ProjectId,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub start_date: RawDate,
    #[serde(default)]
    pub end_date: RawDate,
}

impl RawItem {
    /// Creates an empty row for `project_id`.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.item_name = Some(name.into());
        self
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    pub fn with_dates(mut self, start: impl Into<RawDate>, end: impl Into<RawDate>) -> Self {
        self.start_date = start.into();
        self.end_date = end.into();
        self
    }

    /// True when every user-editable field is empty (an untouched editor row).
    pub fn is_blank(&self) -> bool {
        fn empty(value: &Option<String>) -> bool {
            value.as_deref().map_or(true, |text| text.trim().is_empty())
        }

        empty(&self.item_id)
            && empty(&self.item_name)
            && empty(&self.team)
            && self.start_date.is_blank()
            && self.end_date.is_blank()
    }
}

impl From<&Item> for RawItem {
    fn from(value: &Item) -> Self {
        Self {
            item_id: Some(value.item_id.clone()),
            project_id: value.project_id.clone(),
            item_name: Some(value.item_name.clone()),
            team: Some(value.team.as_str().to_string()),
            start_date: value.start_date.into(),
            end_date: value.end_date.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Item, RawDate, RawItem};
    use crate::model::team::Team;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_item_derives_months_from_dates() {
        let item = Item::new(
            "I001",
            "P001",
            "Permitting",
            Team::Development,
            Some(date(2025, 1, 1)),
            Some(date(2025, 3, 15)),
        );
        assert_eq!(item.months, 3);
    }

    #[test]
    fn display_months_clips_without_touching_months() {
        let item = Item::new(
            "I001",
            "P001",
            "Lease",
            Team::Development,
            Some(date(2000, 1, 1)),
            Some(date(2040, 1, 1)),
        );
        assert_eq!(item.months, 480);
        assert_eq!(item.display_months(), 360);
        assert_eq!(item.months, 480);
    }

    #[test]
    fn raw_item_blank_detection_ignores_project_id() {
        assert!(RawItem::new("P001").is_blank());
        assert!(RawItem::new("P001")
            .with_dates(RawDate::from("  "), RawDate::Missing)
            .is_blank());
        assert!(!RawItem::new("P001").with_name("Civil works").is_blank());
    }

    #[test]
    fn raw_date_deserializes_dates_text_and_null() {
        let parsed: Vec<RawDate> =
            serde_json::from_str(r#"["2025-01-15", "Jan 15, 2025", null]"#).unwrap();
        assert_eq!(parsed[0], RawDate::Date(date(2025, 1, 15)));
        assert_eq!(parsed[1], RawDate::Text("Jan 15, 2025".to_string()));
        assert_eq!(parsed[2], RawDate::Missing);
    }
}
