//! Resolution of raw item rows into `Item` records.
//!
//! # Responsibility
//! - Apply date normalization and month derivation to raw rows.
//! - Default missing item names and teams.
//!
//! # Invariants
//! - Output order matches input order, one `Item` per `RawItem`.
//! - Unparseable dates stay `None`; callers decide how to backfill.
//! - Normalizing already-canonical items is idempotent.

use crate::model::item::{Item, RawDate, RawItem, UNTITLED_ITEM_NAME};
use crate::model::team::Team;
use crate::timeline::dates::normalize_dates;
use crate::timeline::duration::{months_between, MAX_DISPLAY_MONTHS};
use log::warn;

/// Normalized items plus diagnostic counters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedItems {
    pub items: Vec<Item>,
    /// Non-blank start/end values that could not be parsed.
    pub unparseable_dates: usize,
    /// Item names or teams replaced by defaults.
    pub defaulted_fields: usize,
}

/// Resolves raw rows: dates, months, default name and team.
///
/// A missing `item_id` becomes an empty string; ID assignment belongs to the
/// save path.
pub fn normalize_item_dates(raw_items: &[RawItem]) -> NormalizedItems {
    let starts: Vec<RawDate> = raw_items.iter().map(|raw| raw.start_date.clone()).collect();
    let ends: Vec<RawDate> = raw_items.iter().map(|raw| raw.end_date.clone()).collect();
    let start_column = normalize_dates(&starts);
    let end_column = normalize_dates(&ends);

    let mut defaulted_fields = 0;
    let mut items = Vec::with_capacity(raw_items.len());
    for ((raw, start), end) in raw_items
        .iter()
        .zip(start_column.dates)
        .zip(end_column.dates)
    {
        let item_name = match raw.item_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                defaulted_fields += 1;
                UNTITLED_ITEM_NAME.to_string()
            }
        };
        let team = resolve_team(raw, &mut defaulted_fields);

        let months = months_between(start, end);
        if months > MAX_DISPLAY_MONTHS {
            warn!(
                "event=item_normalize module=timeline status=long_duration project_id={} item_name={} months={}",
                raw.project_id, item_name, months
            );
        }

        items.push(Item {
            item_id: raw.item_id.clone().unwrap_or_default(),
            project_id: raw.project_id.clone(),
            item_name,
            team,
            start_date: start,
            end_date: end,
            months,
        });
    }

    let unparseable_dates = start_column.unparseable + end_column.unparseable;
    if unparseable_dates > 0 {
        warn!(
            "event=item_normalize module=timeline status=recovered field=date unparseable={} items={}",
            unparseable_dates,
            raw_items.len()
        );
    }

    NormalizedItems {
        items,
        unparseable_dates,
        defaulted_fields,
    }
}

fn resolve_team(raw: &RawItem, defaulted_fields: &mut usize) -> Team {
    let value = raw.team.as_deref().map(str::trim).unwrap_or("");
    if value.is_empty() {
        *defaulted_fields += 1;
        return Team::DEFAULT;
    }
    match Team::parse(value) {
        Some(team) => team,
        None => {
            *defaulted_fields += 1;
            warn!(
                "event=item_normalize module=timeline status=recovered field=team project_id={} value={}",
                raw.project_id, value
            );
            Team::DEFAULT
        }
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_item_dates;
    use crate::model::item::{RawDate, RawItem, UNTITLED_ITEM_NAME};
    use crate::model::team::Team;
    use chrono::NaiveDate;

    #[test]
    fn defaults_missing_name_and_unknown_team() {
        let normalized = normalize_item_dates(&[
            RawItem::new("P001").with_team("Marketing"),
            RawItem::new("P001").with_name("  ").with_team("construction"),
        ]);
        assert_eq!(normalized.items[0].item_name, UNTITLED_ITEM_NAME);
        assert_eq!(normalized.items[0].team, Team::Development);
        assert_eq!(normalized.items[1].team, Team::Construction);
        assert_eq!(normalized.defaulted_fields, 3);
    }

    #[test]
    fn unparseable_dates_stay_missing_and_months_default() {
        let normalized = normalize_item_dates(&[RawItem::new("P001")
            .with_name("Survey")
            .with_dates(RawDate::from("someday"), RawDate::from("Mar 1, 2025"))]);
        let item = &normalized.items[0];
        assert_eq!(item.start_date, None);
        assert_eq!(item.end_date, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(item.months, 1);
        assert_eq!(normalized.unparseable_dates, 1);
    }
}
