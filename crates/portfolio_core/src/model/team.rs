//! Team enumeration and team color palette.
//!
//! # Responsibility
//! - Enumerate the fixed set of teams that own project items.
//! - Provide the team -> color lookup used for chart color-coding.
//!
//! # Invariants
//! - Variant declaration order is the chart display order (top-to-bottom):
//!   Construction, Procurement, Interconnection, Development. `Ord` is
//!   derived, so sorted collections keyed by `Team` follow display order.
//! - `Construction` is the reference team for sequencing checks.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Color used for teams missing from a palette.
pub const FALLBACK_TEAM_COLOR: &str = "#999999";

/// Team that owns a project item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Team {
    Construction,
    Procurement,
    Interconnection,
    Development,
}

impl Team {
    /// All teams, in display order.
    pub const DISPLAY_ORDER: [Team; 4] = [
        Team::Construction,
        Team::Procurement,
        Team::Interconnection,
        Team::Development,
    ];

    /// Team whose deadline other teams must not exceed.
    pub const REFERENCE: Team = Team::Construction;

    /// Teams checked against the reference team, in check order.
    pub const SEQUENCE_CHECKED: [Team; 3] = [
        Team::Procurement,
        Team::Development,
        Team::Interconnection,
    ];

    /// Team assigned to items whose team is absent or unknown.
    pub const DEFAULT: Team = Team::Development;

    /// Returns the stable display/storage name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Construction => "Construction",
            Self::Procurement => "Procurement",
            Self::Interconnection => "Interconnection",
            Self::Development => "Development",
        }
    }

    /// Parses a team name, ignoring surrounding whitespace and ASCII case.
    pub fn parse(value: &str) -> Option<Team> {
        let trimmed = value.trim();
        Self::DISPLAY_ORDER
            .into_iter()
            .find(|team| team.as_str().eq_ignore_ascii_case(trimmed))
    }
}

impl Display for Team {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Team -> color identifier mapping.
///
/// Palettes may be partial; lookups for absent teams return
/// [`FALLBACK_TEAM_COLOR`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamPalette {
    colors: BTreeMap<Team, String>,
}

impl TeamPalette {
    /// Creates a palette with no team colors.
    pub fn empty() -> Self {
        Self {
            colors: BTreeMap::new(),
        }
    }

    /// Returns the palette with `team` mapped to `color`.
    pub fn with_color(mut self, team: Team, color: impl Into<String>) -> Self {
        self.colors.insert(team, color.into());
        self
    }

    /// Color for `team`, or the fallback color when the palette lacks it.
    pub fn color_for(&self, team: Team) -> &str {
        self.colors
            .get(&team)
            .map(String::as_str)
            .unwrap_or(FALLBACK_TEAM_COLOR)
    }

    /// Whether the palette defines a color for `team`.
    pub fn contains(&self, team: Team) -> bool {
        self.colors.contains_key(&team)
    }

    /// Palette entries in team display order.
    pub fn entries(&self) -> impl Iterator<Item = (Team, &str)> + '_ {
        self.colors
            .iter()
            .map(|(team, color)| (*team, color.as_str()))
    }
}

impl Default for TeamPalette {
    fn default() -> Self {
        Self::empty()
            .with_color(Team::Procurement, "#0D47A1")
            .with_color(Team::Construction, "#FFD700")
            .with_color(Team::Development, "#9C27B0")
            .with_color(Team::Interconnection, "#00BCD4")
    }
}

#[cfg(test)]
mod tests {
    use super::{Team, TeamPalette, FALLBACK_TEAM_COLOR};

    #[test]
    fn ordering_follows_display_order() {
        let mut teams = vec![
            Team::Development,
            Team::Procurement,
            Team::Interconnection,
            Team::Construction,
        ];
        teams.sort();
        assert_eq!(teams, Team::DISPLAY_ORDER.to_vec());
    }

    #[test]
    fn parse_is_case_insensitive_and_rejects_unknown() {
        assert_eq!(Team::parse(" procurement "), Some(Team::Procurement));
        assert_eq!(Team::parse("CONSTRUCTION"), Some(Team::Construction));
        assert_eq!(Team::parse("Marketing"), None);
        assert_eq!(Team::parse(""), None);
    }

    #[test]
    fn partial_palette_falls_back_for_missing_team() {
        let palette = TeamPalette::empty().with_color(Team::Construction, "#FFD700");
        assert_eq!(palette.color_for(Team::Construction), "#FFD700");
        assert_eq!(palette.color_for(Team::Development), FALLBACK_TEAM_COLOR);
    }

    #[test]
    fn default_palette_lists_entries_in_display_order() {
        let teams: Vec<Team> = TeamPalette::default()
            .entries()
            .map(|(team, _)| team)
            .collect();
        assert_eq!(teams, Team::DISPLAY_ORDER.to_vec());
    }
}
