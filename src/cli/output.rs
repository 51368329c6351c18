//! Output formatting utilities for CLI.

use lemmings::level::{Coord, LevelRecord, SkillBudget, Terrain};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// JSON-serializable level summary.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct JsonLevelSummary<'a> {
    /// Position in the catalog.
    pub(super) index: usize,
    /// Display name.
    pub(super) name: &'a str,
    /// Map width in cells.
    pub(super) width: u16,
    /// Map height in cells.
    pub(super) height: u16,
    /// Time limit in seconds.
    pub(super) time: u32,
    /// Lemmings spawned.
    pub(super) lemmings_to_release: u32,
    /// Lemmings that must reach the exit.
    pub(super) required_to_save: u32,
    /// Milliseconds between spawns.
    pub(super) release_rate: u32,
    /// Spawn cell.
    pub(super) entry_point: Coord,
    /// Goal cell.
    pub(super) exit_point: Coord,
    /// Skills with at least one use, keyed by name.
    pub(super) available_skills: BTreeMap<&'static str, SkillBudget>,
}

impl<'a> JsonLevelSummary<'a> {
    /// Create from a catalog entry.
    pub(super) fn from_level(index: usize, level: &'a LevelRecord) -> Self {
        Self {
            index,
            name: level.name(),
            width: level.map().width(),
            height: level.map().height(),
            time: level.time_secs(),
            lemmings_to_release: level.lemmings_to_release(),
            required_to_save: level.required_to_save(),
            release_rate: level.release_rate_ms(),
            entry_point: level.entry_point(),
            exit_point: level.exit_point(),
            available_skills: level
                .available_skills()
                .available()
                .map(|(skill, budget)| (skill.as_str(), budget))
                .collect(),
        }
    }
}

/// One-line summary of a level.
pub(super) fn format_summary(index: usize, level: &LevelRecord) -> String {
    format!(
        "{index:>3}  {:<36} {:>2}x{:<2}  save {}/{}  {}s",
        level.name(),
        level.map().width(),
        level.map().height(),
        level.required_to_save(),
        level.lemmings_to_release(),
        level.time_secs(),
    )
}

/// Full description of a level, including its terrain.
pub(super) fn format_level(index: usize, level: &LevelRecord) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Level {index}: {}", level.name());
    let _ = writeln!(output, "  Time limit:   {}s", level.time_secs());
    let _ = writeln!(
        output,
        "  Lemmings:     {} released, {} to save",
        level.lemmings_to_release(),
        level.required_to_save()
    );
    let _ = writeln!(output, "  Release rate: every {} ms", level.release_rate_ms());
    let _ = writeln!(output, "  Entry:        {}", level.entry_point());
    let _ = writeln!(output, "  Exit:         {}", level.exit_point());

    output.push_str("  Skills:      ");
    let mut any = false;
    for (skill, budget) in level.available_skills().available() {
        let _ = write!(output, " {skill}={budget}");
        any = true;
    }
    if !any {
        output.push_str(" none");
    }
    output.push_str("\n\n");

    output.push_str(&render_map(level));
    output.push('\n');
    for terrain in Terrain::ALL {
        let _ = writeln!(output, "  {}  {}", terrain.code(), terrain.description());
    }
    output.push_str("  @  entry point\n  *  exit point\n");

    output
}

/// Draw the terrain with the explicit entry and exit overlaid as `@` and `*`.
pub(super) fn render_map(level: &LevelRecord) -> String {
    let map = level.map();
    let mut output = String::new();
    for y in 0..map.height() {
        output.push_str("  ");
        for x in 0..map.width() {
            let coord = Coord::new(x, y);
            let glyph = if coord == level.entry_point() {
                '@'
            } else if coord == level.exit_point() {
                '*'
            } else {
                map.get(coord).map_or(' ', Terrain::code)
            };
            output.push(glyph);
        }
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_overlays_points() {
        let catalog = lemmings::load_catalog().unwrap();
        let level = catalog.get_level(0).unwrap();
        let rendered = render_map(level);
        let rows: Vec<&str> = rendered.lines().collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[2].trim().chars().nth(1), Some('@'));
    }

    #[test]
    fn test_json_summary_lists_only_available_skills() {
        let catalog = lemmings::load_catalog().unwrap();
        let summary = JsonLevelSummary::from_level(0, catalog.get_level(0).unwrap());
        assert!(!summary.available_skills.contains_key("digger"));
        assert_eq!(summary.width, 12);
    }
}
