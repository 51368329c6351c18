//! Level records and their parser.

use crate::error::{CatalogError, LevelField};
use crate::level::{Coord, Skill, SkillBudget, SkillSet, TerrainMap};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map as JsonObject, Value};
use std::time::Duration;

/// One self-contained puzzle definition.
///
/// Records are immutable once loaded: all fields are private and only
/// exposed through accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelRecord {
    name: String,
    time_secs: u32,
    lemmings_to_release: u32,
    required_to_save: u32,
    release_rate_ms: u32,
    entry_point: Coord,
    exit_point: Coord,
    map: TerrainMap,
    available_skills: SkillSet,
}

impl LevelRecord {
    /// Display name. Not unique across a catalog.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Seconds allowed before the level is failed.
    #[must_use]
    pub const fn time_secs(&self) -> u32 {
        self.time_secs
    }

    /// Time limit as a duration.
    #[must_use]
    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(u64::from(self.time_secs))
    }

    /// Total number of lemmings that spawn.
    #[must_use]
    pub const fn lemmings_to_release(&self) -> u32 {
        self.lemmings_to_release
    }

    /// Number of lemmings that must reach the exit.
    #[must_use]
    pub const fn required_to_save(&self) -> u32 {
        self.required_to_save
    }

    /// Milliseconds between spawns.
    #[must_use]
    pub const fn release_rate_ms(&self) -> u32 {
        self.release_rate_ms
    }

    /// Interval between spawns as a duration.
    #[must_use]
    pub fn release_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.release_rate_ms))
    }

    /// Where lemmings appear.
    #[must_use]
    pub const fn entry_point(&self) -> Coord {
        self.entry_point
    }

    /// Where lemmings leave the level.
    #[must_use]
    pub const fn exit_point(&self) -> Coord {
        self.exit_point
    }

    /// Terrain grid.
    #[must_use]
    pub const fn map(&self) -> &TerrainMap {
        &self.map
    }

    /// Skill budgets.
    #[must_use]
    pub const fn available_skills(&self) -> &SkillSet {
        &self.available_skills
    }
}

/// `{x, y}` as written in the table, before bounds checking.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPoint {
    x: i64,
    y: i64,
}

/// A skill count as written in the table.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBudget {
    Count(i64),
    Word(String),
}

/// Parse and validate one record of the level table.
///
/// Fails on the first violated rule, naming the field.
pub(crate) fn parse_level(index: usize, value: &Value) -> Result<LevelRecord, CatalogError> {
    let Some(object) = value.as_object() else {
        return Err(CatalogError::malformed(
            index,
            LevelField::Record,
            format!("expected an object, found {}", kind_of(value)),
        ));
    };

    if let Some(unknown) = object
        .keys()
        .find(|key| !LevelField::ALL.iter().any(|f| f.key() == key.as_str()))
    {
        return Err(CatalogError::malformed(
            index,
            LevelField::Record,
            format!("unknown field `{unknown}`"),
        ));
    }

    let name: String = field(index, object, LevelField::Name)?;
    let time_secs = positive(index, object, LevelField::Time)?;
    let lemmings_to_release = positive(index, object, LevelField::LemmingsToRelease)?;
    let required_to_save = positive(index, object, LevelField::RequiredToSave)?;
    let release_rate_ms = positive(index, object, LevelField::ReleaseRate)?;

    if required_to_save > lemmings_to_release {
        return Err(CatalogError::malformed(
            index,
            LevelField::RequiredToSave,
            format!("{required_to_save} exceeds lemmingsToRelease ({lemmings_to_release})"),
        ));
    }

    let rows: Vec<String> = field(index, object, LevelField::Map)?;
    let map = TerrainMap::parse(&rows)
        .map_err(|e| CatalogError::malformed(index, LevelField::Map, e.to_string()))?;

    let entry_point = point(index, object, LevelField::EntryPoint, &map)?;
    let exit_point = point(index, object, LevelField::ExitPoint, &map)?;

    let available_skills = skills(index, object)?;

    Ok(LevelRecord {
        name,
        time_secs,
        lemmings_to_release,
        required_to_save,
        release_rate_ms,
        entry_point,
        exit_point,
        map,
        available_skills,
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn field<T: DeserializeOwned>(
    index: usize,
    object: &JsonObject<String, Value>,
    field: LevelField,
) -> Result<T, CatalogError> {
    let value = object
        .get(field.key())
        .ok_or_else(|| CatalogError::malformed(index, field, "missing field"))?;
    T::deserialize(value).map_err(|e| CatalogError::malformed(index, field, e.to_string()))
}

fn positive(
    index: usize,
    object: &JsonObject<String, Value>,
    name: LevelField,
) -> Result<u32, CatalogError> {
    let value: i64 = field(index, object, name)?;
    if value <= 0 {
        return Err(CatalogError::malformed(
            index,
            name,
            format!("must be positive, got {value}"),
        ));
    }
    u32::try_from(value).map_err(|_| {
        CatalogError::malformed(index, name, format!("{value} is too large"))
    })
}

fn point(
    index: usize,
    object: &JsonObject<String, Value>,
    name: LevelField,
    map: &TerrainMap,
) -> Result<Coord, CatalogError> {
    let raw: RawPoint = field(index, object, name)?;
    let out_of_bounds = || {
        CatalogError::malformed(
            index,
            name,
            format!(
                "({}, {}) is outside the {}x{} map",
                raw.x,
                raw.y,
                map.width(),
                map.height()
            ),
        )
    };
    let x = u16::try_from(raw.x).map_err(|_| out_of_bounds())?;
    let y = u16::try_from(raw.y).map_err(|_| out_of_bounds())?;
    let coord = Coord::new(x, y);

    match map.get(coord) {
        None => Err(out_of_bounds()),
        Some(terrain) if terrain.is_solid() => Err(CatalogError::malformed(
            index,
            name,
            format!("{coord} is solid ground"),
        )),
        Some(_) => Ok(coord),
    }
}

fn skills(index: usize, object: &JsonObject<String, Value>) -> Result<SkillSet, CatalogError> {
    let name = LevelField::AvailableSkills;
    let raw: JsonObject<String, Value> = field(index, object, name)?;

    let mut set = SkillSet::empty();
    for (key, value) in &raw {
        let skill = key
            .parse::<Skill>()
            .map_err(|e| CatalogError::malformed(index, name, e.to_string()))?;
        let budget = RawBudget::deserialize(value).map_err(|_| {
            CatalogError::malformed(
                index,
                name,
                format!("`{skill}` must be a non-negative integer or \"unlimited\""),
            )
        })?;
        let budget = match budget {
            RawBudget::Count(n) => u32::try_from(n).map(SkillBudget::Limited).map_err(|_| {
                CatalogError::malformed(index, name, format!("`{skill}` count {n} is out of range"))
            })?,
            RawBudget::Word(word) if word == "unlimited" || word == "Infinity" => {
                SkillBudget::Unlimited
            }
            RawBudget::Word(word) => {
                return Err(CatalogError::malformed(
                    index,
                    name,
                    format!("`{skill}` has unrecognised budget {word:?}"),
                ));
            }
        };
        set = set.with(skill, budget);
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stroll() -> Value {
        json!({
            "name": "Level 1: A Simple Stroll",
            "time": 60,
            "lemmingsToRelease": 3,
            "requiredToSave": 2,
            "releaseRate": 3000,
            "entryPoint": { "x": 1, "y": 2 },
            "exitPoint": { "x": 10, "y": 2 },
            "map": ["111111111111", "100000000001", "1E11111111X1", "111111111111"],
            "availableSkills": { "digger": 0 }
        })
    }

    fn malformed_field(value: &Value) -> LevelField {
        match parse_level(3, value) {
            Err(CatalogError::MalformedLevel { index, field, .. }) => {
                assert_eq!(index, 3);
                field
            }
            other => panic!("expected MalformedLevel, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_valid_record() {
        let level = parse_level(0, &stroll()).unwrap();
        assert_eq!(level.name(), "Level 1: A Simple Stroll");
        assert_eq!(level.time_secs(), 60);
        assert_eq!(level.time_limit(), Duration::from_secs(60));
        assert_eq!(level.release_interval(), Duration::from_millis(3000));
        assert_eq!(level.entry_point(), Coord::new(1, 2));
        assert_eq!(level.map().width(), 12);
        assert_eq!(level.available_skills().get(Skill::Digger), SkillBudget::Limited(0));
    }

    #[test]
    fn test_missing_field() {
        for name in LevelField::ALL {
            let mut value = stroll();
            value.as_object_mut().unwrap().remove(name.key());
            assert_eq!(malformed_field(&value), name);
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut value = stroll();
        value["music"] = json!("tune1.ogg");
        assert_eq!(malformed_field(&value), LevelField::Record);
    }

    #[test]
    fn test_non_object_record() {
        assert_eq!(malformed_field(&json!([1, 2, 3])), LevelField::Record);
    }

    #[test]
    fn test_non_positive_scalars() {
        for (name, bad) in [
            (LevelField::Time, json!(0)),
            (LevelField::LemmingsToRelease, json!(-5)),
            (LevelField::ReleaseRate, json!("fast")),
            (LevelField::Time, json!(1.5)),
        ] {
            let mut value = stroll();
            value[name.key()] = bad;
            assert_eq!(malformed_field(&value), name);
        }
    }

    #[test]
    fn test_required_exceeds_released() {
        let mut value = stroll();
        value["requiredToSave"] = json!(4);
        assert_eq!(malformed_field(&value), LevelField::RequiredToSave);
    }

    #[test]
    fn test_ragged_map_rejected() {
        let mut value = stroll();
        value["map"][2] = json!("1E111111111X1");
        assert_eq!(malformed_field(&value), LevelField::Map);
    }

    #[test]
    fn test_out_of_bounds_points() {
        let mut value = stroll();
        value["exitPoint"] = json!({ "x": 12, "y": 2 });
        assert_eq!(malformed_field(&value), LevelField::ExitPoint);

        let mut value = stroll();
        value["entryPoint"] = json!({ "x": -1, "y": 0 });
        assert_eq!(malformed_field(&value), LevelField::EntryPoint);
    }

    #[test]
    fn test_point_on_solid_rejected() {
        let mut value = stroll();
        value["entryPoint"] = json!({ "x": 0, "y": 0 });
        assert_eq!(malformed_field(&value), LevelField::EntryPoint);
    }

    #[test]
    fn test_skill_budgets() {
        let mut value = stroll();
        value["availableSkills"] = json!({ "floater": "unlimited", "bomber": "Infinity", "miner": 2 });
        let level = parse_level(0, &value).unwrap();
        let skills = level.available_skills();
        assert!(skills.is_unlimited(Skill::Floater));
        assert!(skills.is_unlimited(Skill::Bomber));
        assert_eq!(skills.get(Skill::Miner), SkillBudget::Limited(2));
        assert_eq!(skills.get(Skill::Digger), SkillBudget::NONE);
    }

    #[test]
    fn test_bad_skills_rejected() {
        for bad in [
            json!({ "climber": 1 }),
            json!({ "digger": -1 }),
            json!({ "digger": "lots" }),
            json!({ "digger": null }),
            json!([]),
        ] {
            let mut value = stroll();
            value["availableSkills"] = bad;
            assert_eq!(malformed_field(&value), LevelField::AvailableSkills);
        }
    }
}
