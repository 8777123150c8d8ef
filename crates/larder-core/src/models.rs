//! Data model for larder entries.
//!
//! Every collection stores the same structural shape: a flat bag of
//! string/string-array fields plus a store-generated identifier. The
//! per-collection differences live entirely in the field schemas returned by
//! [`Collection::fields`], which drive form rendering and CSV import.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// Flat field map of an entry: field name to JSON value.
///
/// Values are strings, except `seasons` on seasonal ingredients which is an
/// array of season names.
pub type FieldMap = serde_json::Map<String, serde_json::Value>;

/// The four independent entry collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Collection {
    Meals,
    Sides,
    Ideas,
    SeasonalIngredients,
}

impl Collection {
    /// All collections, in navigation order.
    pub const ALL: [Collection; 4] = [
        Collection::Meals,
        Collection::Sides,
        Collection::Ideas,
        Collection::SeasonalIngredients,
    ];

    /// URL path segment / table discriminator for this collection.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Meals => "meals",
            Collection::Sides => "sides",
            Collection::Ideas => "ideas",
            Collection::SeasonalIngredients => "seasonal-ingredients",
        }
    }

    /// Field schema for this collection.
    ///
    /// `name` is required and non-empty everywhere; `seasons` is required on
    /// seasonal ingredients and must be a non-empty set when present.
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            Collection::Meals | Collection::Sides | Collection::Ideas => &[
                FieldSpec {
                    name: "name",
                    label: "Name",
                    required: true,
                    kind: FieldKind::Text,
                },
                FieldSpec {
                    name: "description",
                    label: "Description",
                    required: false,
                    kind: FieldKind::Text,
                },
                FieldSpec {
                    name: "notes",
                    label: "Notes",
                    required: false,
                    kind: FieldKind::Multiline,
                },
                FieldSpec {
                    name: "recipe",
                    label: "Recipe",
                    required: false,
                    kind: FieldKind::Multiline,
                },
            ],
            Collection::SeasonalIngredients => &[
                FieldSpec {
                    name: "name",
                    label: "Name",
                    required: true,
                    kind: FieldKind::Text,
                },
                FieldSpec {
                    name: "seasons",
                    label: "Seasons",
                    required: true,
                    kind: FieldKind::Seasons,
                },
                FieldSpec {
                    name: "description",
                    label: "Description",
                    required: false,
                    kind: FieldKind::Multiline,
                },
            ],
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "meals" => Ok(Collection::Meals),
            "sides" => Ok(Collection::Sides),
            "ideas" => Ok(Collection::Ideas),
            "seasonal-ingredients" => Ok(Collection::SeasonalIngredients),
            other => Err(Error::NotFound(format!("Unknown collection '{}'", other))),
        }
    }
}

/// How a field is entered and rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Single-line text.
    Text,
    /// Multi-line text; may contain newlines and embedded URLs.
    Multiline,
    /// Set of season names drawn from [`Season`].
    Seasons,
}

/// Schema entry for one field of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub required: bool,
    pub kind: FieldKind,
}

/// A stored document: identifier plus flat field map.
///
/// Serializes as a single flat JSON object (`{"id": ..., "name": ..., ...}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Store-generated identifier, immutable and unique within a collection.
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: FieldMap,
}

impl Entry {
    /// Seasons this entry is tagged with. Unknown or non-string values are
    /// skipped; entries without a `seasons` field yield an empty set.
    pub fn seasons(&self) -> Vec<Season> {
        self.fields
            .get("seasons")
            .and_then(|v| v.as_array())
            .map(|values| {
                values
                    .iter()
                    .filter_map(|v| v.as_str())
                    .filter_map(|s| s.parse().ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether this entry is tagged with the given season.
    pub fn in_season(&self, season: Season) -> bool {
        self.seasons().contains(&season)
    }
}

/// Borrow a field as a string, if present and a string.
pub fn field_str<'a>(fields: &'a FieldMap, name: &str) -> Option<&'a str> {
    fields.get(name).and_then(|v| v.as_str())
}

/// Whether the field map carries a non-empty `name` after trimming.
///
/// This is the only server-side content rule: bulk imports drop rows that
/// fail it, and imports where every row fails are rejected outright.
pub fn has_nonempty_name(fields: &FieldMap) -> bool {
    field_str(fields, "name")
        .map(|s| !s.trim().is_empty())
        .unwrap_or(false)
}

/// Remove the identifier key from an incoming partial document.
///
/// Update payloads may echo the entry's `id`; it is never applied as a field.
pub fn strip_id(fields: &mut FieldMap) {
    fields.remove("id");
}

/// Meteorological season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// All seasons, in calendar order starting at spring.
    pub const ALL: [Season; 4] = [
        Season::Spring,
        Season::Summer,
        Season::Autumn,
        Season::Winter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        }
    }

    /// The meteorological season containing the given instant:
    /// Mar-May spring, Jun-Aug summer, Sep-Nov autumn, Dec-Feb winter.
    pub fn current(at: &DateTime<Utc>) -> Season {
        match at.month() {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "autumn" => Ok(Season::Autumn),
            "winter" => Ok(Season::Winter),
            other => Err(Error::InvalidInput(format!("Unknown season '{}'", other))),
        }
    }
}
