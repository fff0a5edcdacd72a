use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Where on the bed the sliced model is centered, in millimeters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Position {
    /// X coordinate of the model's center.
    pub x: i64,
    /// Y coordinate of the model's center.
    pub y: i64,
}

/// Body of the `slice` command issued against an uploaded model. OctoPrint
/// slices in the background; the command returns as soon as the job is
/// queued.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceCommand {
    command: Verb,

    /// Slicer registered with OctoPrint, e.g. `cura`.
    pub slicer: String,

    /// Name of the gcode file to produce.
    pub gcode: String,

    /// Printer profile to slice for, the server default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub printer_profile: Option<String>,

    /// Slicing profile, the slicer default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Individual profile settings overriding the selected profile, sent
    /// as top level `profile.<key>` members.
    #[serde(flatten, serialize_with = "serialize_overrides")]
    pub overrides: Vec<(String, Value)>,

    /// Center of the model on the bed.
    pub position: Position,

    /// Start printing once slicing is done.
    pub print: bool,
}

impl SliceCommand {
    /// Slice with `slicer` into a gcode file named `gcode`, using server
    /// defaults for everything else.
    pub fn new(slicer: &str, gcode: &str) -> Self {
        Self {
            command: Verb::Slice,
            slicer: slicer.to_owned(),
            gcode: gcode.to_owned(),
            printer_profile: None,
            profile: None,
            overrides: vec![],
            position: Position::default(),
            print: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Verb {
    Slice,
}

fn serialize_overrides<S: Serializer>(overrides: &[(String, Value)], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(overrides.len()))?;
    for (key, value) in overrides {
        map.serialize_entry(&format!("profile.{}", key), value)?;
    }
    map.end()
}

/// Parse `key:value, key:value` profile overrides.
///
/// Values that are valid JSON keep their type (`0.2`, `true`, `"grid"`),
/// anything else is sent as a string. Pairs missing a key or a value are
/// skipped.
pub fn parse_profile_overrides(overrides: &str) -> Vec<(String, Value)> {
    let mut parsed = vec![];
    for pair in overrides.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let Some((key, value)) = pair.split_once(':') else {
            tracing::warn!(pair, "ignoring profile override without a value");
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            tracing::warn!(pair, "ignoring incomplete profile override");
            continue;
        }
        let value = serde_json::from_str(value).unwrap_or_else(|_| Value::from(value));
        parsed.push((key.to_owned(), value));
    }
    parsed
}
