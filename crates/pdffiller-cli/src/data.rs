//! Decoding of fill data from JSON or YAML.
//!
//! Two shapes are accepted: a mapping `{name: value}` or a list of
//! `{name, value}` objects. Either way values are applied in document order.

use std::io::Read;
use std::path::Path;

use indexmap::IndexMap;
use pdffiller::InputValue;
use serde::Deserialize;

use crate::exit_codes::{ERROR_ENCOUNTERED, ERROR_GENERAL};

#[derive(Debug, Deserialize)]
struct Entry {
    name: String,
    value: InputValue,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FillData {
    Entries(Vec<Entry>),
    Mapping(IndexMap<String, InputValue>),
}

impl FillData {
    fn into_pairs(self) -> Vec<(String, InputValue)> {
        match self {
            FillData::Entries(entries) => entries.into_iter().map(|e| (e.name, e.value)).collect(),
            FillData::Mapping(map) => map.into_iter().collect(),
        }
    }
}

pub fn parse_json(text: &str) -> Result<Vec<(String, InputValue)>, String> {
    serde_json::from_str::<FillData>(text)
        .map(FillData::into_pairs)
        .map_err(|e| e.to_string())
}

pub fn parse_yaml(text: &str) -> Result<Vec<(String, InputValue)>, String> {
    serde_yaml::from_str::<FillData>(text)
        .map(FillData::into_pairs)
        .map_err(|e| e.to_string())
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

/// Load field/value pairs from `--data` or `--input-data`.
///
/// Returns `Err(1)` if the data file does not exist and `Err(6)` if it
/// cannot be read or decoded.
pub fn load(
    data: Option<&str>,
    input_data: Option<&str>,
) -> Result<Vec<(String, InputValue)>, i32> {
    let (source, parsed) = match (input_data, data) {
        (Some(inline), _) => ("input data".to_string(), parse_json(inline)),
        (None, Some("-")) => {
            let mut text = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut text) {
                eprintln!("Error: failed to read stdin: {e}");
                return Err(ERROR_ENCOUNTERED);
            }
            ("stdin".to_string(), parse_json(&text))
        }
        (None, Some(path)) => {
            let path = Path::new(path);
            if !path.is_file() {
                eprintln!("Error: file not found: {}", path.display());
                return Err(ERROR_GENERAL);
            }
            let text = std::fs::read_to_string(path).map_err(|e| {
                eprintln!("Error: failed to read {}: {e}", path.display());
                ERROR_ENCOUNTERED
            })?;
            let parsed = if is_yaml(path) {
                parse_yaml(&text)
            } else {
                parse_json(&text)
            };
            (path.display().to_string(), parsed)
        }
        (None, None) => {
            eprintln!("Error: no data given");
            return Err(ERROR_GENERAL);
        }
    };

    parsed.map_err(|e| {
        eprintln!("Error: failed to load {source}: {e}");
        ERROR_ENCOUNTERED
    })
}
