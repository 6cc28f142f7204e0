use serde_json::Value;
use std::{fs, path::PathBuf};

/// # Errors
///
/// Will return `Err` if the file is not readable or is not valid json in
/// the seed shape.
pub fn check_readable_file_and_json(file: &str) -> Result<Value, String> {
    let path = PathBuf::from(file);
    if !path.is_file() || fs::metadata(&path).is_err() {
        return Err(format!("The json file '{file}' is not readable."));
    }
    let contents =
        fs::read_to_string(&path).map_err(|e| format!("Could not read '{file}': {e}"))?;
    let json: Value =
        serde_json::from_str(&contents).map_err(|e| format!("'{file}' is not valid json: {e}"))?;
    validate_seed_format(&json)?;
    Ok(json)
}

/// Validate the seed file shape. Expected:
/// { "tournaments": [{ tournament fields..., "players": [...] }],
///   "officials": [{"device_id": "...", "name": "..."}] }
///
/// # Errors
///
/// Will return `Err` if the json is not in the correct format.
fn validate_seed_format(json: &Value) -> Result<(), String> {
    let Some(object) = json.as_object() else {
        return Err("The seed file is not a json object.".to_string());
    };

    let expected_keys = ["tournaments", "officials"];
    for key in object.keys() {
        if !expected_keys.contains(&key.as_str()) {
            return Err(format!(
                "The seed file is not in the correct format. Expected keys: {expected_keys:?}"
            ));
        }
    }

    if let Some(tournaments) = object.get("tournaments") {
        let Some(tournaments) = tournaments.as_array() else {
            return Err("The seed key tournaments must be an array.".to_string());
        };
        for tournament in tournaments {
            if !tournament["tournament_id"].is_number() || !tournament["name"].is_string() {
                return Err(
                    "Each tournament needs a numeric tournament_id and a string name."
                        .to_string(),
                );
            }
        }
    }

    if let Some(officials) = object.get("officials") {
        let Some(officials) = officials.as_array() else {
            return Err("The seed key officials must be an array.".to_string());
        };
        for official in officials {
            if !official["device_id"].is_string() || !official["name"].is_string() {
                return Err(
                    "Each official needs a string device_id and a string name.".to_string(),
                );
            }
        }
    }

    Ok(())
}
