//! JSON documents on disk

use apkschema_core::Result;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Serializer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const INDENT: &[u8] = b"    ";

/// Write `value` as UTF-8 JSON indented by four spaces.
/// Non-ASCII text is written as-is, not escaped.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    let mut serializer = Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut serializer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_write_json_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("config.json");

        write_json(&path, &json!({"Name": "ブルーアーカイブ", "List": [1]})).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "{\n    \"Name\": \"ブルーアーカイブ\",\n    \"List\": [\n        1\n    ]\n}"
        );
    }

    #[test]
    fn test_round_trip_keeps_key_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resources.json");
        let payload: Value =
            serde_json::from_str(r#"{"z": 1, "a": {"nested": [true, null, 1.5]}, "m": "x"}"#).unwrap();

        write_json(&path, &payload).unwrap();
        let back: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(back, payload);
        let keys: Vec<_> = back.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }
}
