use crate::domain::model::{ExtractedRecord, ExtractionSpec};
use serde_json::{Deserializer, Map, Value};

/// Best-effort recovery of a JSON object embedded in free text.
///
/// Every `{` in `text` is tried as the start of a JSON value; parsing stops at
/// the end of that value, so prose or fences after it are ignored. An object
/// qualifies when its top-level keys include every property of `spec`.
///
/// Among qualifying objects the first one whose keys are exactly the spec's
/// properties wins; failing that, the first qualifying object in text order.
/// Malformed fragments are skipped. Returns `None` when nothing qualifies.
pub fn extract_json(text: &str, spec: &ExtractionSpec) -> Option<ExtractedRecord> {
    let mut first_superset: Option<Map<String, Value>> = None;

    for (idx, _) in text.match_indices('{') {
        let Some(object) = parse_object_at(&text[idx..]) else {
            continue;
        };

        if !spec.is_satisfied_by(&object) {
            continue;
        }

        if spec.matches_exactly(&object) {
            return Some(ExtractedRecord::new(object));
        }

        if first_superset.is_none() {
            first_superset = Some(object);
        }
    }

    first_superset.map(ExtractedRecord::new)
}

/// Same as [`extract_json`] for a literal key list. `None` if the list is
/// empty or repeats a key.
pub fn extract_json_keys(text: &str, properties: &[&str]) -> Option<ExtractedRecord> {
    let spec = ExtractionSpec::new(properties.iter().copied())?;
    extract_json(text, &spec)
}

fn parse_object_at(fragment: &str) -> Option<Map<String, Value>> {
    let mut values = Deserializer::from_str(fragment).into_iter::<Value>();
    match values.next()? {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}
