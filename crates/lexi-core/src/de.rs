//! Lenient deserializers for fields that models return in more than one shape.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// Frequency ranks arrive as integers, floats or numeric strings
pub fn frequency<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Float(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(n) => u32::try_from(n).map_err(D::Error::custom),
        Raw::Float(f) if f.fract() == 0.0 && f >= 0.0 && f <= u32::MAX as f64 => Ok(f as u32),
        Raw::Float(f) => Err(D::Error::custom(format!("frequency is not a whole number in range: {f}"))),
        Raw::Text(s) => s
            .trim()
            .parse::<u32>()
            .map_err(|_| D::Error::custom(format!("invalid frequency: {s:?}"))),
    }
}

/// `null` and missing values become the literal text "null"
pub fn null_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.unwrap_or_else(|| "null".to_string()))
}

/// Accept `"n"` as well as `["n"]`
pub fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::One(s) => vec![s],
        Raw::Many(v) => v,
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "super::frequency")]
        frequency: u32,
        #[serde(default = "null_text", deserialize_with = "super::null_as_text")]
        chu_nom: String,
        #[serde(deserialize_with = "super::one_or_many")]
        pos: Vec<String>,
    }

    fn null_text() -> String {
        "null".to_string()
    }

    #[test]
    fn test_frequency_shapes() {
        for raw in [json!(45), json!(45.0), json!("45"), json!(" 45 ")] {
            let sample: Sample =
                serde_json::from_value(json!({"frequency": raw, "chu_nom": "x", "pos": "n"})).unwrap();
            assert_eq!(sample.frequency, 45);
        }
    }

    #[test]
    fn test_frequency_rejects_garbage() {
        for raw in [json!(-3), json!(45.5), json!("common"), json!(null)] {
            let result = serde_json::from_value::<Sample>(json!({"frequency": raw, "pos": []}));
            assert!(result.is_err(), "accepted {raw}");
        }
    }

    #[test]
    fn test_null_and_pos_shapes() {
        let sample: Sample =
            serde_json::from_value(json!({"frequency": 1, "chu_nom": null, "pos": "v"})).unwrap();
        assert_eq!(sample.chu_nom, "null");
        assert_eq!(sample.pos, vec!["v"]);

        let sample: Sample =
            serde_json::from_value(json!({"frequency": 1, "pos": ["a", "n"]})).unwrap();
        assert_eq!(sample.chu_nom, "null");
        assert_eq!(sample.pos, vec!["a", "n"]);
    }
}
