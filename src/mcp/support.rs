use serde::Deserialize;

/// Custom deserializer for non-empty strings
pub fn deserialize_non_empty_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if s.trim().is_empty() {
        return Err(serde::de::Error::custom("field cannot be empty"));
    }
    Ok(s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Args {
        #[serde(deserialize_with = "deserialize_non_empty_string")]
        repo_key: String,
    }

    #[test]
    fn rejects_blank_values() {
        let result: Result<Args, _> = serde_json::from_str(r#"{"repo_key": "  "}"#);
        assert!(result.is_err());
    }

    #[test]
    fn trims_values() {
        let args: Args = serde_json::from_str(r#"{"repo_key": " road-api "}"#).unwrap();
        assert_eq!(args.repo_key, "road-api");
    }
}
