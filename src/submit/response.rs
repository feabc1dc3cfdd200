use anyhow::{bail, Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One evaluated expression as returned by `/calculate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEntry {
    pub expr: String,
    #[serde(deserialize_with = "string_or_number")]
    pub result: String,
    #[serde(default)]
    pub assign: bool,
}

/// Presentation form of a response entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedResult {
    pub expression: String,
    pub answer: String,
    pub assign: bool,
}

impl From<&ResponseEntry> for GeneratedResult {
    fn from(entry: &ResponseEntry) -> Self {
        Self {
            expression: entry.expr.clone(),
            answer: entry.result.clone(),
            assign: entry.assign,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EntryList {
    Many(Vec<ResponseEntry>),
    One(ResponseEntry),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ResponseBody {
    Entries(Vec<ResponseEntry>),
    Envelope { data: EntryList },
    Single(ResponseEntry),
}

/// Accepts a bare list, a single entry, or an object wrapping either under
/// `data`. An empty list is rejected.
pub fn parse_response(body: &[u8]) -> Result<Vec<ResponseEntry>> {
    let parsed: ResponseBody =
        serde_json::from_slice(body).context("response is not a recognised calculate payload")?;
    let entries = match parsed {
        ResponseBody::Entries(entries) => entries,
        ResponseBody::Envelope { data } => match data {
            EntryList::Many(entries) => entries,
            EntryList::One(entry) => vec![entry],
        },
        ResponseBody::Single(entry) => vec![entry],
    };
    if entries.is_empty() {
        bail!("response contained no entries");
    }
    Ok(entries)
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number result, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_entry_object() {
        let entries = parse_response(br#"{"expr":"2+2","result":"4","assign":false}"#).unwrap();
        assert_eq!(
            entries,
            vec![ResponseEntry {
                expr: "2+2".into(),
                result: "4".into(),
                assign: false,
            }]
        );
    }

    #[test]
    fn parses_bare_list_and_defaults_assign() {
        let body = br#"[{"expr":"x","result":"5","assign":true},{"expr":"1+1","result":2}]"#;
        let entries = parse_response(body).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].assign);
        assert_eq!(entries[1].result, "2");
        assert!(!entries[1].assign);
    }

    #[test]
    fn parses_data_envelope() {
        let body = br#"{"message":"Image processed","status":"success",
            "data":[{"expr":"3*3","result":"9","assign":false}]}"#;
        let entries = parse_response(body).unwrap();
        assert_eq!(entries[0].expr, "3*3");

        let single = br#"{"status":"success","data":{"expr":"y","result":"7","assign":true}}"#;
        assert_eq!(parse_response(single).unwrap()[0].expr, "y");
    }

    #[test]
    fn rejects_missing_fields_and_empty_lists() {
        assert!(parse_response(br#"{"expr":"2+2"}"#).is_err());
        assert!(parse_response(br#"{"result":"4"}"#).is_err());
        assert!(parse_response(b"[]").is_err());
        assert!(parse_response(br#"{"data":[]}"#).is_err());
        assert!(parse_response(b"not json").is_err());
    }

    #[test]
    fn generated_result_carries_expression_and_answer() {
        let entry = ResponseEntry {
            expr: "2+2".into(),
            result: "4".into(),
            assign: false,
        };
        let result = GeneratedResult::from(&entry);
        assert_eq!(result.expression, "2+2");
        assert_eq!(result.answer, "4");
    }
}
