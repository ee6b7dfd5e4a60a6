//! Pulls `(name, kcal)` pairs out of the nutrition API body.
//!
//! The service has shipped several envelopes over time (`records`, `data`,
//! `response.body.items.item`, and spreadsheet-style Korean column names), so
//! the extraction is shape-tolerant rather than schema-bound.

use std::collections::HashSet;

use serde_json::Value;

use super::client::FoodError;

const NAME_KEYS: [&str; 5] = ["foodNm", "foodName", "desc_kor", "DESC_KOR", "식품명"];
const KCAL_KEYS: [&str; 6] = [
    "enerc",
    "kcal",
    "NUTR_CONT1",
    "에너지(kcal)",
    "에너지(KCAL)",
    "에너지kcal",
];

#[derive(Debug, Clone, PartialEq)]
pub struct FoodCandidate {
    pub name: String,
    pub kcal: Option<f64>,
}

pub fn parse_foods(body: &str) -> Result<Vec<FoodCandidate>, FoodError> {
    let root: Value = serde_json::from_str(body)?;

    let header = &root["response"]["header"];
    if let Some(code) = header["resultCode"].as_str().map(str::trim) {
        if !code.is_empty() && code != "00" {
            return Err(FoodError::ResultCode {
                code: code.to_string(),
                message: header["resultMsg"].as_str().unwrap_or("").to_string(),
            });
        }
    }

    let nodes: Vec<&Value> = if let Some(items) = non_empty_array(&root["records"]) {
        items.iter().collect()
    } else if let Some(items) = non_empty_array(&root["data"]) {
        items.iter().collect()
    } else {
        match &root["response"]["body"]["items"]["item"] {
            Value::Array(items) => items.iter().collect(),
            item @ Value::Object(_) => vec![item],
            _ => {
                let mut found = Vec::new();
                collect_food_objects(&root, &mut found);
                found
            }
        }
    };

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for node in nodes {
        if let Some(candidate) = candidate_from(node) {
            if seen.insert(candidate.name.clone()) {
                out.push(candidate);
            }
        }
    }
    Ok(out)
}

fn non_empty_array(v: &Value) -> Option<&Vec<Value>> {
    v.as_array().filter(|a| !a.is_empty())
}

fn has_any_key(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter().any(|k| obj.contains_key(*k))
}

/// Depth-first, document order.
fn collect_food_objects<'a>(v: &'a Value, out: &mut Vec<&'a Value>) {
    match v {
        Value::Object(obj) => {
            if has_any_key(obj, &NAME_KEYS) || has_any_key(obj, &KCAL_KEYS) {
                out.push(v);
            }
            for child in obj.values() {
                collect_food_objects(child, out);
            }
        }
        Value::Array(items) => {
            for child in items {
                collect_food_objects(child, out);
            }
        }
        _ => {}
    }
}

fn candidate_from(node: &Value) -> Option<FoodCandidate> {
    let name = NAME_KEYS.iter().find_map(|k| text_of(&node[*k]))?;
    let kcal = KCAL_KEYS.iter().find_map(|k| number_of(&node[*k]));
    Some(FoodCandidate { name, kcal })
}

fn text_of(v: &Value) -> Option<String> {
    let s = match v {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

fn number_of(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => lenient_number(s),
        _ => None,
    }
}

/// `"1,234.5 kcal"` -> 1234.5. Keeps the first run of sign, digits and at
/// most one dot.
pub(crate) fn lenient_number(raw: &str) -> Option<f64> {
    let cleaned = raw.replace(',', "");
    let start = cleaned.find(|c: char| c.is_ascii_digit() || c == '-' || c == '.')?;
    let tail = &cleaned[start..];
    let mut seen_dot = tail.starts_with('.');
    let end = tail
        .char_indices()
        .skip(1)
        .find(|&(_, c)| match c {
            '.' if !seen_dot => {
                seen_dot = true;
                false
            }
            c => !c.is_ascii_digit(),
        })
        .map(|(i, _)| i)
        .unwrap_or(tail.len());
    tail[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}
