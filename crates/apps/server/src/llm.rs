use serde_json::{json, Map, Value};
use tracing::debug;

/// Hosted inference endpoint configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: Option<String>,
}

#[derive(Debug)]
pub enum LlmError {
    Transport(String),
    /// The model produced no JSON object carrying attribute, operator and
    /// value.
    NoFilter,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmError::Transport(reason) => write!(f, "inference request failed: {reason}"),
            LlmError::NoFilter => write!(f, "no valid filter in model output"),
        }
    }
}

impl std::error::Error for LlmError {}

const FEET_TO_METERS: f64 = 0.3048;

/// Asks the model to translate free text into a structured filter.
///
/// The generated text is scanned for JSON objects; the first one carrying
/// all three filter keys wins. Queries phrased in feet are normalized to
/// meters against the height attribute.
pub async fn parse_query(
    client: &reqwest::Client,
    config: &LlmConfig,
    query: &str,
) -> Result<Value, LlmError> {
    let mut request = client
        .post(&config.api_url)
        .json(&json!({ "inputs": build_prompt(query) }));
    if let Some(key) = &config.api_key {
        request = request.bearer_auth(key);
    }

    let response = request
        .send()
        .await
        .map_err(|e| LlmError::Transport(e.to_string()))?;
    if !response.status().is_success() {
        return Err(LlmError::Transport(response.status().to_string()));
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| LlmError::Transport(e.to_string()))?;
    let generated = body
        .get(0)
        .and_then(|v| v.get("generated_text"))
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    debug!("model output: {generated}");

    extract_filter(generated, query).ok_or(LlmError::NoFilter)
}

fn build_prompt(query: &str) -> String {
    format!(
        "Extract a JSON filter from this request: \"{query}\"\n\n\
         Respond ONLY with the JSON object. The format should include:\n\
         - \"attribute\" (e.g. \"height\", \"zoning\", \"value\", \"area\")\n\
         - \"operator\" (e.g. \">\", \"<\", \"==\")\n\
         - \"value\" (e.g. 100, \"RC-G\", 500000)\n\n\
         If the query mentions \"feet\", assume it refers to building height \
         and convert feet to meters (1 foot = 0.3048 meters). \
         Use \"height\" as the attribute in that case."
    )
}

/// First JSON object in `generated` with all three filter keys, after unit
/// normalization.
fn extract_filter(generated: &str, query: &str) -> Option<Value> {
    for candidate in json_candidates(generated) {
        let Ok(Value::Object(mut obj)) = serde_json::from_str::<Value>(candidate) else {
            continue;
        };
        let complete = obj.contains_key("attribute")
            && obj.contains_key("operator")
            && obj.contains_key("value");
        if !complete {
            continue;
        }
        normalize_feet(&mut obj, query);
        return Some(Value::Object(obj));
    }
    None
}

/// A query phrased in feet with a height attribute gets its value
/// converted to meters, rounded to two decimals.
fn normalize_feet(filter: &mut Map<String, Value>, query: &str) {
    if !query.to_lowercase().contains("feet") {
        return;
    }
    if filter.get("attribute").and_then(|v| v.as_str()) != Some("height") {
        return;
    }
    let Some(value) = filter.get("value").and_then(|v| v.as_f64()) else {
        return;
    };

    let meters = (value * FEET_TO_METERS * 100.0).round() / 100.0;
    if let Some(number) = serde_json::Number::from_f64(meters) {
        filter.insert("value".to_string(), Value::Number(number));
    }
}

/// Balanced `{ ... }` spans in the generated text, in order of appearance.
/// The model wraps its answer in prose more often than not.
fn json_candidates(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = None;
    let mut depth = 0usize;

    for (i, b) in text.bytes().enumerate() {
        match b {
            b'{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start.take() {
                        out.push(&text[s..=i]);
                    }
                }
            }
            _ => {}
        }
    }

    out
}
