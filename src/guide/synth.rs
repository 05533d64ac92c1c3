// src/guide/synth.rs
//! Guide synthesis: prompt the completion endpoint for a JSON travel guide and coerce
//! the answer into a [`GuideDraft`].
//!
//! A malformed answer never fails the request. It becomes [`Synthesis::Fallback`] with a
//! fixed minimal draft, so callers can tell degraded guides apart and still respond 200.
//! Only a transport failure or an empty answer is an error.

use metrics::counter;
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::model::Author;
use crate::providers::DynCompletionClient;

pub const FALLBACK_TAGS: [&str; 2] = ["Travel", "Culture"];

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("AI returned empty text")]
    EmptyResponse,

    #[error("AI request failed: {0:#}")]
    Completion(anyhow::Error),
}

/// Guide as returned by the model, before enrichment. Every field is optional on the
/// wire; missing ones take their defaults (missing `places` is an empty list).
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct GuideDraft {
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_default")]
    pub intro: String,
    #[serde(default, deserialize_with = "null_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub tips: String,
    #[serde(default, deserialize_with = "null_default")]
    pub author: DraftAuthor,
    #[serde(default, deserialize_with = "null_default")]
    pub places: Vec<PlaceDraft>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct DraftAuthor {
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub views: u64,
}

impl From<DraftAuthor> for Author {
    fn from(a: DraftAuthor) -> Self {
        let mut out = Author::default();
        if !a.name.trim().is_empty() {
            out.name = a.name;
        }
        out.date = a.date;
        out.views = a.views;
        out
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PlaceDraft {
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub category: String,
    #[serde(default, alias = "description", deserialize_with = "null_default")]
    pub desc: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lng: Option<f64>,
}

impl PlaceDraft {
    /// Zero, missing or non-finite coordinates all count as "not provided".
    pub fn needs_coordinates(&self) -> bool {
        let usable = |v: Option<f64>| v.is_some_and(|x| x.is_finite() && x != 0.0);
        !(usable(self.lat) && usable(self.lng))
    }
}

// `null` reads as the field's default, same as a missing key
fn null_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

// numbers, numeric strings, or nothing
fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }))
}

fn lenient_count<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let v = Option::<Value>::deserialize(d)?;
    let n = v.and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    });
    Ok(n.filter(|x| x.is_finite() && *x >= 0.0)
        .map(|x| x as u64)
        .unwrap_or(0))
}

#[derive(Debug, Clone, PartialEq)]
pub enum Synthesis {
    Parsed(GuideDraft),
    Fallback { draft: GuideDraft, reason: String },
}

impl Synthesis {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Synthesis::Fallback { .. })
    }

    pub fn draft(&self) -> &GuideDraft {
        match self {
            Synthesis::Parsed(d) => d,
            Synthesis::Fallback { draft, .. } => draft,
        }
    }

    pub fn into_draft(self) -> GuideDraft {
        match self {
            Synthesis::Parsed(d) => d,
            Synthesis::Fallback { draft, .. } => draft,
        }
    }
}

pub fn build_prompt(city: &str) -> String {
    format!(
        r#"
You are a JSON-only travel data generator.
Output strictly valid JSON (no markdown, no text).

Generate a travel guide for "{city}" in this format:
{{
  "title": "string",
  "intro": "short intro about the city",
  "tags": ["string"],
  "tips": "1-paragraph travel advice",
  "author": {{"name": "Traveler", "date": "Month YYYY", "views": number}},
  "places": [
    {{"name": "real tourist attraction name", "category": "type", "desc": "short description", "lat": number, "lng": number}}
  ]
}}
Include 5-6 real, famous attractions.
Use real coordinates near {city}.
"#
    )
}

/// Remove markdown code fences (```` ```json ```` and ```` ``` ````) and trim.
pub fn strip_code_fences(text: &str) -> String {
    static RE_FENCE: OnceCell<Regex> = OnceCell::new();
    let re = RE_FENCE.get_or_init(|| Regex::new(r"(?i)```(?:json)?").expect("fence regex"));
    re.replace_all(text, "").trim().to_string()
}

pub fn parse_guide(text: &str) -> Result<GuideDraft, serde_json::Error> {
    serde_json::from_str(text)
}

/// Deterministic minimal guide used when the model's answer is not valid JSON.
pub fn fallback_guide(city: &str) -> GuideDraft {
    GuideDraft {
        title: format!("{city} Travel Guide"),
        intro: format!("Explore {city}"),
        tags: FALLBACK_TAGS.iter().map(|t| t.to_string()).collect(),
        tips: "Discover the charm of local culture and landmarks.".to_string(),
        author: DraftAuthor {
            name: "Traveler".to_string(),
            date: "Nov 2025".to_string(),
            views: 25,
        },
        places: vec![PlaceDraft {
            name: city.to_string(),
            category: "City".to_string(),
            desc: "Explore beauty".to_string(),
            lat: Some(22.35),
            lng: Some(78.66),
        }],
    }
}

pub struct GuideSynthesizer {
    client: DynCompletionClient,
}

impl GuideSynthesizer {
    pub fn new(client: DynCompletionClient) -> Self {
        Self { client }
    }

    pub async fn synthesize(&self, city: &str) -> Result<Synthesis, SynthesisError> {
        let prompt = build_prompt(city);
        let text = match self.client.complete(&prompt).await {
            Ok(t) => t,
            Err(e) => {
                counter!("guide_synthesis_total", "outcome" => "error").increment(1);
                warn!(error = ?e, provider = self.client.provider_name(), %city, "completion failed");
                return Err(SynthesisError::Completion(e));
            }
        };

        if text.trim().is_empty() {
            counter!("guide_synthesis_total", "outcome" => "empty").increment(1);
            return Err(SynthesisError::EmptyResponse);
        }

        let clean = strip_code_fences(&text);
        match parse_guide(&clean) {
            Ok(draft) => {
                counter!("guide_synthesis_total", "outcome" => "parsed").increment(1);
                info!(%city, places = draft.places.len(), "guide parsed");
                Ok(Synthesis::Parsed(draft))
            }
            Err(e) => {
                counter!("guide_synthesis_total", "outcome" => "fallback").increment(1);
                warn!(error = %e, %city, "guide JSON parse failed; using fallback guide");
                Ok(Synthesis::Fallback {
                    draft: fallback_guide(city),
                    reason: e.to_string(),
                })
            }
        }
    }
}
