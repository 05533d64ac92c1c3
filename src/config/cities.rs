// src/config/cities.rs
//! Allow-list of cities served by the popular-city details endpoint.
//!
//! Files may hold either a `cities` table (`cities = ["Goa"]`, `{"cities": ["Goa"]}`) or a
//! bare list (`["Goa"]`). TOML and JSON are told apart by extension, or by the first
//! non-blank character when the extension says nothing.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

pub const ENV_PATH: &str = "POPULAR_CITIES_PATH";

pub const DEFAULT_POPULAR_CITIES: [&str; 5] = ["Kolkata", "Rishikesh", "Manali", "Goa", "Jaipur"];

const CANDIDATES: [&str; 2] = ["config/popular_cities.toml", "config/popular_cities.json"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Json,
}

impl Format {
    fn detect(path: &Path, content: &str) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(e) if e.eq_ignore_ascii_case("json") => Format::Json,
            Some(e) if e.eq_ignore_ascii_case("toml") => Format::Toml,
            _ if content.trim_start().starts_with(['[', '{']) => Format::Json,
            _ => Format::Toml,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CityList {
    Table { cities: Vec<String> },
    Bare(Vec<String>),
}

impl CityList {
    fn into_vec(self) -> Vec<String> {
        match self {
            CityList::Table { cities } | CityList::Bare(cities) => cities,
        }
    }
}

pub fn load_popular_cities_from(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading popular cities from {}", path.display()))?;
    let format = Format::detect(path, &content);
    let cities = parse_cities(&content, format)
        .with_context(|| format!("parsing popular cities in {}", path.display()))?;
    if cities.is_empty() {
        bail!("{} lists no popular cities", path.display());
    }
    Ok(cities)
}

/// `$POPULAR_CITIES_PATH` (must exist when set), then the files under `config/`,
/// then [`DEFAULT_POPULAR_CITIES`].
pub fn load_popular_cities_default() -> Result<Vec<String>> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let path = PathBuf::from(p);
        if !path.is_file() {
            bail!("{ENV_PATH} points to missing file {}", path.display());
        }
        return load_popular_cities_from(&path);
    }
    match CANDIDATES.iter().map(Path::new).find(|p| p.is_file()) {
        Some(path) => load_popular_cities_from(path),
        None => Ok(default_cities()),
    }
}

pub fn default_cities() -> Vec<String> {
    DEFAULT_POPULAR_CITIES.iter().map(|c| c.to_string()).collect()
}

fn parse_cities(s: &str, format: Format) -> Result<Vec<String>> {
    let list: CityList = match format {
        Format::Json => serde_json::from_str(s)?,
        // a bare TOML document is always a table, so only the `cities` form applies
        Format::Toml => toml::from_str(s)?,
    };
    Ok(clean_list(list.into_vec()))
}

// trims, drops blanks and case-insensitive duplicates, keeps first spelling and order
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if t.is_empty() || out.iter().any(|c| c.eq_ignore_ascii_case(t)) {
            continue;
        }
        out.push(t.to_string());
    }
    out
}
