//! Well-known settings keys and the generation-name cycle.
//!
//! Generation names are display metadata: an ordered list of labels that
//! repeats across generations. Nothing validates `Member::generation_name`
//! against it.

use crate::Result;

/// Settings key holding the JSON-encoded generation-name cycle.
pub const GENERATION_NAMES_KEY: &str = "generation_names";

/// Seeded into a fresh store when no cycle is configured.
pub const DEFAULT_GENERATION_NAMES: [&str; 11] =
  ["始", "定", "英", "华", "富", "贵", "荣", "昌", "盛", "德", "永"];

pub fn default_generation_names() -> Vec<String> {
  DEFAULT_GENERATION_NAMES.iter().map(|&s| s.to_owned()).collect()
}

pub fn encode_generation_names(names: &[String]) -> Result<String> {
  Ok(serde_json::to_string(names)?)
}

pub fn decode_generation_names(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}
