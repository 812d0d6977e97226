/// Upstream data ingestion.
///
/// - `gios`     — GIOS pjp-api: URL construction, JSON parsing, blocking client
/// - `fixtures` (test only) — representative API response payloads

pub mod gios;

#[cfg(test)]
pub(crate) mod fixtures;
