// Request body redaction
// Removes configured top-level keys from JSON object bodies before transmission

/// Redacts top-level fields from request bodies.
#[derive(Debug, Clone, Default)]
pub struct BodyFilter {
    keys: Vec<String>,
}

impl BodyFilter {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Produce the body string sent to the remote service.
    ///
    /// A JSON object loses every filtered top-level key and is re-serialized
    /// pretty-printed with sorted keys. Anything else falls back to the raw
    /// UTF-8 text (empty for an empty body), or `None` when the bytes are
    /// not valid UTF-8.
    pub fn apply(&self, raw: &[u8]) -> Option<String> {
        match serde_json::from_slice::<serde_json::Value>(raw) {
            Ok(serde_json::Value::Object(mut object)) => {
                object.retain(|key, _| !self.keys.iter().any(|filtered| filtered == key));
                match serde_json::to_string_pretty(&object) {
                    Ok(json) => Some(json),
                    Err(e) => {
                        tracing::debug!(error = %e, "Filtered body could not be re-serialized");
                        None
                    }
                }
            }
            _ => std::str::from_utf8(raw).ok().map(str::to_string),
        }
    }
}
