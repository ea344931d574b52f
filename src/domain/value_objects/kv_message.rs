//! Ordered key-value messages
//!
//! Commands arrive, results leave, and notifications are delivered as an
//! ordered sequence of string key/value pairs. The wire form is
//! percent-escaped `key=value` pairs joined by `&`, so separators and
//! newlines appearing inside values survive a round trip. The flat-file
//! store reuses the same escaping for its records.

/// An ordered sequence of string key/value pairs.
///
/// Order is preserved on encode; lookups return the first match. Duplicate
/// keys are representable, which the notify command relies on when it
/// collects afterburn fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValueMessage {
    pairs: Vec<(String, String)>,
}

impl KeyValueMessage {
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Decode from the wire form. Pairs without a `=` decode as a key with
    /// an empty value, matching the form encoding's own convention.
    pub fn decode(encoded: &str) -> Self {
        let pairs = form_urlencoded::parse(encoded.as_bytes())
            .into_owned()
            .collect();
        Self { pairs }
    }

    /// Encode to the wire form.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.pairs {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// First value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KeyValueMessage {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
