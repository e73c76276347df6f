use serde::{Deserialize, Serialize};

/// One accepted media range with its weight (`q` value).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MediaRange {
    pub value: String,
    pub weight: f32,
}

impl MediaRange {
    pub fn new(value: impl Into<String>, weight: f32) -> Self {
        Self {
            value: media_type_essence(&value.into()),
            weight,
        }
    }

    /// How specifically this range matches `content_type`: 3 for an exact
    /// match, 2 for `type/*`, 1 for `*/*`, `None` for no match.
    fn specificity(&self, content_type: &str) -> Option<u8> {
        if self.value == content_type {
            return Some(3);
        }
        if self.value == "*/*" {
            return Some(1);
        }
        let (range_main, range_sub) = self.value.split_once('/')?;
        let (main, _) = content_type.split_once('/')?;
        (range_sub == "*" && range_main == main).then_some(2)
    }
}

/// The content types a reader is willing to receive.
///
/// Empty preferences accept anything in the stored format.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RepresentationPreferences {
    pub accept: Vec<MediaRange>,
}

impl RepresentationPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preferences accepting exactly one content type.
    pub fn accepting(content_type: &str) -> Self {
        Self::new().with(content_type, 1.0)
    }

    pub fn with(mut self, value: &str, weight: f32) -> Self {
        self.accept.push(MediaRange::new(value, weight));
        self
    }

    /// Parse an `Accept`-style header value, e.g. `text/turtle;q=0.9, */*;q=0.1`.
    pub fn parse_accept(header: &str) -> Self {
        let accept = header
            .split(',')
            .filter_map(|part| {
                let mut pieces = part.split(';');
                let value = pieces.next()?.trim();
                if value.is_empty() {
                    return None;
                }
                let weight = pieces
                    .filter_map(|p| p.trim().strip_prefix("q="))
                    .find_map(|q| q.trim().parse::<f32>().ok())
                    .unwrap_or(1.0);
                Some(MediaRange::new(value, weight))
            })
            .collect();
        Self { accept }
    }

    pub fn is_empty(&self) -> bool {
        self.accept.is_empty()
    }

    /// Weight of `content_type` under the most specific matching range, 0 if none matches.
    pub fn weight_of(&self, content_type: &str) -> f32 {
        let essence = media_type_essence(content_type);
        self.accept
            .iter()
            .filter_map(|range| range.specificity(&essence).map(|s| (s, range.weight)))
            .max_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)))
            .map(|(_, weight)| weight)
            .unwrap_or(0.0)
    }

    /// Returns `true` if `content_type` has a positive weight.
    pub fn accepts(&self, content_type: &str) -> bool {
        self.weight_of(content_type) > 0.0
    }

    /// Concrete (non-wildcard) ranges with positive weight, heaviest first.
    pub fn preferred(&self) -> Vec<&str> {
        let mut ranges: Vec<&MediaRange> = self
            .accept
            .iter()
            .filter(|r| r.weight > 0.0 && !r.value.contains('*'))
            .collect();
        ranges.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        ranges.into_iter().map(|r| r.value.as_str()).collect()
    }
}

/// The media type without parameters, lowercased: `Text/Turtle; charset=utf-8` becomes `text/turtle`.
pub fn media_type_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase()
}
