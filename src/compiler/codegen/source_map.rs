//! Source map linking generated HTML positions to HTMLx source positions.

use serde::{Deserialize, Serialize};

use crate::compiler::ast::Position;

pub const SOURCE_MAP_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMap {
    pub version: u32,
    /// The generated file.
    pub file: String,
    /// The HTMLx source file.
    pub source: String,
    /// One entry per emitted element or text node, in generated order.
    pub mappings: Vec<Mapping>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    pub generated: Position,
    pub original: Position,
    pub kind: MappingKind,
    /// The tag name for element mappings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingKind {
    Element,
    Text,
}

impl SourceMap {
    pub fn new(file: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            version: SOURCE_MAP_VERSION,
            file: file.into(),
            source: source.into(),
            mappings: Vec::new(),
        }
    }

    /// The original position of the first node emitted on a generated line.
    pub fn original_for_line(&self, line: usize) -> Option<Position> {
        self.mappings
            .iter()
            .find(|mapping| mapping.generated.line == line)
            .map(|mapping| mapping.original)
    }

    /// The original position of the closest node starting at or before
    /// `generated` on the same line.
    pub fn original_for(&self, generated: Position) -> Option<Position> {
        self.mappings
            .iter()
            .rev()
            .find(|mapping| {
                mapping.generated.line == generated.line
                    && mapping.generated.column <= generated.column
            })
            .map(|mapping| mapping.original)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SourceMap {
        let mut map = SourceMap::new("index.html", "index.htmlx");
        map.mappings.push(Mapping {
            generated: Position::new(10, 3),
            original: Position::new(1, 1),
            kind: MappingKind::Element,
            name: Some("div".into()),
        });
        map.mappings.push(Mapping {
            generated: Position::new(10, 8),
            original: Position::new(1, 7),
            kind: MappingKind::Text,
            name: None,
        });
        map
    }

    #[test]
    fn test_lookup() {
        let map = sample();
        assert_eq!(map.original_for_line(10), Some(Position::new(1, 1)));
        assert_eq!(map.original_for_line(11), None);
        assert_eq!(map.original_for(Position::new(10, 9)), Some(Position::new(1, 7)));
        assert_eq!(map.original_for(Position::new(10, 4)), Some(Position::new(1, 1)));
        assert_eq!(map.original_for(Position::new(10, 1)), None);
    }

    #[test]
    fn test_json_shape() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["source"], "index.htmlx");
        assert_eq!(value["mappings"][0]["kind"], "element");
        assert_eq!(value["mappings"][0]["name"], "div");
        assert_eq!(value["mappings"][1]["generated"]["column"], 8);
        assert!(value["mappings"][1].get("name").is_none());

        assert_eq!(SourceMap::from_json(&json).unwrap(), sample());
    }
}
