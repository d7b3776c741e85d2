//! YAML parser that builds plain `Yaml` trees from parser events.
//!
//! `YamlLoader` would do most of this, but it cannot tell us how many
//! documents a source held or where an unknown alias sits, and it keeps
//! going after the first document. Driving the event stream ourselves keeps
//! those decisions here.

use std::collections::HashMap;

use crate::{Error, Result};
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, TScalarStyle};
use yaml_rust2::Yaml;

/// Parse YAML from a string.
///
/// An empty source parses to `Yaml::Null`. A source holding more than one
/// document is rejected.
///
/// # Example
///
/// ```rust
/// use strata_yaml::parse;
///
/// let yaml = parse("title: My Document").unwrap();
/// assert_eq!(yaml["title"].as_str(), Some("My Document"));
/// ```
pub fn parse(content: &str) -> Result<Yaml> {
    parse_impl(content, None)
}

/// Parse YAML from a string with an associated filename.
///
/// The filename is included in error messages.
pub fn parse_file(content: &str, filename: &str) -> Result<Yaml> {
    parse_impl(content, Some(filename))
}

fn parse_impl(content: &str, filename: Option<&str>) -> Result<Yaml> {
    let mut parser = Parser::new_from_str(content);
    let mut builder = YamlBuilder::new(filename);

    parser
        .load(&mut builder, true)
        .map_err(|e| Error::from_scan(&e, builder.filename.clone()))?;

    builder.result()
}

/// Builder that implements MarkedEventReceiver to construct `Yaml` values.
struct YamlBuilder {
    filename: Option<String>,

    /// Stack of collections being constructed
    stack: Vec<BuildNode>,

    /// Completed document roots
    documents: Vec<Yaml>,

    /// Anchored nodes by anchor id, for alias expansion
    anchors: HashMap<usize, Yaml>,

    /// First alias that pointed at an undefined anchor
    unknown_alias: Option<Marker>,
}

/// A collection being constructed during parsing.
enum BuildNode {
    Sequence {
        anchor_id: usize,
        items: Vec<Yaml>,
    },
    Mapping {
        anchor_id: usize,
        entries: Vec<(Yaml, Option<Yaml>)>,
    },
}

impl YamlBuilder {
    fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(|s| s.to_string()),
            stack: Vec::new(),
            documents: Vec::new(),
            anchors: HashMap::new(),
            unknown_alias: None,
        }
    }

    fn result(mut self) -> Result<Yaml> {
        if let Some(marker) = self.unknown_alias {
            return Err(Error::UnknownAnchor {
                file: self.filename,
                line: marker.line(),
            });
        }
        match self.documents.len() {
            0 => Ok(Yaml::Null),
            1 => Ok(self.documents.remove(0)),
            count => Err(Error::MultipleDocuments {
                file: self.filename,
                count,
            }),
        }
    }

    fn push_complete(&mut self, node: Yaml, anchor_id: usize) {
        if anchor_id > 0 {
            self.anchors.insert(anchor_id, node.clone());
        }

        match self.stack.last_mut() {
            None => self.documents.push(node),
            Some(BuildNode::Sequence { items, .. }) => items.push(node),
            Some(BuildNode::Mapping { entries, .. }) => match entries.last_mut() {
                Some((_, value @ None)) => *value = Some(node),
                _ => entries.push((node, None)),
            },
        }
    }
}

impl MarkedEventReceiver for YamlBuilder {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        match ev {
            Event::Nothing
            | Event::StreamStart
            | Event::StreamEnd
            | Event::DocumentStart
            | Event::DocumentEnd => {}

            Event::Scalar(value, style, anchor_id, _tag) => {
                let yaml = if matches!(style, TScalarStyle::Plain) {
                    parse_plain_scalar(&value)
                } else {
                    Yaml::String(value)
                };
                self.push_complete(yaml, anchor_id);
            }

            Event::SequenceStart(anchor_id, _tag) => {
                self.stack.push(BuildNode::Sequence {
                    anchor_id,
                    items: Vec::new(),
                });
            }

            Event::SequenceEnd => {
                if let Some(BuildNode::Sequence { anchor_id, items }) = self.stack.pop() {
                    self.push_complete(Yaml::Array(items), anchor_id);
                }
            }

            Event::MappingStart(anchor_id, _tag) => {
                self.stack.push(BuildNode::Mapping {
                    anchor_id,
                    entries: Vec::new(),
                });
            }

            Event::MappingEnd => {
                if let Some(BuildNode::Mapping { anchor_id, entries }) = self.stack.pop() {
                    let hash = entries
                        .into_iter()
                        .map(|(k, v)| (k, v.unwrap_or(Yaml::Null)))
                        .collect();
                    self.push_complete(Yaml::Hash(hash), anchor_id);
                }
            }

            Event::Alias(anchor_id) => {
                let node = match self.anchors.get(&anchor_id) {
                    Some(node) => node.clone(),
                    None => {
                        self.unknown_alias.get_or_insert(marker);
                        Yaml::Null
                    }
                };
                self.push_complete(node, 0);
            }
        }
    }
}

/// Type a plain (unquoted) scalar: integers, floats, booleans, null, else string.
///
/// Quoted scalars never reach this function; `"1"` stays a string.
fn parse_plain_scalar(value: &str) -> Yaml {
    if value.is_empty() {
        return Yaml::Null;
    }
    Yaml::from_str(value)
}
