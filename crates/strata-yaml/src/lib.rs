//! # strata-yaml
//!
//! YAML document reading for configuration sources.
//!
//! Produces plain `yaml_rust2::Yaml` trees with two guarantees the loaders
//! rely on: quoted scalars are never retyped (`"1"` stays a string), and a
//! source holds at most one document.
//!
//! ## Example
//!
//! ```rust
//! use strata_yaml::parse_file;
//!
//! let yaml = parse_file("section1:\n  value1: 1\n", "app.yml").unwrap();
//! assert_eq!(yaml["section1"]["value1"].as_i64(), Some(1));
//! ```

mod error;
mod parser;

pub use error::{Error, Result};
pub use parser::{parse, parse_file};
pub use yaml_rust2::Yaml;
