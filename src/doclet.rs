//! Doclet input model — the records `jsdoc -X` emits, one per documented symbol.
//!
//! Every field is optional: a doclet that lacks something simply reads as
//! "absent" downstream, it never fails deserialization.

use anyhow::Context;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// A single raw documentation record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Doclet {
    pub kind: DocletKind,
    pub longname: Option<String>,
    pub name: Option<String>,
    pub memberof: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub scope: Option<Scope>,
    #[serde(deserialize_with = "lenient")]
    pub access: Option<Access>,
    pub meta: Option<Meta>,
    pub tags: Vec<Tag>,
    pub undocumented: bool,
    pub ignore: bool,

    pub description: Option<String>,
    pub classdesc: Option<String>,
    pub params: Vec<Param>,
    pub returns: Vec<Param>,
    pub properties: Vec<Param>,
    #[serde(rename = "type")]
    pub type_: Option<TypeSpec>,
    pub examples: Vec<String>,
    pub see: Vec<String>,
    pub since: Option<String>,
    pub deprecated: Option<Deprecation>,
    pub fires: Vec<String>,
    pub augments: Vec<String>,
    pub implements: Vec<String>,
    pub optional: bool,
    pub nullable: Option<bool>,
    pub defaultvalue: Option<serde_json::Value>,
    pub readonly: bool,
    pub variable: bool,
    #[serde(rename = "async")]
    pub is_async: bool,
    pub generator: bool,

    /// Package doclets only.
    pub version: Option<String>,
    pub licenses: Vec<License>,
}

/// Doclet category. Anything jsdoc emits that is not listed here lands in
/// `Unrecognized` with the kind string as given.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum DocletKind {
    Package,
    Module,
    Class,
    Function,
    Member,
    Constant,
    Event,
    Namespace,
    Typedef,
    Interface,
    Unrecognized(String),
}

impl Default for DocletKind {
    fn default() -> Self {
        DocletKind::Unrecognized(String::new())
    }
}

impl From<String> for DocletKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "package" => DocletKind::Package,
            "module" => DocletKind::Module,
            "class" => DocletKind::Class,
            "function" => DocletKind::Function,
            "member" => DocletKind::Member,
            "constant" => DocletKind::Constant,
            "event" => DocletKind::Event,
            "namespace" => DocletKind::Namespace,
            "typedef" => DocletKind::Typedef,
            "interface" => DocletKind::Interface,
            _ => DocletKind::Unrecognized(kind),
        }
    }
}

impl fmt::Display for DocletKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DocletKind::Package => "package",
            DocletKind::Module => "module",
            DocletKind::Class => "class",
            DocletKind::Function => "function",
            DocletKind::Member => "member",
            DocletKind::Constant => "constant",
            DocletKind::Event => "event",
            DocletKind::Namespace => "namespace",
            DocletKind::Typedef => "typedef",
            DocletKind::Interface => "interface",
            DocletKind::Unrecognized(other) => other,
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Static,
    Inner,
    Instance,
    Global,
}

impl FromStr for Scope {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "static" => Ok(Scope::Static),
            "inner" => Ok(Scope::Inner),
            "instance" => Ok(Scope::Instance),
            "global" => Ok(Scope::Global),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Private,
    Protected,
    Package,
}

impl FromStr for Access {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Access::Public),
            "private" => Ok(Access::Private),
            "protected" => Ok(Access::Protected),
            "package" => Ok(Access::Package),
            _ => Err(()),
        }
    }
}

/// Source location of a doclet.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Meta {
    pub code: Code,
    pub path: Option<String>,
    pub filename: Option<String>,
    pub lineno: Option<u64>,
}

/// Code binding the comment was attached to, e.g. `module.exports`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Code {
    pub name: Option<String>,
}

/// Custom annotation, e.g. `@definition` or `@experimental`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tag {
    pub original_title: String,
    pub title: String,
    pub value: Option<serde_json::Value>,
    pub text: Option<String>,
}

/// `@param`, `@returns` and `@property` entries share this shape.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Param {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<TypeSpec>,
    pub optional: bool,
    pub nullable: Option<bool>,
    pub variable: bool,
    pub defaultvalue: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TypeSpec {
    pub names: Vec<String>,
}

/// `@deprecated` is a bare flag or carries a note.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Deprecation {
    Flag(bool),
    Note(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct License {
    #[serde(rename = "type")]
    pub type_: Option<String>,
}

impl Doclet {
    /// Name of the code binding this doclet documents (`meta.code.name`).
    pub fn binding_name(&self) -> Option<&str> {
        self.meta.as_ref().and_then(|m| m.code.name.as_deref())
    }

    /// `path/filename` of the source file, for diagnostics.
    pub fn source_location(&self) -> String {
        let meta = match &self.meta {
            Some(meta) => meta,
            None => return String::from("<unknown>"),
        };
        match (&meta.path, &meta.filename) {
            (Some(path), Some(file)) => format!("{}/{}", path, file),
            (None, Some(file)) => file.clone(),
            (Some(path), None) => path.clone(),
            (None, None) => String::from("<unknown>"),
        }
    }

    /// True when a custom `@definition` tag marks this doclet as a standalone definition.
    pub fn is_definition(&self) -> bool {
        self.tags.iter().any(|tag| tag.original_title == "definition")
    }

    pub fn has_tag(&self, title: &str) -> bool {
        self.tags.iter().any(|tag| tag.original_title == title)
    }
}

/// Keep only documented, non-ignored doclets, in discovery order.
/// Parse a JSON array of doclets. A record whose fields have the wrong
/// shape is reported and skipped; only input that is not a JSON array fails.
pub fn parse_doclets(text: &str, origin: &str) -> anyhow::Result<Vec<Doclet>> {
    let records: Vec<serde_json::Value> = serde_json::from_str(text)
        .with_context(|| format!("invalid doclet JSON in {}", origin))?;

    let mut doclets = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let longname = record
            .get("longname")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        match serde_json::from_value(record) {
            Ok(doclet) => doclets.push(doclet),
            Err(err) => {
                warn!(origin = %origin, index, longname = %longname, error = %err, "malformed doclet");
            }
        }
    }
    Ok(doclets)
}

pub fn filter_doclets(doclets: Vec<Doclet>) -> Vec<Doclet> {
    doclets
        .into_iter()
        .filter(|doc| !doc.undocumented && !doc.ignore)
        .collect()
}

/// Deserialize a string-valued enum, reading unknown spellings (and `null`) as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Doclet {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn kind_known_and_unknown() {
        assert_eq!(parse(r#"{"kind":"class"}"#).kind, DocletKind::Class);
        assert_eq!(
            parse(r#"{"kind":"banana"}"#).kind,
            DocletKind::Unrecognized("banana".to_string())
        );
        assert_eq!(parse("{}").kind, DocletKind::default());
    }

    #[test]
    fn unknown_scope_reads_as_absent() {
        assert_eq!(parse(r#"{"scope":"static"}"#).scope, Some(Scope::Static));
        assert_eq!(parse(r#"{"scope":"weird"}"#).scope, None);
        assert_eq!(parse(r#"{"access":null}"#).access, None);
    }

    #[test]
    fn binding_and_location() {
        let doc = parse(
            r#"{"meta":{"code":{"name":"module.exports"},"path":"/src","filename":"a.js"}}"#,
        );
        assert_eq!(doc.binding_name(), Some("module.exports"));
        assert_eq!(doc.source_location(), "/src/a.js");
        assert_eq!(parse("{}").source_location(), "<unknown>");
    }

    #[test]
    fn definition_tag() {
        let doc = parse(r#"{"tags":[{"originalTitle":"definition","title":"definition"}]}"#);
        assert!(doc.is_definition());
        assert!(!parse(r#"{"tags":[{"originalTitle":"other"}]}"#).is_definition());
    }

    #[test]
    fn deprecated_flag_or_note() {
        assert!(matches!(
            parse(r#"{"deprecated":true}"#).deprecated,
            Some(Deprecation::Flag(true))
        ));
        assert!(matches!(
            parse(r#"{"deprecated":"use b"}"#).deprecated,
            Some(Deprecation::Note(_))
        ));
    }

    #[test]
    fn malformed_doclet_is_skipped() {
        let doclets = parse_doclets(
            r#"[{"kind":"function","longname":"good","name":"good"},
                {"kind":"function","longname":"bad","name":"bad","description":42},
                {"kind":"member","longname":"nulls","tags":null},
                "not an object",
                {"kind":"class","longname":"alsoGood"}]"#,
            "mixed.json",
        )
        .unwrap();
        let names: Vec<_> = doclets.iter().filter_map(|d| d.longname.as_deref()).collect();
        assert_eq!(names, vec!["good", "alsoGood"]);
    }

    #[test]
    fn non_array_input_fails_with_origin() {
        let err = parse_doclets("{", "x.json").unwrap_err();
        assert!(err.to_string().contains("x.json"));
        assert!(parse_doclets(r#"{"kind":"function"}"#, "y.json").is_err());
    }

    #[test]
    fn filter_drops_undocumented_and_ignored() {
        let docs = vec![
            parse(r#"{"name":"a"}"#),
            parse(r#"{"name":"b","undocumented":true}"#),
            parse(r#"{"name":"c","ignore":true}"#),
            parse(r#"{"name":"d"}"#),
        ];
        let names: Vec<_> = filter_doclets(docs)
            .into_iter()
            .filter_map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["a", "d"]);
    }
}
