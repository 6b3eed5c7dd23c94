//! Key based lookup of user facing strings.
//!
//! A [`Catalog`] is an ordered list of [`Layer`]s, tried front to back. The usual
//! stack is theme, then language, then the built-in default strings. Every layer
//! is a flat map from dotted keys (`"match.prompt.kda"`) to templates containing
//! `{placeholder}` tokens.

use std::collections::HashMap;
use std::path::Path;

static DEFAULT_MESSAGES: &str = include_str!("../messages/default.json");

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing layer {layer}: {source}")]
    Parse {
        layer: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("layer {layer} is not a JSON object")]
    NotAnObject { layer: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    name: String,
    entries: HashMap<String, String>,
}

impl Layer {
    pub fn new<N>(name: N, entries: HashMap<String, String>) -> Self
    where
        N: Into<String>,
    {
        Self {
            name: name.into(),
            entries,
        }
    }

    /// Parses a JSON document, flattening nested objects into dotted keys.
    pub fn from_json<N>(name: N, content: &str) -> Result<Self, CatalogError>
    where
        N: Into<String>,
    {
        let name = name.into();
        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|source| CatalogError::Parse {
                layer: name.clone(),
                source,
            })?;

        let object = match value {
            serde_json::Value::Object(o) => o,
            _ => return Err(CatalogError::NotAnObject { layer: name }),
        };

        let mut entries = HashMap::new();
        for (key, value) in object {
            flatten_into(&mut entries, key, value);
        }

        Ok(Self { name, entries })
    }

    /// Loads a layer from disk. A missing file is not an error and yields `None`.
    pub fn from_file(name: &str, path: &Path) -> Result<Option<Self>, CatalogError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(?path, "Message layer {:?} not found, skipping", name);
                return Ok(None);
            }
            Err(source) => {
                return Err(CatalogError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        Self::from_json(name, &content).map(Some)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|s| s.as_str())
    }
}

fn flatten_into(entries: &mut HashMap<String, String>, prefix: String, value: serde_json::Value) {
    match value {
        serde_json::Value::Object(object) => {
            for (key, inner) in object {
                flatten_into(entries, format!("{}.{}", prefix, key), inner);
            }
        }
        serde_json::Value::String(s) => {
            entries.insert(prefix, s);
        }
        serde_json::Value::Array(lines) => {
            let joined = lines
                .into_iter()
                .map(|line| match line {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("\n");
            entries.insert(prefix, joined);
        }
        serde_json::Value::Null => {}
        other => {
            entries.insert(prefix, other.to_string());
        }
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    layers: Vec<Layer>,
}

impl Catalog {
    pub fn new(layers: Vec<Layer>) -> Self {
        Self { layers }
    }

    /// The built-in default strings only.
    pub fn builtin() -> Self {
        Self::new(vec![default_layer()])
    }

    /// Builds the theme → language → default stack.
    ///
    /// Language and theme files are looked up as `<dir>/lang/<language>.json` and
    /// `<dir>/themes/<theme>.json`; absent files are skipped.
    pub fn load(
        dir: Option<&Path>,
        language: Option<&str>,
        theme: Option<&str>,
    ) -> Result<Self, CatalogError> {
        let mut layers = Vec::with_capacity(3);

        if let Some(dir) = dir {
            if let Some(theme) = theme {
                let path = dir.join("themes").join(format!("{}.json", theme));
                layers.extend(Layer::from_file(&format!("theme:{}", theme), &path)?);
            }
            if let Some(language) = language {
                let path = dir.join("lang").join(format!("{}.json", language));
                layers.extend(Layer::from_file(&format!("lang:{}", language), &path)?);
            }
        }

        layers.push(default_layer());

        tracing::debug!(
            layers = ?layers.iter().map(|l| l.name()).collect::<Vec<_>>(),
            "Loaded message catalog"
        );

        Ok(Self::new(layers))
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.layers.iter().find_map(|layer| layer.get(key))
    }

    /// Renders `key`, substituting `{placeholder}` tokens.
    ///
    /// Never fails: an unknown key is logged and returned verbatim so it shows up
    /// in the chat instead of an empty message.
    pub fn format(&self, key: &str, replacements: &[(&str, &str)]) -> String {
        match self.lookup(key) {
            Some(template) => substitute(template, replacements),
            None => {
                tracing::warn!("Missing message for key {:?}", key);
                key.to_owned()
            }
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn default_layer() -> Layer {
    // The default layer is compiled in and covered by tests
    match Layer::from_json("default", DEFAULT_MESSAGES) {
        Ok(layer) => layer,
        Err(e) => {
            tracing::error!("Built-in messages are invalid: {}", e);
            Layer::new("default", HashMap::new())
        }
    }
}

fn substitute(template: &str, replacements: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        output.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let token = after.find('}').map(|end| &after[..end]).filter(|t| {
            !t.is_empty() && t.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        });

        match token {
            Some(name) => {
                match replacements.iter().find(|(k, _)| *k == name) {
                    Some((_, value)) => output.push_str(value),
                    None => {
                        output.push('{');
                        output.push_str(name);
                        output.push('}');
                    }
                }
                rest = &after[name.len() + 1..];
            }
            None => {
                output.push('{');
                rest = after;
            }
        }
    }
    output.push_str(rest);

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn layer(name: &str, entries: &[(&str, &str)]) -> Layer {
        Layer::new(
            name,
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn builtin_layer_parses() {
        let catalog = Catalog::builtin();
        assert_eq!(1, catalog.layers().len());
        assert!(catalog.lookup("match.prompt.kda").is_some());
        assert!(catalog.lookup("error.generic").is_some());
    }

    #[test]
    fn substitutes_placeholders() {
        assert_eq!(
            "Enter stats for Faker (MIDDLE)",
            substitute(
                "Enter stats for {player} ({lane})",
                &[("player", "Faker"), ("lane", "MIDDLE")]
            )
        );
    }

    #[test]
    fn keeps_unknown_placeholders_and_braces() {
        assert_eq!("{missing} and {", substitute("{missing} and {", &[]));
        assert_eq!("{ not a token }", substitute("{ not a token }", &[]));
        assert_eq!("{}", substitute("{}", &[]));
    }

    #[test]
    fn layers_are_tried_in_order() {
        let catalog = Catalog::new(vec![
            layer("theme", &[("greeting", "Ahoy {name}")]),
            layer("lang", &[("greeting", "Hallo {name}"), ("bye", "Tschüss")]),
            layer("default", &[("greeting", "Hello"), ("bye", "Bye"), ("only", "default")]),
        ]);

        assert_eq!("Ahoy Ann", catalog.format("greeting", &[("name", "Ann")]));
        assert_eq!("Tschüss", catalog.format("bye", &[]));
        assert_eq!("default", catalog.format("only", &[]));
    }

    #[tracing_test::traced_test]
    #[test]
    fn unresolved_key_falls_back_to_key() {
        let catalog = Catalog::new(vec![layer("default", &[])]);
        assert_eq!("does.not.exist", catalog.format("does.not.exist", &[]));
        assert!(logs_contain("Missing message for key"));
    }

    #[test]
    fn flattens_nested_json() {
        let layer = Layer::from_json(
            "test",
            r#"{"a": {"b": {"c": "deep"}, "list": ["one", "two"]}, "n": 3}"#,
        )
        .unwrap();

        assert_eq!(Some("deep"), layer.get("a.b.c"));
        assert_eq!(Some("one\ntwo"), layer.get("a.list"));
        assert_eq!(Some("3"), layer.get("n"));
    }

    #[test]
    fn rejects_non_object_layer() {
        assert!(matches!(
            Layer::from_json("test", "[1, 2]"),
            Err(CatalogError::NotAnObject { .. })
        ));
    }

    #[test]
    fn loads_layers_from_directory() {
        let dir = std::env::temp_dir().join(format!("catalog-load-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("lang")).unwrap();
        std::fs::create_dir_all(dir.join("themes")).unwrap();
        std::fs::write(
            dir.join("lang/de.json"),
            r#"{"match": {"cancelled": "Abgebrochen"}}"#,
        )
        .unwrap();
        std::fs::write(dir.join("themes/pirate.json"), r#"{"match": {"done": "Arr"}}"#).unwrap();

        let catalog = Catalog::load(Some(&dir), Some("de"), Some("pirate")).unwrap();
        assert_eq!(3, catalog.layers().len());
        assert_eq!("Abgebrochen", catalog.format("match.cancelled", &[]));
        assert_eq!("Arr", catalog.format("match.done", &[]));

        let missing = Catalog::load(Some(&dir), Some("fr"), None).unwrap();
        assert_eq!(1, missing.layers().len());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
