//! # Custom Error Messages
//!
//! Schema authors can attach an `errorMessage` annotation to any schema
//! object to replace the validator's keyword messages with their own:
//!
//! ```json
//! {
//!   "type": "object",
//!   "required": ["name"],
//!   "properties": { "port": { "type": "integer" } },
//!   "errorMessage": {
//!     "required": "a network needs a name",
//!     "properties": { "port": "port must be a whole number, got ${/port}" },
//!     "_": "network entry is malformed"
//!   }
//! }
//! ```
//!
//! - A string replaces every error raised in that object or below it.
//! - Keyword keys replace the errors of that keyword raised directly in the
//!   object, one error per keyword.
//! - `properties` replaces errors raised under `properties/<name>`, one per
//!   property.
//! - `_` replaces whatever the other keys left over.
//!
//! Replacing several failures with one message only works when all of them
//! are visible, so this feature always runs the validator in all-errors mode.
//!
//! Templates `${/abs/pointer}` read from the document root; `${N/pointer}`
//! walks N levels up from the error location first. Unresolvable templates
//! are left as written.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::record::{escape_segment, pointer_segments, ValidationError};

/// Annotation keyword carrying author messages.
pub const ERROR_MESSAGE_KEYWORD: &str = "errorMessage";

const PROPERTIES_KEY: &str = "properties";
const FALLBACK_KEY: &str = "_";

/// Keywords whose values are data, not subschemas.
const DATA_KEYWORDS: &[&str] = &["const", "enum", "default", "examples"];

#[derive(Debug, Clone, PartialEq)]
enum MessageSpec {
    All(String),
    Detailed {
        keywords: BTreeMap<String, String>,
        properties: BTreeMap<String, String>,
        fallback: Option<String>,
    },
}

impl MessageSpec {
    fn parse(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::All(s.clone())),
            Value::Object(map) => {
                let mut keywords = BTreeMap::new();
                let mut properties = BTreeMap::new();
                let mut fallback = None;
                for (key, v) in map {
                    match (key.as_str(), v) {
                        (PROPERTIES_KEY, Value::Object(props)) => {
                            for (name, msg) in props {
                                if let Some(msg) = msg.as_str() {
                                    properties.insert(name.clone(), msg.to_string());
                                }
                            }
                        }
                        (FALLBACK_KEY, Value::String(msg)) => fallback = Some(msg.clone()),
                        (_, Value::String(msg)) => {
                            keywords.insert(key.clone(), msg.clone());
                        }
                        _ => {}
                    }
                }
                Some(Self::Detailed {
                    keywords,
                    properties,
                    fallback,
                })
            }
            _ => None,
        }
    }
}

/// Index of `errorMessage` annotations in a schema, keyed by the JSON
/// Pointer of the schema object that carries them.
#[derive(Debug, Clone, Default)]
pub struct ErrorMessages {
    specs: BTreeMap<String, MessageSpec>,
}

impl ErrorMessages {
    /// Collect every `errorMessage` annotation in `schema`.
    pub fn index(schema: &Value) -> Self {
        let mut specs = BTreeMap::new();
        collect(schema, String::new(), &mut specs);
        Self { specs }
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Replace errors covered by an annotation with the author's messages.
    ///
    /// Errors no annotation covers pass through unchanged. Output order
    /// follows the first error of each replacement.
    pub fn apply(&self, errors: Vec<ValidationError>, instance: &Value) -> Vec<ValidationError> {
        if self.specs.is_empty() || errors.is_empty() {
            return errors;
        }

        let mut slots: Vec<Slot> = Vec::new();
        let mut groups: BTreeMap<&str, Vec<ValidationError>> = BTreeMap::new();

        for error in errors {
            match self.owner(error.schema_pointer()) {
                Some(owner) => {
                    let group = groups.entry(owner).or_default();
                    if group.is_empty() {
                        slots.push(Slot::Group(owner));
                    }
                    group.push(error);
                }
                None => slots.push(Slot::Pass(error)),
            }
        }

        let mut out = Vec::new();
        for slot in slots {
            match slot {
                Slot::Pass(error) => out.push(error),
                Slot::Group(owner) => {
                    let group = groups.remove(owner).unwrap_or_default();
                    if let Some(spec) = self.specs.get(owner) {
                        out.extend(replace_group(owner, spec, group, instance));
                    }
                }
            }
        }
        out
    }

    /// Deepest annotated schema object that contains `schema_pointer`.
    fn owner(&self, schema_pointer: &str) -> Option<&str> {
        self.specs
            .keys()
            .filter(|owner| {
                schema_pointer
                    .strip_prefix(owner.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
            })
            .max_by_key(|owner| owner.len())
            .map(String::as_str)
    }
}

enum Slot<'a> {
    Pass(ValidationError),
    Group(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Bucket {
    Keyword(String),
    Property(String),
    Fallback,
    Keep(usize),
}

fn collect(value: &Value, pointer: String, specs: &mut BTreeMap<String, MessageSpec>) {
    match value {
        Value::Object(map) => {
            if let Some(spec) = map.get(ERROR_MESSAGE_KEYWORD).and_then(MessageSpec::parse) {
                specs.insert(pointer.clone(), spec);
            }
            for (key, child) in map {
                if key == ERROR_MESSAGE_KEYWORD || DATA_KEYWORDS.contains(&key.as_str()) {
                    continue;
                }
                collect(child, format!("{pointer}/{}", escape_segment(key)), specs);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                collect(child, format!("{pointer}/{i}"), specs);
            }
        }
        _ => {}
    }
}

fn replace_group(
    owner: &str,
    spec: &MessageSpec,
    group: Vec<ValidationError>,
    instance: &Value,
) -> Vec<ValidationError> {
    let Some(first) = group.first() else {
        return Vec::new();
    };
    let base = owner_instance_path(owner, first);
    let schema_path = format!("#{owner}/{ERROR_MESSAGE_KEYWORD}");

    let (keywords, properties, fallback) = match spec {
        MessageSpec::All(template) => {
            let message = interpolate(template, &base, instance);
            return vec![replacement(base, schema_path, message, &group)];
        }
        MessageSpec::Detailed {
            keywords,
            properties,
            fallback,
        } => (keywords, properties, fallback),
    };

    let mut buckets: Vec<(Bucket, Vec<ValidationError>)> = Vec::new();
    for (i, error) in group.into_iter().enumerate() {
        let suffix = suffix_segments(owner, &error);
        let bucket = if suffix.len() == 1 && keywords.contains_key(&suffix[0]) {
            Bucket::Keyword(suffix[0].clone())
        } else if suffix.len() >= 2
            && suffix[0] == PROPERTIES_KEY
            && properties.contains_key(&suffix[1])
        {
            Bucket::Property(suffix[1].clone())
        } else if fallback.is_some() {
            Bucket::Fallback
        } else {
            Bucket::Keep(i)
        };

        match buckets.iter_mut().find(|(b, _)| *b == bucket) {
            Some((_, errors)) => errors.push(error),
            None => buckets.push((bucket, vec![error])),
        }
    }

    let mut out = Vec::new();
    for (bucket, errors) in buckets {
        match bucket {
            Bucket::Keyword(keyword) => {
                let template = keywords.get(&keyword).map(String::as_str).unwrap_or_default();
                let message = interpolate(template, &base, instance);
                out.push(replacement(base.clone(), schema_path.clone(), message, &errors));
            }
            Bucket::Property(name) => {
                let template = properties.get(&name).map(String::as_str).unwrap_or_default();
                let path = format!("{base}/{}", escape_segment(&name));
                let message = interpolate(template, &path, instance);
                out.push(replacement(path, schema_path.clone(), message, &errors));
            }
            Bucket::Fallback => {
                let template = fallback.as_deref().unwrap_or_default();
                let message = interpolate(template, &base, instance);
                out.push(replacement(base.clone(), schema_path.clone(), message, &errors));
            }
            Bucket::Keep(_) => out.extend(errors),
        }
    }
    out
}

fn replacement(
    instance_path: String,
    schema_path: String,
    message: String,
    replaced: &[ValidationError],
) -> ValidationError {
    let originals = serde_json::to_value(replaced).unwrap_or_default();
    ValidationError {
        instance_path,
        schema_path,
        keyword: ERROR_MESSAGE_KEYWORD.to_string(),
        params: json!({ "errors": originals }),
        message,
    }
}

/// Schema path segments of `error` below the annotated object at `owner`.
fn suffix_segments(owner: &str, error: &ValidationError) -> Vec<String> {
    let rest = error
        .schema_pointer()
        .strip_prefix(owner)
        .unwrap_or_default();
    pointer_segments(rest)
}

/// Instance location the annotated object at `owner` was applied to.
fn owner_instance_path(owner: &str, error: &ValidationError) -> String {
    let suffix = suffix_segments(owner, error);
    let steps = instance_steps(&suffix);
    let mut segments = pointer_segments(&error.instance_path);
    segments.truncate(segments.len().saturating_sub(steps));
    segments
        .iter()
        .map(|s| format!("/{}", escape_segment(s)))
        .collect()
}

/// How many instance levels a schema path descends through. The final
/// segment is the failing keyword itself and never descends.
fn instance_steps(suffix: &[String]) -> usize {
    let body = &suffix[..suffix.len().saturating_sub(1)];
    let mut steps = 0;
    let mut i = 0;
    while i < body.len() {
        match body[i].as_str() {
            "properties" | "patternProperties" => {
                steps += 1;
                i += 2;
            }
            "items" | "prefixItems" => {
                steps += 1;
                let indexed = body
                    .get(i + 1)
                    .is_some_and(|next| next.parse::<usize>().is_ok());
                i += if indexed { 2 } else { 1 };
            }
            "additionalProperties" | "additionalItems" | "contains" | "unevaluatedProperties"
            | "unevaluatedItems" => {
                steps += 1;
                i += 1;
            }
            "definitions" | "$defs" | "dependentSchemas" | "dependencies" => i += 2,
            _ => i += 1,
        }
    }
    steps
}

/// Substitute `${pointer}` templates with values from `instance`.
fn interpolate(template: &str, location: &str, instance: &Value) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let token = &after[..end];
        match resolve_template(token, location, instance) {
            Some(Value::String(s)) => out.push_str(&s),
            Some(other) => out.push_str(&other.to_string()),
            None => {
                out.push_str("${");
                out.push_str(token);
                out.push('}');
            }
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

fn resolve_template(token: &str, location: &str, instance: &Value) -> Option<Value> {
    if token.is_empty() || token.starts_with('/') {
        return instance.pointer(token).cloned();
    }

    let digits = token.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let up: usize = token[..digits].parse().ok()?;
    let tail = &token[digits..];
    if !tail.is_empty() && !tail.starts_with('/') {
        return None;
    }

    let mut segments = pointer_segments(location);
    if up > segments.len() {
        return None;
    }
    segments.truncate(segments.len() - up);
    let base: String = segments
        .iter()
        .map(|s| format!("/{}", escape_segment(s)))
        .collect();
    instance.pointer(&format!("{base}{tail}")).cloned()
}
