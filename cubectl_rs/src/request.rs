//! Request lowering: [`CommandDescriptor`] to an HTTP method, URL and body.
//!
//! Lowering is pure apart from one blocking read of the standard-input
//! stream, which only happens for body-carrying commands that did not take
//! the single-field form.

use std::fmt;
use std::io::Read;

use serde_json::{Map, Value};
use tracing::debug;

use crate::cli::command::{CommandDescriptor, CommandKind};
use crate::coerce::{coerce, single_field_body};
use crate::error::RequestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chooses the method used by `set` for a target resource.
///
/// `resource` is the first path segment, if any.
pub trait SetMethodPolicy {
    fn set_method(&self, resource: Option<&str>) -> Method;
}

/// Policy that always answers `PATCH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatchPolicy;

impl SetMethodPolicy for PatchPolicy {
    fn set_method(&self, _resource: Option<&str>) -> Method {
        Method::Patch
    }
}

/// Settings consumed by [`lower`].
pub struct LowerConfig<'a> {
    pub base_url: &'a str,
    pub single_parameter_workaround: bool,
    pub policy: &'a dyn SetMethodPolicy,
}

impl fmt::Debug for LowerConfig<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LowerConfig")
            .field("base_url", &self.base_url)
            .field("single_parameter_workaround", &self.single_parameter_workaround)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn body_text(&self) -> String {
        self.body
            .as_deref()
            .map(|body| String::from_utf8_lossy(body).into_owned())
            .unwrap_or_default()
    }
}

/// Debug dump: request line, then the body.
impl fmt::Display for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}\n{}\n", self.method, self.url, self.body_text())
    }
}

/// Lower a compiled descriptor into an [`HttpRequest`].
pub fn lower(
    descriptor: &CommandDescriptor,
    config: &LowerConfig<'_>,
    stdin: &mut dyn Read,
) -> Result<HttpRequest, RequestError> {
    let segments = url_segments(descriptor.path_segments());
    let mut url = format!("{}/", config.base_url.trim_end_matches('/'));

    if descriptor.is_help_request() {
        url.push_str(&segments.join("/"));
        url.push_str("?help=");
        url.push_str(descriptor.command().help_param());
        let request = HttpRequest {
            method: Method::Options,
            url,
            body: None,
        };
        debug!(method = %request.method, url = %request.url, "lowered help request");
        return Ok(request);
    }

    for segment in &segments {
        url.push_str(segment);
        url.push('/');
    }

    let command = descriptor.command();
    let method = match command {
        CommandKind::None | CommandKind::Add => Method::Post,
        CommandKind::Show => Method::Get,
        CommandKind::Del => Method::Delete,
        CommandKind::Set => config.policy.set_method(segments.first().copied()),
    };

    let body = if !command.carries_body() {
        None
    } else if let Some((key, value)) = single_field(descriptor, config) {
        url.push_str(key);
        url.push('/');
        Some(single_field_body(value).into_bytes())
    } else {
        Some(read_structured_body(stdin)?.map_or_else(|| fields_body(descriptor), Ok)?)
    };

    let request = HttpRequest { method, url, body };
    debug!(method = %request.method, url = %request.url, "lowered request");
    Ok(request)
}

/// Split every segment on `/` and drop empty parts, so concatenation never
/// yields `//`.
fn url_segments(path: &[String]) -> Vec<&str> {
    path.iter()
        .flat_map(|segment| segment.split('/'))
        .filter(|part| !part.is_empty())
        .collect()
}

/// The field moved into the URL by the single-parameter form, which only
/// applies to `set` with exactly one field.
fn single_field<'d>(descriptor: &'d CommandDescriptor, config: &LowerConfig<'_>) -> Option<(&'d str, &'d str)> {
    let fields = descriptor.body_fields();
    if !config.single_parameter_workaround || descriptor.command() != CommandKind::Set || fields.len() != 1 {
        return None;
    }
    fields.iter().next().map(|(key, value)| (key.as_str(), value.as_str()))
}

/// Piped YAML (or JSON, which is YAML) converted to JSON bytes. Blank input
/// counts as no input.
fn read_structured_body(stdin: &mut dyn Read) -> Result<Option<Vec<u8>>, RequestError> {
    let mut raw = Vec::new();
    stdin.read_to_end(&mut raw)?;
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    debug!(bytes = raw.len(), "using standard input as request body");
    let value: Value = serde_yaml::from_slice(&raw)?;
    Ok(Some(serde_json::to_vec(&value)?))
}

/// JSON object of coerced fields. Dotted keys build nested objects.
fn fields_body(descriptor: &CommandDescriptor) -> Result<Vec<u8>, RequestError> {
    let mut root = Map::new();
    for (key, value) in descriptor.body_fields() {
        insert_dotted(&mut root, key, coerce(value).to_json());
    }
    Ok(serde_json::to_vec(&Value::Object(root))?)
}

fn insert_dotted(root: &mut Map<String, Value>, key: &str, value: Value) {
    let mut parts = key.split('.').peekable();
    let mut current = root;
    while let Some(part) = parts.next() {
        if parts.peek().is_none() {
            current.insert(part.to_string(), value);
            return;
        }
        let slot = current
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Value::Object(next) = slot else {
            return;
        };
        current = next;
    }
}
