/* Data model for one AWS-like service plugin.

Descriptors are produced offline by the plugin data regenerator, persisted
as one JSON file per service under the data directory, and read-only at
request time. IndexMap keeps JSON object order, because methods and
parameters document in declaration order. */

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use docsite_base::{DocsiteError, DocsiteResult, FilePath, PalHandle};

/// One service plugin: its methods, maintainers and code-example property.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceDescriptor {
    /// Unique slug, e.g. "s3"
    pub service: String,
    /// Human-readable name, e.g. "S3"
    pub display: String,
    /// Maintainer handles in credit order, usually "@"-prefixed
    #[serde(default)]
    pub maintainers: Vec<String>,
    /// Client property used in generated example code (`aws.<property>`)
    pub property: String,
    /// Method table in declaration order
    #[serde(default)]
    pub methods: IndexMap<String, MethodEntry>,
}

/// One method-table entry: a full descriptor, or the bare boolean stub a
/// plugin uses for an operation it lists but has not implemented.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MethodEntry {
    Descriptor(MethodDescriptor),
    /// `"SomeMethod": false` in the source JSON
    Stub(bool),
}

impl MethodEntry {
    /// The full descriptor, when this entry carries one.
    pub fn descriptor(&self) -> Option<&MethodDescriptor> {
        match self {
            Self::Descriptor(method) => Some(method),
            Self::Stub(_) => None,
        }
    }
}

/// One API operation of a service plugin.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MethodDescriptor {
    #[serde(default, skip_serializing_if = "is_false")]
    pub deprecated: bool,
    /// Disabled means "not yet implemented"
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
    /// Canonical service API doc reference.
    ///
    /// Required for every published method; `false` is the explicit opt-out
    /// for operations with no canonical doc page.
    #[serde(rename = "awsDoc", default, skip_serializing_if = "Option::is_none")]
    pub aws_doc: Option<DocLink>,
    /// Request parameters in declaration order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub validate: IndexMap<String, ParamDescriptor>,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl MethodDescriptor {
    /// The documentation URL, when one is declared.
    pub fn doc_url(&self) -> Option<&str> {
        match &self.aws_doc {
            Some(DocLink::Url(url)) => Some(url),
            _ => None,
        }
    }
}

/// A canonical doc reference: either a URL or the literal `false` opt-out.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DocLink {
    Url(String),
    /// `awsDoc: false` in the source JSON; documents the deliberate absence
    Exempt(bool),
}

/// One request parameter of a method.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParamDescriptor {
    /// One type tag or a union of several
    #[serde(rename = "type")]
    pub type_spec: TypeSpec,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    /// Free-text markdown description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Secondary documentation link
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// One type tag or a list of alternatives.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TypeSpec {
    One(ParamType),
    Many(Vec<ParamType>),
}

impl TypeSpec {
    /// Lowercase tags joined with `", "`, as shown in parameter tables.
    pub fn tags(&self) -> String {
        match self {
            Self::One(t) => t.tag().to_string(),
            Self::Many(ts) => ts.iter().map(|t| t.tag()).collect::<Vec<_>>().join(", "),
        }
    }

    /// Capitalized names joined with `" || "`, as shown in example code.
    pub fn example_names(&self) -> String {
        match self {
            Self::One(t) => t.example_name().to_string(),
            Self::Many(ts) => ts
                .iter()
                .map(|t| t.example_name())
                .collect::<Vec<_>>()
                .join(" || "),
        }
    }
}

/// The fixed parameter type vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Array,
    Boolean,
    Buffer,
    Number,
    Object,
    Stream,
    String,
}

impl ParamType {
    /// The lowercase tag used in parameter tables.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::Boolean => "boolean",
            Self::Buffer => "buffer",
            Self::Number => "number",
            Self::Object => "object",
            Self::Stream => "stream",
            Self::String => "string",
        }
    }

    /// The capitalized name used in generated example code.
    pub fn example_name(&self) -> &'static str {
        match self {
            Self::Array => "Array",
            Self::Boolean => "Boolean",
            Self::Buffer => "Buffer",
            Self::Number => "Number",
            Self::Object => "Object",
            Self::Stream => "Stream",
            Self::String => "String",
        }
    }
}

/// One entry of the consolidated services index.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceIndexEntry {
    pub service: String,
    pub display: String,
}

/// Load a service descriptor from `<data_dir>/<slug>.json`.
///
/// Malformed JSON maps to the Data error kind so logs can distinguish it
/// from a missing file, even though the request path collapses both to
/// not-found.
#[instrument(skip(pal))]
pub fn load_service(
    pal: &PalHandle,
    data_dir: &FilePath,
    slug: &str,
) -> DocsiteResult<ServiceDescriptor> {
    let path = data_dir.join(format!("{slug}.json"));
    let text = pal.read_file_to_string(&path)?;
    serde_json::from_str(&text)
        .map_err(|e| Box::new(DocsiteError::data(path.as_path().to_path_buf(), e.to_string())))
}
