/* Method documentation generator.

Converts a service descriptor into the markdown fragment documenting every
method: heading, canonical doc citation, parameter definition list, usage
example, plus trailing sections for deprecated and not-yet-implemented
methods. The markup mixes raw HTML (figure/dl) into the markdown because
the downstream renderer passes HTML through verbatim. */

use docsite_base::{DocsiteError, DocsiteResult};

use crate::model::{MethodDescriptor, MethodEntry, ServiceDescriptor};

const FENCE_START: &str = "```javascript";
const FENCE_END: &str = "```";
const REQUIRED_LABEL: &str = " [required]";
const REQUIRED_COMMENT: &str = " // required";

/// Generate the full method documentation markdown for one service.
///
/// Methods are documented in declaration order. Deprecated and disabled
/// methods, and bare `false` stub entries, are collected into their
/// trailing sections instead of being documented inline. Every published
/// method must carry a canonical doc reference (a URL, or the literal
/// `false` opt-out); a missing reference is a fatal configuration error
/// naming the plugin and method.
pub fn generate_methods(descriptor: &ServiceDescriptor) -> DocsiteResult<String> {
    let mut deprecated: Vec<(&str, Option<&str>)> = Vec::new();
    let mut incomplete: Vec<(&str, Option<&str>)> = Vec::new();
    let mut sections: Vec<String> = Vec::new();

    for (name, entry) in &descriptor.methods {
        let method = match entry {
            MethodEntry::Descriptor(method) => method,
            // A bare false means the plugin has not implemented it yet
            MethodEntry::Stub(false) => {
                incomplete.push((name, None));
                continue;
            }
            MethodEntry::Stub(true) => {
                return Err(Box::new(DocsiteError::config(
                    descriptor.display.clone(),
                    name.clone(),
                )));
            }
        };
        if method.deprecated {
            deprecated.push((name, method.doc_url()));
            continue;
        }
        if method.disabled {
            incomplete.push((name, method.doc_url()));
            continue;
        }
        if method.aws_doc.is_none() {
            return Err(Box::new(DocsiteError::config(
                descriptor.display.clone(),
                name.clone(),
            )));
        }
        sections.push(method_section(descriptor, name, method));
    }

    let mut docs = sections.join("\n\n\n");
    docs.push('\n');

    if !deprecated.is_empty() {
        docs.push_str("\n\n## Deprecated methods\n\n");
        docs.push_str(&bullet_list(&deprecated));
        docs.push('\n');
    }
    if !incomplete.is_empty() {
        docs.push_str("\n\n## Methods yet to be implemented\n\n");
        docs.push_str("Please help out by [opening a PR](/contributing)!\n\n");
        docs.push_str(&bullet_list(&incomplete));
        docs.push('\n');
    }
    Ok(docs)
}

/// One documented method: heading, citation, properties, example.
fn method_section(descriptor: &ServiceDescriptor, name: &str, method: &MethodDescriptor) -> String {
    let mut section = format!("<figure><figcaption>\n\n### `{name}`\n\n</figcaption>\n\n");

    if let Some(url) = method.doc_url() {
        section.push_str(&format!("<cite>[Canonical AWS API doc]({url})</cite>\n"));
    }

    if !method.validate.is_empty() {
        section.push_str("\n #### Properties\n<dl>");
        section.push_str(&property_list(method));
        section.push_str("</dl>");
    }

    section.push_str("\n\n");
    section.push_str(&example_block(descriptor, name, method));
    section.push_str("\n\n</figure>");
    section
}

/// The parameter definition list, required parameters first.
fn property_list(method: &MethodDescriptor) -> String {
    let mut entries: Vec<(bool, String)> = method
        .validate
        .iter()
        .map(|(param, spec)| {
            let types = spec.type_spec.tags();
            let req = if spec.required { REQUIRED_LABEL } else { "" };
            let mut entry = format!("<dt><code>{param}</code> ({types}){req}</dt>");
            if let Some(comment) = &spec.comment {
                // Blank lines inside dd preserve nested markdown formatting
                entry.push_str(&format!("<dd>\n\n{comment}\n\n</dd>"));
            }
            if let Some(reference) = &spec.reference {
                entry.push_str(&format!(
                    "<dd><a href=\"{reference}\" target=_blank>More details (AWS)</a></dd>"
                ));
            }
            (spec.required, entry)
        })
        .collect();
    sort_required_first(&mut entries);
    entries
        .into_iter()
        .map(|(_, entry)| entry)
        .collect::<Vec<_>>()
        .join("\n")
}

/// The fenced usage-example block for one method.
fn example_block(descriptor: &ServiceDescriptor, name: &str, method: &MethodDescriptor) -> String {
    let mut params = String::new();
    if !method.validate.is_empty() {
        let mut lines: Vec<(bool, String)> = method
            .validate
            .iter()
            .map(|(param, spec)| {
                let mut line = format!("  {param}: {},", spec.type_spec.example_names());
                if spec.required {
                    line.push_str(REQUIRED_COMMENT);
                }
                (spec.required, line)
            })
            .collect();
        sort_required_first(&mut lines);
        let body = lines
            .into_iter()
            .map(|(_, line)| line)
            .collect::<Vec<_>>()
            .join("\n");
        params = format!("{{\n{body}\n}}");
    }
    let code = format!("await aws.{}.{name}({params})", descriptor.property);
    ["#### Example", FENCE_START, code.as_str(), FENCE_END].join("\n")
}

/// Required entries sort before optional ones; lexical order of the
/// rendered line breaks ties within each group.
fn sort_required_first(entries: &mut [(bool, String)]) {
    entries.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
}

fn bullet_list(items: &[(&str, Option<&str>)]) -> String {
    items
        .iter()
        .map(|(method, url)| match url {
            Some(url) => format!("- [`{method}`]({url})"),
            None => format!("- `{method}`"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DocLink, ParamDescriptor, ParamType, TypeSpec};
    use indexmap::IndexMap;

    fn param(type_spec: TypeSpec, required: bool) -> ParamDescriptor {
        ParamDescriptor {
            type_spec,
            required,
            comment: None,
            reference: None,
        }
    }

    fn descriptor(methods: IndexMap<String, MethodDescriptor>) -> ServiceDescriptor {
        let methods = methods
            .into_iter()
            .map(|(name, method)| (name, MethodEntry::Descriptor(method)))
            .collect();
        descriptor_with(methods)
    }

    fn descriptor_with(methods: IndexMap<String, MethodEntry>) -> ServiceDescriptor {
        ServiceDescriptor {
            service: "s3".to_string(),
            display: "S3".to_string(),
            maintainers: vec!["@someone".to_string()],
            property: "s3".to_string(),
            methods,
        }
    }

    #[test]
    fn test_full_generation() {
        let mut methods = IndexMap::new();
        let mut validate = IndexMap::new();
        // Declared optional-before-required to exercise the sort
        validate.insert(
            "Limit".to_string(),
            param(TypeSpec::One(ParamType::Number), false),
        );
        validate.insert(
            "Name".to_string(),
            param(TypeSpec::One(ParamType::String), true),
        );
        methods.insert(
            "Bar".to_string(),
            MethodDescriptor {
                aws_doc: Some(DocLink::Url("https://y".to_string())),
                validate,
                ..Default::default()
            },
        );
        methods.insert(
            "Foo".to_string(),
            MethodDescriptor {
                deprecated: true,
                aws_doc: Some(DocLink::Url("https://x".to_string())),
                ..Default::default()
            },
        );
        methods.insert(
            "Baz".to_string(),
            MethodDescriptor {
                disabled: true,
                ..Default::default()
            },
        );

        let docs = generate_methods(&descriptor(methods)).unwrap();

        let expected = "<figure><figcaption>

### `Bar`

</figcaption>

<cite>[Canonical AWS API doc](https://y)</cite>

 #### Properties
<dl><dt><code>Name</code> (string) [required]</dt>
<dt><code>Limit</code> (number)</dt></dl>

#### Example
```javascript
await aws.s3.Bar({
  Name: String, // required
  Limit: Number,
})
```

</figure>


## Deprecated methods

- [`Foo`](https://x)


## Methods yet to be implemented

Please help out by [opening a PR](/contributing)!

- `Baz`
";
        assert_eq!(docs, expected);
    }

    #[test]
    fn test_missing_doc_link_is_config_error() {
        let mut methods = IndexMap::new();
        methods.insert("Orphan".to_string(), MethodDescriptor::default());

        let err = generate_methods(&descriptor(methods)).unwrap_err();
        assert!(matches!(
            err.kind(),
            docsite_base::ErrorKind::Config { .. }
        ));
        let display = err.to_string();
        assert!(display.contains("S3"));
        assert!(display.contains("Orphan"));
    }

    #[test]
    fn test_doc_link_false_is_allowed_without_citation() {
        let mut methods = IndexMap::new();
        methods.insert(
            "Quiet".to_string(),
            MethodDescriptor {
                aws_doc: Some(DocLink::Exempt(false)),
                ..Default::default()
            },
        );

        let docs = generate_methods(&descriptor(methods)).unwrap();
        assert!(docs.contains("### `Quiet`"));
        assert!(!docs.contains("Canonical AWS API doc"));
        // No parameters declared: a bare call with no argument
        assert!(docs.contains("await aws.s3.Quiet()"));
    }

    #[test]
    fn test_required_params_sort_first_with_lexical_ties() {
        let mut validate = IndexMap::new();
        validate.insert(
            "Zeta".to_string(),
            param(TypeSpec::One(ParamType::String), true),
        );
        validate.insert(
            "Alpha".to_string(),
            param(TypeSpec::One(ParamType::String), false),
        );
        validate.insert(
            "Beta".to_string(),
            param(TypeSpec::One(ParamType::String), true),
        );
        let mut methods = IndexMap::new();
        methods.insert(
            "Call".to_string(),
            MethodDescriptor {
                aws_doc: Some(DocLink::Url("https://z".to_string())),
                validate,
                ..Default::default()
            },
        );

        let docs = generate_methods(&descriptor(methods)).unwrap();

        // Required before optional in the property list, lexical within group
        let beta = docs.find("<dt><code>Beta</code>").unwrap();
        let zeta = docs.find("<dt><code>Zeta</code>").unwrap();
        let alpha = docs.find("<dt><code>Alpha</code>").unwrap();
        assert!(beta < zeta);
        assert!(zeta < alpha);

        // Same ordering in the example parameter object
        let beta = docs.find("  Beta: String, // required").unwrap();
        let zeta = docs.find("  Zeta: String, // required").unwrap();
        let alpha = docs.find("  Alpha: String,").unwrap();
        assert!(beta < zeta);
        assert!(zeta < alpha);
    }

    #[test]
    fn test_union_types_render_in_table_and_example() {
        let mut validate = IndexMap::new();
        validate.insert(
            "Body".to_string(),
            param(
                TypeSpec::Many(vec![ParamType::Buffer, ParamType::Stream]),
                false,
            ),
        );
        let mut methods = IndexMap::new();
        methods.insert(
            "Upload".to_string(),
            MethodDescriptor {
                aws_doc: Some(DocLink::Url("https://u".to_string())),
                validate,
                ..Default::default()
            },
        );

        let docs = generate_methods(&descriptor(methods)).unwrap();
        assert!(docs.contains("<dt><code>Body</code> (buffer, stream)</dt>"));
        assert!(docs.contains("  Body: Buffer || Stream,"));
    }

    #[test]
    fn test_comment_and_ref_render_as_dd_blocks() {
        let mut validate = IndexMap::new();
        validate.insert(
            "Bucket".to_string(),
            ParamDescriptor {
                type_spec: TypeSpec::One(ParamType::String),
                required: true,
                comment: Some("Bucket name, **not** the ARN".to_string()),
                reference: Some("https://ref".to_string()),
            },
        );
        let mut methods = IndexMap::new();
        methods.insert(
            "Head".to_string(),
            MethodDescriptor {
                aws_doc: Some(DocLink::Url("https://h".to_string())),
                validate,
                ..Default::default()
            },
        );

        let docs = generate_methods(&descriptor(methods)).unwrap();
        // Blank lines around the comment preserve its nested markdown
        assert!(docs.contains("<dd>\n\nBucket name, **not** the ARN\n\n</dd>"));
        assert!(docs.contains("<dd><a href=\"https://ref\" target=_blank>More details (AWS)</a></dd>"));
    }

    #[test]
    fn test_no_trailing_sections_when_all_methods_active() {
        let mut methods = IndexMap::new();
        methods.insert(
            "Only".to_string(),
            MethodDescriptor {
                aws_doc: Some(DocLink::Url("https://o".to_string())),
                ..Default::default()
            },
        );

        let docs = generate_methods(&descriptor(methods)).unwrap();
        assert!(!docs.contains("Deprecated methods"));
        assert!(!docs.contains("yet to be implemented"));
    }

    #[test]
    fn test_false_method_entry_lists_as_incomplete() {
        let mut methods = IndexMap::new();
        methods.insert(
            "Live".to_string(),
            MethodEntry::Descriptor(MethodDescriptor {
                aws_doc: Some(DocLink::Url("https://l".to_string())),
                ..Default::default()
            }),
        );
        methods.insert("GetObject".to_string(), MethodEntry::Stub(false));

        let docs = generate_methods(&descriptor_with(methods)).unwrap();
        assert!(docs.contains("## Methods yet to be implemented"));
        assert!(docs.contains("- `GetObject`"));
        // Stubs never get a documented section
        assert!(!docs.contains("### `GetObject`"));
    }

    #[test]
    fn test_true_method_entry_is_config_error() {
        let mut methods = IndexMap::new();
        methods.insert("Bogus".to_string(), MethodEntry::Stub(true));

        let err = generate_methods(&descriptor_with(methods)).unwrap_err();
        assert!(matches!(
            err.kind(),
            docsite_base::ErrorKind::Config { .. }
        ));
    }

    #[test]
    fn test_deprecated_bullet_without_link() {
        let mut methods = IndexMap::new();
        methods.insert(
            "Old".to_string(),
            MethodDescriptor {
                deprecated: true,
                ..Default::default()
            },
        );
        methods.insert(
            "Live".to_string(),
            MethodDescriptor {
                aws_doc: Some(DocLink::Url("https://l".to_string())),
                ..Default::default()
            },
        );

        let docs = generate_methods(&descriptor(methods)).unwrap();
        assert!(docs.contains("- `Old`"));
        assert!(!docs.contains("- [`Old`]"));
    }
}
