/* Service page assembly.

A single markdown template is shared by every service page. Assembly loads
the service descriptor, substitutes the template tokens, generates the
method documentation and splices it between the method-docs markers. */

use parking_lot::RwLock;
use tracing::instrument;

use docsite_base::{DocsiteError, DocsiteResult, FilePath, PalHandle};

use crate::methods::generate_methods;
use crate::model::{ServiceDescriptor, load_service};

const METHOD_DOCS_START: &str = "<!-- METHOD_DOCS_START -->\n";
const METHOD_DOCS_END: &str = "<!-- METHOD_DOCS_END -->";

/// A fully assembled service page, before markdown rendering.
#[derive(Debug, Clone)]
pub struct AssembledPage {
    pub descriptor: ServiceDescriptor,
    /// The complete markdown source of the page
    pub md: String,
}

/// Assembles service pages from the shared template and per-service data.
///
/// The template file is read once and kept for the lifetime of the
/// assembler; descriptors are re-read per call and cached downstream as
/// part of the rendered page.
#[derive(Debug)]
pub struct ServiceAssembler {
    pal: PalHandle,
    template_path: FilePath,
    data_dir: FilePath,
    /// Package scope prefixed to the service slug, e.g. "@aws-lite"
    scope: String,
    template: RwLock<Option<String>>,
}

impl ServiceAssembler {
    pub fn new(pal: PalHandle, template_path: FilePath, data_dir: FilePath, scope: String) -> Self {
        Self {
            pal,
            template_path,
            data_dir,
            scope,
            template: RwLock::new(None),
        }
    }

    /// Assemble the complete markdown page for one service slug.
    #[instrument(skip(self))]
    pub fn assemble(&self, slug: &str) -> DocsiteResult<AssembledPage> {
        let descriptor = load_service(&self.pal, &self.data_dir, slug)?;

        let package_name = format!("{}/{}", self.scope, descriptor.service);
        let maintainer_links = descriptor
            .maintainers
            .iter()
            .map(|p| format!("[{p}](https://github.com/{})", p.replace('@', "")))
            .collect::<Vec<_>>()
            .join(", ");

        let readme = self
            .template_text()?
            .replace("$SERVICE", &package_name)
            .replace("$MAINTAINERS", &maintainer_links);

        let methods = generate_methods(&descriptor)?;
        let md = splice_method_docs(&readme, &methods)?;

        Ok(AssembledPage { descriptor, md })
    }

    fn template_text(&self) -> DocsiteResult<String> {
        if let Some(tmpl) = self.template.read().as_ref() {
            return Ok(tmpl.clone());
        }
        let tmpl = self.pal.read_file_to_string(&self.template_path)?;
        *self.template.write() = Some(tmpl.clone());
        Ok(tmpl)
    }
}

/// Replace the region between the method-docs markers with the generated
/// method documentation. Both markers must be present.
fn splice_method_docs(readme: &str, methods: &str) -> DocsiteResult<String> {
    let start = readme
        .find(METHOD_DOCS_START)
        .map(|pos| pos + METHOD_DOCS_START.len())
        .ok_or_else(|| render_error("missing method docs start marker"))?;
    let end = readme[start..]
        .find(METHOD_DOCS_END)
        .map(|pos| start + pos)
        .ok_or_else(|| render_error("missing method docs end marker"))?;

    let mut md = String::with_capacity(readme.len() + methods.len());
    md.push_str(&readme[..start]);
    md.push_str(methods);
    md.push_str(&readme[end..]);
    Ok(md)
}

fn render_error(message: &str) -> Box<DocsiteError> {
    Box::new(DocsiteError::render(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::S3_JSON;
    use docsite_base::MockPal;

    const TEMPLATE: &str = "# $SERVICE\n\nMaintained by: $MAINTAINERS\n\n\
<!-- METHOD_DOCS_START -->\nplaceholder\n<!-- METHOD_DOCS_END -->\n\nFooter\n";

    fn assembler_with(template: &str) -> ServiceAssembler {
        let mock = MockPal::new();
        mock.add_file(FilePath::from("tmpl/$service.md"), template.into());
        mock.add_file(FilePath::from("data/s3.json"), S3_JSON.into());
        ServiceAssembler::new(
            PalHandle::new(mock),
            FilePath::from("tmpl/$service.md"),
            FilePath::from("data"),
            "@aws-lite".to_string(),
        )
    }

    #[test]
    fn test_assemble_substitutes_tokens() {
        let page = assembler_with(TEMPLATE).assemble("s3").unwrap();
        assert!(page.md.starts_with("# @aws-lite/s3\n"));
        assert!(
            page.md
                .contains("Maintained by: [@someone](https://github.com/someone)")
        );
        assert_eq!(page.descriptor.service, "s3");
    }

    #[test]
    fn test_assemble_splices_method_docs() {
        let page = assembler_with(TEMPLATE).assemble("s3").unwrap();
        assert!(!page.md.contains("placeholder"));
        assert!(page.md.contains("### `PutObject`"));
        // Markers stay in place around the spliced docs
        assert!(page.md.contains(METHOD_DOCS_START));
        assert!(page.md.contains(METHOD_DOCS_END));
        assert!(page.md.ends_with("Footer\n"));
    }

    #[test]
    fn test_assemble_replaces_every_token_occurrence() {
        let template = "$SERVICE and $SERVICE again\n\
<!-- METHOD_DOCS_START -->\n<!-- METHOD_DOCS_END -->\n";
        let page = assembler_with(template).assemble("s3").unwrap();
        assert!(page.md.starts_with("@aws-lite/s3 and @aws-lite/s3 again"));
    }

    #[test]
    fn test_assemble_joins_multiple_maintainers() {
        let mock = MockPal::new();
        mock.add_file(FilePath::from("tmpl/$service.md"), TEMPLATE.into());
        mock.add_file(
            FilePath::from("data/dynamodb.json"),
            br#"{
                "service": "dynamodb",
                "display": "DynamoDB",
                "maintainers": ["@a", "@b"],
                "property": "DynamoDB",
                "methods": {}
            }"#
            .to_vec(),
        );
        let assembler = ServiceAssembler::new(
            PalHandle::new(mock),
            FilePath::from("tmpl/$service.md"),
            FilePath::from("data"),
            "@aws-lite".to_string(),
        );

        let page = assembler.assemble("dynamodb").unwrap();
        assert!(page.md.contains(
            "[@a](https://github.com/a), [@b](https://github.com/b)"
        ));
    }

    #[test]
    fn test_template_read_once() {
        let mock = MockPal::new();
        mock.add_file(FilePath::from("tmpl/$service.md"), TEMPLATE.into());
        mock.add_file(FilePath::from("data/s3.json"), S3_JSON.into());
        let assembler = ServiceAssembler::new(
            PalHandle::new(mock.clone()),
            FilePath::from("tmpl/$service.md"),
            FilePath::from("data"),
            "@aws-lite".to_string(),
        );

        assembler.assemble("s3").unwrap();
        let after_first = mock.read_count();

        // Second call re-reads the descriptor but not the template
        assembler.assemble("s3").unwrap();
        assert_eq!(mock.read_count(), after_first + 1);
    }

    #[test]
    fn test_missing_markers_is_render_error() {
        let assembler = assembler_with("# $SERVICE, no markers here\n");
        let err = assembler.assemble("s3").unwrap_err();
        assert!(matches!(
            err.kind(),
            docsite_base::ErrorKind::Render { .. }
        ));
    }

    #[test]
    fn test_missing_service_data_is_error() {
        let assembler = assembler_with(TEMPLATE);
        assert!(assembler.assemble("unknown").is_err());
    }
}
