//! Template rendering for pod resources.

use ldpod_types::{ResourceError, StoreResult};

use crate::agent::TemplateParameters;

/// Renders template text with named parameters.
pub trait TemplateEngine: Send + Sync {
    fn apply(&self, template: &str, parameters: &TemplateParameters) -> StoreResult<String>;
}

/// Replaces `{{name}}` placeholders. Whitespace inside the braces is ignored
/// and unknown names render as the empty string. No sections, partials or
/// escaping.
#[derive(Clone, Copy, Debug, Default)]
pub struct MustacheTemplateEngine;

impl TemplateEngine for MustacheTemplateEngine {
    fn apply(&self, template: &str, parameters: &TemplateParameters) -> StoreResult<String> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                let offset = template.len() - rest.len() + start;
                return Err(ResourceError::BadRequest(format!(
                    "unterminated placeholder at offset {offset}"
                )));
            };
            let name = after[..end].trim();
            if let Some(value) = parameters.get(name) {
                out.push_str(value);
            }
            rest = &after[end + 2..];
        }
        out.push_str(rest);
        Ok(out)
    }
}
