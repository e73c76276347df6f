use bytes::Bytes;

use crate::error::{ResourceError, StoreResult};

/// A partial-update operand.
///
/// Stores never interpret a patch. Only a patcher plugged into a patching
/// store parses the body according to its content type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Patch {
    pub content_type: String,
    pub body: Bytes,
}

impl Patch {
    pub fn new(content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    /// The body as UTF-8 text.
    pub fn body_text(&self) -> StoreResult<&str> {
        std::str::from_utf8(&self.body)
            .map_err(|e| ResourceError::BadRequest(format!("patch body is not UTF-8: {e}")))
    }
}
