//! Emitted artifacts (§6): SARIF 2.1.0 and pretty-printed JSON, plus the
//! `Renderer` capability for the external Markdown/TerminalANSI
//! renderers the core does not implement.

pub mod json;
pub mod sarif;

use crate::model::Review;

/// A `render(Review) -> bytes` capability. `Markdown` and `TerminalANSI`
/// are marker variants only — actual prose rendering is an external
/// collaborator per the purpose-and-scope boundary; this crate only
/// defines the seam.
pub enum Renderer {
    Markdown,
    TerminalAnsi,
}

impl Renderer {
    pub fn render(&self, _review: &Review) -> Vec<u8> {
        match self {
            Renderer::Markdown | Renderer::TerminalAnsi => {
                unimplemented!("markdown/terminal rendering is an external collaborator")
            }
        }
    }
}
