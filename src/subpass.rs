use crate::attachment::AttachmentUsage;

/// One phase of a render pass: a debug label plus the attachments it touches, in declaration
/// order. A subpass's index is its position in the slice handed to the render pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Subpass {
    pub name: String,
    pub attachments: Vec<AttachmentUsage>,
}

impl Subpass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attachments: Vec::new(),
        }
    }

    pub fn with(mut self, usage: AttachmentUsage) -> Self {
        self.attachments.push(usage);
        self
    }

    pub fn push(&mut self, usage: AttachmentUsage) -> &mut Self {
        self.attachments.push(usage);
        self
    }

    pub fn attachment(&self, name: &str) -> Option<&AttachmentUsage> {
        self.attachments.iter().find(|usage| usage.name == name)
    }
}
