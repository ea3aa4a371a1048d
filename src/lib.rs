pub use ash;
pub use attachment::{
    layout_access, layout_stage, AttachmentRole, AttachmentUsage, RoleTraits, StageAccess,
};
pub use config::{ConflictPolicy, ContextConfig, RenderPassConfig, VALIDATION_ENV_VAR};
pub use context::Context;
pub use crate::core::Core;
pub use dependencies::{build_dependencies, build_external_dependencies, SubpassDependency};
pub use device::RenderPassDevice;
pub use error::{Error, Result};
pub use framebuffer::{bind_views, Framebuffer, FramebufferAttachment};
pub use recorder::{PassRecorder, SubpassCursor};
pub use references::{AttachmentReference, SubpassDescription};
pub use registry::{
    AttachmentBinding, AttachmentDescription, AttachmentId, AttachmentRegistry, SubpassBindings,
};
pub use render_pass::{structural_hash, RenderPass, RenderPassDescription};
pub use render_passes::{RenderPassId, RenderPasses};
pub use subpass::Subpass;

mod attachment;
mod config;
mod context;
mod core;
mod dependencies;
mod device;
mod error;
mod framebuffer;
mod recorder;
mod references;
mod registry;
mod render_pass;
mod render_passes;
mod subpass;

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn descriptions_are_shareable() {
        assert_send_sync::<RenderPassDescription>();
        assert_send_sync::<RenderPass>();
        assert_send_sync::<RenderPasses>();
        assert_send_sync::<Framebuffer>();
    }
}
