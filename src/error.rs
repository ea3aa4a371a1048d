use ash::vk;
use thiserror::Error;

/// Everything that can go wrong while building, realizing or recording a render pass.
#[derive(Error, Debug)]
pub enum Error {
    #[error(
        "render pass `{pass}`: attachment `{attachment}` in subpass {subpass} is declared as \
         {found_format:?} x{found_samples:?}, but was first declared as \
         {expected_format:?} x{expected_samples:?}"
    )]
    ConflictingAttachmentDefinition {
        pass: String,
        subpass: usize,
        attachment: String,
        expected_format: vk::Format,
        expected_samples: vk::SampleCountFlags,
        found_format: vk::Format,
        found_samples: vk::SampleCountFlags,
    },
    #[error("render pass `{pass}`: unknown attachment `{attachment}`{}", at_subpass(.subpass))]
    UnknownAttachmentName {
        pass: String,
        subpass: Option<usize>,
        attachment: String,
    },
    #[error(
        "render pass `{pass}`: subpass {subpass} has {color} color attachments but {resolve} \
         resolve attachments"
    )]
    MismatchedResolveAttachments {
        pass: String,
        subpass: usize,
        color: usize,
        resolve: usize,
    },
    #[error("failed to create render pass `{pass}`: {source}")]
    RenderPassCreationFailed {
        pass: String,
        #[source]
        source: vk::Result,
    },
    #[error("failed to create framebuffer `{framebuffer}`: {source}")]
    FramebufferCreationFailed {
        framebuffer: String,
        #[source]
        source: vk::Result,
    },
    #[error("framebuffer `{framebuffer}` has no image view for attachment `{attachment}`")]
    MissingFramebufferAttachment {
        framebuffer: String,
        attachment: String,
    },
    #[error("framebuffer `{framebuffer}` would have a zero width or height")]
    ZeroSizedFramebuffer { framebuffer: String },
    #[error("framebuffer `{framebuffer}` was not created for render pass `{pass}`")]
    IncompatibleFramebuffer { framebuffer: String, pass: String },
    #[error("render pass has already been destroyed")]
    StaleRenderPass,
    #[error("render pass `{pass}` has no subpass after the last of its {count} subpasses")]
    SubpassOutOfRange { pass: String, count: usize },
    #[error("render pass `{pass}` ended after {recorded} of its {count} subpasses")]
    UnfinishedSubpasses {
        pass: String,
        recorded: usize,
        count: usize,
    },
    #[error("failed to load Vulkan: {0}")]
    Loading(#[from] ash::LoadingError),
    #[error("no physical device with a graphics queue and the required Vulkan version")]
    NoSuitableDevice,
    #[error("Vulkan error: {0}")]
    Vulkan(#[from] vk::Result),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

fn at_subpass(subpass: &Option<usize>) -> String {
    match subpass {
        Some(index) => format!(" in subpass {index}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_pass_and_attachment() {
        let error = Error::UnknownAttachmentName {
            pass: "lighting".into(),
            subpass: Some(2),
            attachment: "albedo".into(),
        };
        assert_eq!(
            error.to_string(),
            "render pass `lighting`: unknown attachment `albedo` in subpass 2"
        );

        let error = Error::UnknownAttachmentName {
            pass: "lighting".into(),
            subpass: None,
            attachment: "albedo".into(),
        };
        assert_eq!(
            error.to_string(),
            "render pass `lighting`: unknown attachment `albedo`"
        );
    }

    #[test]
    fn creation_failure_keeps_the_backend_error_as_source() {
        let error = Error::RenderPassCreationFailed {
            pass: "shadow".into(),
            source: vk::Result::ERROR_OUT_OF_DEVICE_MEMORY,
        };
        let source = std::error::Error::source(&error).map(|s| s.to_string());
        assert_eq!(
            source,
            Some(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY.to_string())
        );
        assert!(error.to_string().contains("shadow"));
    }
}
