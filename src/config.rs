/// What to do when two subpasses declare the same attachment name with different formats or
/// sample counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Fail construction with [`crate::Error::ConflictingAttachmentDefinition`].
    #[default]
    Reject,
    /// Keep the first definition and log a warning.
    KeepFirst,
}

/// Knobs for render pass synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPassConfig {
    pub conflict_policy: ConflictPolicy,
    /// Also synthesize `VK_SUBPASS_EXTERNAL` dependencies for the first use of each attachment.
    /// Off by default: initial transitions are expected to be recorded by the caller.
    pub external_dependencies: bool,
    /// Appended to the pass name to form the debug label of the Vulkan object.
    pub label_suffix: String,
}

impl Default for RenderPassConfig {
    fn default() -> Self {
        Self {
            conflict_policy: ConflictPolicy::default(),
            external_dependencies: false,
            label_suffix: " RenderPass".into(),
        }
    }
}

impl RenderPassConfig {
    pub fn with_conflict_policy(mut self, conflict_policy: ConflictPolicy) -> Self {
        self.conflict_policy = conflict_policy;
        self
    }

    pub fn with_external_dependencies(mut self, external_dependencies: bool) -> Self {
        self.external_dependencies = external_dependencies;
        self
    }

    pub fn with_label_suffix(mut self, label_suffix: impl Into<String>) -> Self {
        self.label_suffix = label_suffix.into();
        self
    }

    pub(crate) fn label(&self, name: &str) -> String {
        format!("{name}{}", self.label_suffix)
    }
}

pub const VALIDATION_ENV_VAR: &str = "LAZY_RENDERPASS_VALIDATION";

/// Knobs for bootstrapping a headless [`crate::Context`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextConfig {
    pub application_name: String,
    /// Enable `VK_LAYER_KHRONOS_validation`.
    pub validation: bool,
    /// Enable `VK_EXT_debug_utils` so render passes and framebuffers get debug labels.
    pub debug_utils: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            application_name: "Lazy Renderpass".into(),
            validation: false,
            debug_utils: cfg!(debug_assertions),
        }
    }
}

impl ContextConfig {
    /// The default config, with validation switched on when `LAZY_RENDERPASS_VALIDATION` is set
    /// to anything other than `0`, `false` or an empty string.
    pub fn from_env() -> Self {
        let validation = std::env::var(VALIDATION_ENV_VAR)
            .map(|value| parse_flag(&value))
            .unwrap_or(false);
        Self::default().with_validation(validation)
    }

    pub fn with_application_name(mut self, application_name: impl Into<String>) -> Self {
        self.application_name = application_name.into();
        self
    }

    pub fn with_validation(mut self, validation: bool) -> Self {
        self.validation = validation;
        // Validation messages are much less useful without object names.
        self.debug_utils |= validation;
        self
    }

    pub fn with_debug_utils(mut self, debug_utils: bool) -> Self {
        self.debug_utils = debug_utils;
        self
    }
}

fn parse_flag(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty() || value == "0" || value.eq_ignore_ascii_case("false"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_pass_defaults() {
        let config = RenderPassConfig::default();
        assert_eq!(config.conflict_policy, ConflictPolicy::Reject);
        assert!(!config.external_dependencies);
        assert_eq!(config.label("gbuffer"), "gbuffer RenderPass");
        assert_eq!(
            config.with_label_suffix("").label("gbuffer"),
            "gbuffer"
        );
    }

    #[test]
    fn validation_implies_debug_utils() {
        let config = ContextConfig::default()
            .with_debug_utils(false)
            .with_validation(true);
        assert!(config.validation);
        assert!(config.debug_utils);
    }

    #[test]
    fn flag_parsing() {
        assert!(parse_flag("1"));
        assert!(parse_flag("yes"));
        assert!(!parse_flag(""));
        assert!(!parse_flag(" 0 "));
        assert!(!parse_flag("FALSE"));
    }
}
