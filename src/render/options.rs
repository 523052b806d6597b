//! Rendering options.

/// Options for rendering pages as Markdown.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Prefix for image paths in output (e.g., "./images/").
    /// When unset, paths are the image directory joined with the file name.
    pub image_path_prefix: Option<String>,

    /// Wrap bold runs of paragraphs in `**`
    pub bold_emphasis: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the image path prefix.
    pub fn with_image_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.image_path_prefix = Some(prefix.into());
        self
    }

    /// Enable or disable bold emphasis.
    pub fn with_bold_emphasis(mut self, enabled: bool) -> Self {
        self.bold_emphasis = enabled;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            image_path_prefix: None,
            bold_emphasis: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_builder() {
        let opts = RenderOptions::new()
            .with_image_prefix("assets/")
            .with_bold_emphasis(false);

        assert_eq!(opts.image_path_prefix.as_deref(), Some("assets/"));
        assert!(!opts.bold_emphasis);
    }

    #[test]
    fn test_render_options_default() {
        let opts = RenderOptions::default();
        assert!(opts.image_path_prefix.is_none());
        assert!(opts.bold_emphasis);
    }
}
