use crate::strategy::StrategyId;

/// Options accepted by [`crate::convert`].
///
/// Options arrive from heterogeneous front-ends (CLI flags, form fields, RPC
/// arguments); each front-end parses into this one record.
///
/// # Example
///
/// ```rust
/// use evado_core::ConversionOptions;
///
/// let options = ConversionOptions::builder()
///     .bypass(true)
///     .preserve_images(false)
///     .build();
/// assert!(options.bypass);
/// ```
#[derive(Debug, Clone)]
pub struct ConversionOptions {
    /// Enable tiered strategy racing; when false, only `direct` is tried.
    pub bypass: bool,
    /// Force a single strategy, bypassing the tiered logic.
    pub strategy: Option<StrategyId>,
    /// Keep `<img>` in the Markdown output; else drop images and figures.
    pub preserve_images: bool,
    /// Wrap the output in a JSON envelope.
    pub json_format: bool,
    /// Consult and populate the URL cache.
    pub use_cache: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            bypass: false,
            strategy: None,
            preserve_images: true,
            json_format: false,
            use_cache: true,
        }
    }
}

impl ConversionOptions {
    /// Creates a new builder with default values.
    pub fn builder() -> ConversionOptionsBuilder {
        ConversionOptionsBuilder::new()
    }
}

/// Builder for [`ConversionOptions`].
pub struct ConversionOptionsBuilder {
    options: ConversionOptions,
}

impl ConversionOptionsBuilder {
    pub fn new() -> Self {
        Self { options: ConversionOptions::default() }
    }

    pub fn bypass(mut self, value: bool) -> Self {
        self.options.bypass = value;
        self
    }

    pub fn strategy(mut self, value: StrategyId) -> Self {
        self.options.strategy = Some(value);
        self
    }

    pub fn preserve_images(mut self, value: bool) -> Self {
        self.options.preserve_images = value;
        self
    }

    pub fn json_format(mut self, value: bool) -> Self {
        self.options.json_format = value;
        self
    }

    pub fn use_cache(mut self, value: bool) -> Self {
        self.options.use_cache = value;
        self
    }

    pub fn build(self) -> ConversionOptions {
        self.options
    }
}

impl Default for ConversionOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_defaults() {
        let options = ConversionOptions::default();
        assert!(!options.bypass);
        assert!(options.strategy.is_none());
        assert!(options.preserve_images);
        assert!(!options.json_format);
        assert!(options.use_cache);
    }

    #[test]
    fn test_options_builder() {
        let options = ConversionOptions::builder()
            .bypass(true)
            .strategy(StrategyId::Jina)
            .preserve_images(false)
            .json_format(true)
            .use_cache(false)
            .build();

        assert!(options.bypass);
        assert_eq!(options.strategy, Some(StrategyId::Jina));
        assert!(!options.preserve_images);
        assert!(options.json_format);
        assert!(!options.use_cache);
    }
}
