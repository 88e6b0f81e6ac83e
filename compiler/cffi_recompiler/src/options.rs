//! Recompiler configuration.

use cffi_model::DataModel;

/// Runtime support header included at the top of every generated file.
pub const DEFAULT_RUNTIME_HEADER: &str = "_cffi_include.h";

/// Settings for one recompilation.
///
/// # Example
///
/// ```
/// use cffi_recompiler::RecompilerOptions;
///
/// let options = RecompilerOptions::new("pkg._example")
///     .with_preamble("#include <math.h>");
/// assert_eq!(options.base_module_name(), "_example");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecompilerOptions {
    /// Full dotted module name passed to the loader.
    pub module_name: String,
    /// C source pasted verbatim before the generated code.
    pub preamble: String,
    /// Header providing the `_cffi_*` runtime helpers.
    pub runtime_header: String,
    /// Target widths, used where a size must be evaluated here rather
    /// than by the C compiler.
    pub data_model: DataModel,
}

impl RecompilerOptions {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            preamble: String::new(),
            runtime_header: DEFAULT_RUNTIME_HEADER.to_owned(),
            data_model: DataModel::default(),
        }
    }

    #[must_use]
    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = preamble.into();
        self
    }

    #[must_use]
    pub fn with_runtime_header(mut self, header: impl Into<String>) -> Self {
        self.runtime_header = header.into();
        self
    }

    #[must_use]
    pub fn with_data_model(mut self, model: DataModel) -> Self {
        self.data_model = model;
        self
    }

    /// Last dotted component of the module name; names the init symbols.
    pub fn base_module_name(&self) -> &str {
        self.module_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.module_name)
    }
}
