//! Line-oriented output buffer for generated C.

/// Accumulates generated C source.
///
/// Lines are written exactly as given; generated code carries its own
/// indentation.
#[derive(Debug)]
pub struct CWriter {
    output: String,
}

impl CWriter {
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(16 * 1024),
        }
    }

    /// Write a line followed by a newline.
    pub fn line(&mut self, s: impl AsRef<str>) {
        self.output.push_str(s.as_ref());
        self.output.push('\n');
    }

    /// Write an empty line.
    pub fn newline(&mut self) {
        self.output.push('\n');
    }

    /// Take the generated output.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}

impl Default for CWriter {
    fn default() -> Self {
        Self::new()
    }
}
