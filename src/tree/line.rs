/// One physical line after classification.
///
/// The category flags are not exclusive: an exposing line comment is both a
/// line comment and exposed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedLine {
    /// Line number (1-based)
    pub number: usize,
    /// Byte offset of the first non-whitespace character
    pub indent: usize,
    /// Line opens a block comment
    pub block_start: bool,
    /// Line continues a block comment opened earlier
    pub block_line: bool,
    /// Line closes a block comment
    pub block_end: bool,
    /// Line is a line comment
    pub line_comment: bool,
    /// Line is exposed to the pipeline
    pub exposed: bool,
    /// Trimmed payload; empty unless the line is a comment or exposed
    pub value: String,
}

impl ClassifiedLine {
    pub fn is_comment(&self) -> bool {
        self.line_comment || self.block_start || self.block_line || self.block_end
    }

    pub fn is_exposed(&self) -> bool {
        self.exposed
    }

    pub fn is_comment_or_exposed(&self) -> bool {
        self.is_comment() || self.is_exposed()
    }

    /// True while an unterminated block comment is in effect after this line
    pub fn is_block_open(&self) -> bool {
        (self.block_start || self.block_line) && !self.block_end
    }
}
