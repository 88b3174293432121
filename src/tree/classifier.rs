use crate::config::{CommentSyntax, Configuration, EXPOSE_MARKER};

use super::ClassifiedLine;

/// Returns the byte offset of the first non-whitespace character.
///
/// A line made only of whitespace is indented by its full length.
pub fn indent_of(raw: &str) -> usize {
    raw.char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(i, _)| i)
        .unwrap_or(raw.len())
}

/// Classifies raw lines using the configured comment markers.
///
/// The classification of the previous line (the cursor) decides whether a
/// plain line continues an open block comment or inherits exposure.
pub struct LineClassifier<'a> {
    syntax: &'a CommentSyntax,
    expose: bool,
}

impl<'a> LineClassifier<'a> {
    pub fn new(config: &'a Configuration) -> Self {
        Self {
            syntax: &config.comment,
            expose: config.expose,
        }
    }

    /// Classifies one line. Never fails; the returned line number is left at 0
    /// for the tree builder to assign.
    pub fn classify(&self, cursor: Option<&ClassifiedLine>, raw: &str) -> ClassifiedLine {
        let indent = indent_of(raw);
        let mut line = ClassifiedLine {
            indent,
            ..Default::default()
        };
        let mut rest = &raw[indent..];

        let block = self.syntax.block.as_ref();
        let line_marker = self.syntax.line.as_deref();

        // First match wins: an opening line keeps any trailing end marker
        if let Some(stripped) = block.and_then(|b| rest.strip_prefix(b.start.as_str())) {
            line.block_start = true;
            rest = stripped;
        } else if let Some(stripped) = block.and_then(|b| rest.strip_suffix(b.end.as_str())) {
            line.block_end = true;
            rest = stripped;
        } else if let Some(stripped) = line_marker.and_then(|m| rest.strip_prefix(m)) {
            line.line_comment = true;
            rest = stripped;
            if self.expose {
                if let Some(stripped) = rest.strip_suffix(EXPOSE_MARKER) {
                    line.exposed = true;
                    rest = stripped;
                }
            }
        } else if let Some(cursor) = cursor {
            line.block_line = cursor.is_block_open();
            line.exposed = !line.block_line && cursor.exposed;
        }

        if line.is_comment_or_exposed() {
            line.value = rest.trim().to_string();
        }

        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_all(config: &Configuration, lines: &[&str]) -> Vec<ClassifiedLine> {
        let classifier = LineClassifier::new(config);
        let mut out: Vec<ClassifiedLine> = Vec::new();
        for raw in lines {
            let line = classifier.classify(out.last(), raw);
            out.push(line);
        }
        out
    }

    fn c_style() -> Configuration {
        Configuration::new(CommentSyntax::c_style())
    }

    #[test]
    fn test_indent_of() {
        assert_eq!(indent_of("code"), 0);
        assert_eq!(indent_of("    code"), 4);
        assert_eq!(indent_of("\tcode"), 1);
        assert_eq!(indent_of(""), 0);
    }

    #[test]
    fn test_whitespace_only_line_indent_is_full_length() {
        assert_eq!(indent_of("   "), 3);
        assert_eq!(indent_of("\t\t"), 2);
    }

    #[test]
    fn test_line_comment_between_code() {
        let lines = classify_all(&c_style(), &["code", "// hello", "more code"]);

        assert!(!lines[0].is_comment_or_exposed());
        assert_eq!(lines[0].value, "");

        assert!(lines[1].line_comment);
        assert!(!lines[1].exposed);
        assert_eq!(lines[1].value, "hello");

        assert!(!lines[2].is_comment_or_exposed());
        assert_eq!(lines[2].value, "");
    }

    #[test]
    fn test_expose_is_sticky() {
        let config = c_style().with_expose(true);
        let lines = classify_all(&config, &["// show >", "code_after", "  more_after"]);

        assert!(lines[0].line_comment);
        assert!(lines[0].exposed);
        assert_eq!(lines[0].value, "show");

        assert!(!lines[1].is_comment());
        assert!(lines[1].exposed);
        assert_eq!(lines[1].value, "code_after");

        assert!(lines[2].exposed);
        assert_eq!(lines[2].value, "more_after");
    }

    #[test]
    fn test_comment_line_resets_expose() {
        let config = c_style().with_expose(true);
        let lines = classify_all(&config, &["// show >", "exposed", "// plain", "hidden"]);

        assert!(lines[1].exposed);
        assert!(!lines[2].exposed);
        assert!(!lines[3].exposed);
        assert_eq!(lines[3].value, "");
    }

    #[test]
    fn test_expose_marker_ignored_when_disabled() {
        let lines = classify_all(&c_style(), &["// show >", "code_after"]);

        assert!(!lines[0].exposed);
        assert_eq!(lines[0].value, "show >");
        assert!(!lines[1].exposed);
    }

    #[test]
    fn test_block_comment_continues_until_end() {
        let lines = classify_all(
            &c_style(),
            &["/* start", "  middle", "  end */", "code"],
        );

        assert!(lines[0].block_start);
        assert_eq!(lines[0].value, "start");

        assert!(lines[1].block_line);
        assert_eq!(lines[1].value, "middle");

        assert!(lines[2].block_end);
        assert!(!lines[2].block_line);
        assert_eq!(lines[2].value, "end");

        assert!(!lines[3].is_comment());
    }

    #[test]
    fn test_block_start_strips_prefix_only() {
        let lines = classify_all(&c_style(), &["/* .route /users */", "code", "*/"]);

        assert!(lines[0].block_start);
        assert!(!lines[0].block_end);
        assert_eq!(lines[0].value, ".route /users */");

        assert!(lines[1].block_line);
        assert_eq!(lines[1].value, "code");

        assert!(lines[2].block_end);
        assert!(!lines[2].block_line);
    }

    #[test]
    fn test_stray_block_end_is_comment() {
        let lines = classify_all(&c_style(), &["code", "trailing */"]);

        assert!(lines[1].block_end);
        assert_eq!(lines[1].value, "trailing");
    }

    #[test]
    fn test_block_start_wins_over_line_marker() {
        let config = Configuration::new(CommentSyntax::new(Some("--"), Some(("--[[", "]]"))));
        let lines = classify_all(&config, &["--[[ doc", "body", "]]"]);

        assert!(lines[0].block_start);
        assert!(!lines[0].line_comment);
        assert!(lines[1].block_line);
        assert!(lines[2].block_end);
        assert_eq!(lines[2].value, "");
    }

    #[test]
    fn test_block_continuation_is_not_exposed() {
        let config = c_style().with_expose(true);
        let lines = classify_all(&config, &["// a >", "/* b", "c"]);

        assert!(lines[1].block_start);
        assert!(!lines[1].exposed);
        assert!(lines[2].block_line);
        assert!(!lines[2].exposed);
    }

    #[test]
    fn test_indent_is_recorded_and_stripped() {
        let lines = classify_all(&c_style(), &["    //   indented   "]);

        assert_eq!(lines[0].indent, 4);
        assert_eq!(lines[0].value, "indented");
    }

    #[test]
    fn test_missing_markers_never_match() {
        let config = Configuration::new(CommentSyntax::new(Some("#"), None));
        let lines = classify_all(&config, &["/* not a comment", "*/", "# yes"]);

        assert!(!lines[0].is_comment());
        assert!(!lines[1].is_comment());
        assert!(lines[2].line_comment);
    }

    #[test]
    fn test_first_line_without_cursor() {
        let config = c_style();
        let classifier = LineClassifier::new(&config);
        let line = classifier.classify(None, "plain");

        assert!(!line.is_comment_or_exposed());
        assert_eq!(line.number, 0);
    }
}
