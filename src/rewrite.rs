//! Find/replace pass over retained line values.

use regex::Regex;

use crate::config::RewriteRule;
use crate::error::{EmitsError, Result};
use crate::tree::Tree;

/// A rewrite rule with its pattern compiled
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub pattern: Regex,
    pub replace: String,
}

/// Ordered set of compiled rewrite rules
#[derive(Debug, Clone, Default)]
pub struct Rewriter {
    rules: Vec<CompiledRule>,
}

impl Rewriter {
    /// Compiles every pattern up front. All failures are reported together.
    pub fn compile(rules: &[RewriteRule]) -> Result<Self> {
        let mut compiled = Vec::with_capacity(rules.len());
        let mut errors = Vec::new();

        for (i, rule) in rules.iter().enumerate() {
            match Regex::new(&rule.find) {
                Ok(pattern) => compiled.push(CompiledRule {
                    pattern,
                    replace: rule.replace.clone(),
                }),
                Err(e) => errors.push(format!("rule {} ({:?}): {}", i + 1, rule.find, e)),
            }
        }

        if !errors.is_empty() {
            return Err(EmitsError::Config(format!(
                "Could not compile rewrite patterns: {}",
                errors.join("; ")
            )));
        }

        Ok(Self { rules: compiled })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Applies every rule in order to one value
    pub fn rewrite_value(&self, value: &str) -> String {
        self.rules.iter().fold(value.to_string(), |acc, rule| {
            rule.pattern
                .replace_all(&acc, rule.replace.as_str())
                .into_owned()
        })
    }

    /// Rewrites every non-empty value in pre-order; the tree shape is untouched
    pub fn apply(&self, tree: &mut Tree) {
        if self.rules.is_empty() {
            return;
        }
        tree.for_each_mut(|node| {
            if !node.line.value.is_empty() {
                node.line.value = self.rewrite_value(&node.line.value);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CommentSyntax, Configuration};
    use crate::tree::{parse, prune};

    fn sample_tree() -> Tree {
        let config = Configuration::new(CommentSyntax::c_style());
        prune(parse("// hello world\ncode\n  // TODO: hello again", &config))
    }

    #[test]
    fn test_empty_rules_are_noop() {
        let rewriter = Rewriter::compile(&[]).unwrap();
        let mut tree = sample_tree();
        let before = tree.clone();

        rewriter.apply(&mut tree);

        assert!(rewriter.is_empty());
        assert_eq!(tree, before);
    }

    #[test]
    fn test_rules_apply_in_sequence() {
        let rewriter = Rewriter::compile(&[
            RewriteRule::new("hello", "hi"),
            RewriteRule::new("hi", "hey"),
        ])
        .unwrap();

        assert_eq!(rewriter.rewrite_value("hello there"), "hey there");
    }

    #[test]
    fn test_capture_group_templates() {
        let rewriter =
            Rewriter::compile(&[RewriteRule::new(r"TODO:\s*(?P<rest>.*)", ".todo ${rest}")]).unwrap();

        assert_eq!(rewriter.rewrite_value("TODO: fix it"), ".todo fix it");
    }

    #[test]
    fn test_apply_skips_structural_values() {
        let rewriter = Rewriter::compile(&[RewriteRule::new("^$", "filled")]).unwrap();
        let mut tree = sample_tree();

        rewriter.apply(&mut tree);

        let values: Vec<_> = tree.iter().map(|n| n.value().to_string()).collect();
        assert_eq!(values, vec!["hello world", "", "TODO: hello again"]);
    }

    #[test]
    fn test_apply_rewrites_nested_values() {
        let rewriter = Rewriter::compile(&[RewriteRule::new("hello", "bye")]).unwrap();
        let mut tree = sample_tree();

        rewriter.apply(&mut tree);

        let values: Vec<_> = tree.iter().map(|n| n.value().to_string()).collect();
        assert_eq!(values, vec!["bye world", "", "TODO: bye again"]);
        assert_eq!(tree.line_numbers(), vec![1, 2, 3]);
    }

    #[test]
    fn test_compile_reports_every_bad_pattern() {
        let err = Rewriter::compile(&[
            RewriteRule::new("(unclosed", ""),
            RewriteRule::new("fine", ""),
            RewriteRule::new("[bad", ""),
        ])
        .unwrap_err();

        let message = err.to_string();
        assert!(matches!(err, EmitsError::Config(_)));
        assert!(message.contains("rule 1"));
        assert!(message.contains("rule 3"));
        assert!(!message.contains("rule 2"));
    }
}
