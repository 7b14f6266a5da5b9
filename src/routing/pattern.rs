//! Path template compilation.
//!
//! # Grammar
//! ```text
//! template := "/" item*
//! item     := wildcard | variable | literal
//! wildcard := "*"+                      binds `wildcard`, may match nothing
//! variable := "/:" [A-Za-z0-9_]+        binds one non-empty path segment
//! literal  := any char except ' ', ':' and '*'
//! ```
//!
//! # Rules
//! - At most one wildcard per template
//! - Variable names are unique and may not be `wildcard` (any case)
//! - A wildcard may not directly follow a variable (`/:id*`)
//! - Every pattern accepts one optional trailing `/`; a trailing `/` in the
//!   template itself is folded into that rule
//!
//! # Design Decisions
//! - No regex engine: templates compile to a token list walked by a small
//!   backtracking matcher
//! - Captures are greedy; the first successful assignment wins

use std::collections::BTreeMap;
use thiserror::Error;

/// Name bound by the wildcard token.
pub const WILDCARD: &str = "wildcard";

/// Parameters captured by a successful match.
///
/// Variables always bind `Some`. The wildcard binds `None` when it matched
/// nothing.
pub type Params = BTreeMap<String, Option<String>>;

/// Reasons a path template is rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("path template is empty")]
    Empty,

    #[error("path must begin with /")]
    MissingLeadingSlash,

    #[error("invalid path segment contains unexpected character {ch:?} at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },

    #[error("wildcard * used more than once")]
    MultipleWildcards,

    #[error("path variable {0:?} used more than once")]
    DuplicateVariable(String),

    #[error("path variable name :{0} is reserved")]
    ReservedVariable(String),

    #[error("path variable :{0} cannot be followed by a wildcard *")]
    WildcardAfterVariable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Variable(String),
    Wildcard,
}

/// A compiled, anchored path matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    template: String,
    tokens: Vec<Token>,
    param_names: Vec<String>,
}

impl PathPattern {
    /// Compile a path template.
    pub fn compile(template: &str) -> Result<Self, PatternError> {
        if template.is_empty() {
            return Err(PatternError::Empty);
        }
        if !template.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash);
        }

        let mut tokens: Vec<Token> = Vec::new();
        let mut literal = String::new();
        let mut param_names: Vec<String> = Vec::new();
        let mut wildcard_used = false;
        let mut pos = 0;

        while pos < template.len() {
            let rest = &template[pos..];

            if rest.starts_with('*') {
                if literal.is_empty() {
                    if let Some(Token::Variable(name)) = tokens.last() {
                        return Err(PatternError::WildcardAfterVariable(name.clone()));
                    }
                }
                if wildcard_used {
                    return Err(PatternError::MultipleWildcards);
                }
                flush_literal(&mut literal, &mut tokens);
                tokens.push(Token::Wildcard);
                param_names.push(WILDCARD.to_string());
                wildcard_used = true;
                pos += rest.bytes().take_while(|&b| b == b'*').count();
                continue;
            }

            if let Some(name) = variable_name(rest) {
                if name.eq_ignore_ascii_case(WILDCARD) {
                    return Err(PatternError::ReservedVariable(name.to_string()));
                }
                if param_names.iter().any(|n| n == name) {
                    return Err(PatternError::DuplicateVariable(name.to_string()));
                }
                flush_literal(&mut literal, &mut tokens);
                tokens.push(Token::Variable(name.to_string()));
                param_names.push(name.to_string());
                pos += 2 + name.len();
                continue;
            }

            let Some(ch) = rest.chars().next() else {
                break;
            };
            if matches!(ch, ' ' | ':' | '*') {
                return Err(PatternError::UnexpectedCharacter { ch, position: pos });
            }
            let is_trailing_slash = ch == '/' && pos + 1 == template.len();
            if !is_trailing_slash {
                literal.push(ch);
            }
            pos += ch.len_utf8();
        }
        flush_literal(&mut literal, &mut tokens);

        Ok(Self {
            template: template.to_string(),
            tokens,
            param_names,
        })
    }

    /// The source template this pattern was compiled from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Names this pattern can bind, in template order.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Match a request path, returning the bound parameters.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let mut captures = Vec::with_capacity(self.param_names.len());
        if match_tokens(&self.tokens, path, &mut captures) {
            Some(
                captures
                    .into_iter()
                    .map(|(name, value)| (name.to_string(), value.map(str::to_string)))
                    .collect(),
            )
        } else {
            None
        }
    }
}

fn flush_literal(literal: &mut String, tokens: &mut Vec<Token>) {
    if !literal.is_empty() {
        tokens.push(Token::Literal(std::mem::take(literal)));
    }
}

/// Returns the name of a `/:name` token at the start of `input`.
fn variable_name(input: &str) -> Option<&str> {
    let body = input.strip_prefix("/:")?;
    let len = body
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    (len > 0).then(|| &body[..len])
}

fn is_segment_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'-' | b'.' | b'_' | b'~' | b'(' | b')' | b'\'' | b'!' | b'*' | b':' | b'@' | b',' | b';'
        )
}

fn is_wildcard_byte(b: u8) -> bool {
    b == b'/' || is_segment_byte(b)
}

fn allowed_run(input: &str, allowed: fn(u8) -> bool) -> usize {
    input.bytes().take_while(|&b| allowed(b)).count()
}

fn match_tokens<'t, 'p>(
    tokens: &'t [Token],
    path: &'p str,
    captures: &mut Vec<(&'t str, Option<&'p str>)>,
) -> bool {
    let Some((token, remaining)) = tokens.split_first() else {
        return path.is_empty() || path == "/";
    };

    match token {
        Token::Literal(literal) => path
            .strip_prefix(literal.as_str())
            .is_some_and(|rest| match_tokens(remaining, rest, captures)),
        Token::Variable(name) => {
            let Some(segment) = path.strip_prefix('/') else {
                return false;
            };
            let run = allowed_run(segment, is_segment_byte);
            for len in (1..=run).rev() {
                captures.push((name.as_str(), Some(&segment[..len])));
                if match_tokens(remaining, &segment[len..], captures) {
                    return true;
                }
                captures.pop();
            }
            false
        }
        Token::Wildcard => {
            let run = allowed_run(path, is_wildcard_byte);
            for len in (1..=run).rev() {
                captures.push((WILDCARD, Some(&path[..len])));
                if match_tokens(remaining, &path[len..], captures) {
                    return true;
                }
                captures.pop();
            }
            captures.push((WILDCARD, None));
            if match_tokens(remaining, path, captures) {
                return true;
            }
            captures.pop();
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, Option<&str>)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
            .collect()
    }

    fn some(pairs: &[(&str, &str)]) -> Option<Params> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), Some(v.to_string())))
                .collect(),
        )
    }

    const PATHS: [&str; 4] = ["/source/page/50", "/random/", "/", "/r1/page/r2"];

    fn assert_matches(template: &str, expected: [Option<Params>; 4]) {
        let pattern = PathPattern::compile(template).unwrap();
        for (path, want) in PATHS.iter().zip(expected) {
            assert_eq!(pattern.matches(path), want, "template {template} against {path}");
        }
    }

    #[test]
    fn test_literal_templates() {
        assert_matches("/source/page/50/", [some(&[]), None, None, None]);
        assert_matches("/source", [None, None, None, None]);
        assert_matches("/some/other/path", [None, None, None, None]);
    }

    #[test]
    fn test_variable_templates() {
        assert_matches("/:a", [None, some(&[("a", "random")]), None, None]);
        assert_matches("/source/page/:c/", [some(&[("c", "50")]), None, None, None]);
        assert_matches(
            "/:a/page/:c",
            [
                some(&[("a", "source"), ("c", "50")]),
                None,
                None,
                some(&[("a", "r1"), ("c", "r2")]),
            ],
        );
        assert_matches(
            "/:a/:b/:c",
            [
                some(&[("a", "source"), ("b", "page"), ("c", "50")]),
                None,
                None,
                some(&[("a", "r1"), ("b", "page"), ("c", "r2")]),
            ],
        );
        assert_matches("/:a/something/:c", [None, None, None, None]);
        assert_matches("/:a/:b/:c/:d", [None, None, None, None]);
    }

    #[test]
    fn test_wildcard_templates() {
        assert_matches(
            "/*",
            [
                some(&[("wildcard", "source/page/50")]),
                some(&[("wildcard", "random/")]),
                Some(params(&[("wildcard", None)])),
                some(&[("wildcard", "r1/page/r2")]),
            ],
        );
        assert_matches("/source/pa*", [some(&[("wildcard", "ge/50")]), None, None, None]);
        assert_matches("/source/pag*", [some(&[("wildcard", "e/50")]), None, None, None]);
        assert_matches("/nomatch*", [None, None, None, None]);
    }

    #[test]
    fn test_mixed_templates() {
        assert_matches(
            "/:from/*",
            [
                some(&[("from", "source"), ("wildcard", "page/50")]),
                Some(params(&[("from", Some("random")), ("wildcard", None)])),
                None,
                some(&[("from", "r1"), ("wildcard", "page/r2")]),
            ],
        );
        assert_matches(
            "/:from/*/:id",
            [
                some(&[("from", "source"), ("wildcard", "page"), ("id", "50")]),
                None,
                None,
                some(&[("from", "r1"), ("wildcard", "page"), ("id", "r2")]),
            ],
        );
        assert_matches(
            "/*/:c",
            [
                some(&[("wildcard", "source/page"), ("c", "50")]),
                None,
                None,
                some(&[("wildcard", "r1/page"), ("c", "r2")]),
            ],
        );
    }

    #[test]
    fn test_malformed_templates() {
        let cases = [
            ("/:from/*/:id/*/:var", PatternError::MultipleWildcards),
            ("/*/*", PatternError::MultipleWildcards),
            ("/:from*/", PatternError::WildcardAfterVariable("from".into())),
            ("/:a/:b/:a", PatternError::DuplicateVariable("a".into())),
            ("/:wildcard", PatternError::ReservedVariable("wildcard".into())),
            ("/:WildCard", PatternError::ReservedVariable("WildCard".into())),
            ("path_wild_no_forward_slash", PatternError::MissingLeadingSlash),
            (":path_var_with_no_forward_slash", PatternError::MissingLeadingSlash),
            ("*/:b/50/", PatternError::MissingLeadingSlash),
            ("", PatternError::Empty),
            ("/a b", PatternError::UnexpectedCharacter { ch: ' ', position: 2 }),
            ("/a:b", PatternError::UnexpectedCharacter { ch: ':', position: 2 }),
            ("/:", PatternError::UnexpectedCharacter { ch: ':', position: 1 }),
        ];
        for (template, expected) in cases {
            assert_eq!(PathPattern::compile(template), Err(expected), "template {template:?}");
        }
    }

    #[test]
    fn test_wildcard_run_is_one_token() {
        let pattern = PathPattern::compile("/files/***").unwrap();
        assert_eq!(pattern.param_names(), ["wildcard"]);
        assert_eq!(pattern.matches("/files/a/b.txt"), some(&[("wildcard", "a/b.txt")]));
    }

    #[test]
    fn test_variable_then_literal_suffix() {
        let pattern = PathPattern::compile("/users/:id.json").unwrap();
        assert_eq!(pattern.matches("/users/a.b.json"), some(&[("id", "a.b")]));
        assert_eq!(pattern.matches("/users/.json"), None);
    }

    #[test]
    fn test_rejects_characters_outside_allow_list() {
        let pattern = PathPattern::compile("/:id").unwrap();
        assert_eq!(pattern.matches("/a%20b"), None);
        assert_eq!(pattern.matches("/a/b"), None);

        let pattern = PathPattern::compile("/*").unwrap();
        assert_eq!(pattern.matches("/a?b"), None);
    }

    #[test]
    fn test_root_template() {
        let pattern = PathPattern::compile("/").unwrap();
        assert_eq!(pattern.matches("/"), some(&[]));
        assert_eq!(pattern.matches("/x"), None);
    }

    #[test]
    fn test_substituted_paths_round_trip() {
        let cases: [(&str, &str, &[(&str, &str)]); 4] = [
            ("/api/:version/users/:user_id", "/api/v2/users/u-42", &[("version", "v2"), ("user_id", "u-42")]),
            ("/static/*", "/static/css/site.css", &[("wildcard", "css/site.css")]),
            ("/:tenant/*/:leaf/", "/acme/a/b/c/", &[("tenant", "acme"), ("wildcard", "a/b"), ("leaf", "c")]),
            ("/hooks/:name", "/hooks/on_push", &[("name", "on_push")]),
        ];
        for (template, path, expected) in cases {
            let pattern = PathPattern::compile(template).unwrap();
            assert_eq!(pattern.matches(path), some(expected), "template {template}");
        }
    }

    #[test]
    fn test_compile_is_deterministic() {
        let a = PathPattern::compile("/:from/*/:id").unwrap();
        let b = PathPattern::compile("/:from/*/:id").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.param_names(), ["from", "wildcard", "id"]);
        assert_eq!(a.template(), "/:from/*/:id");
    }
}
