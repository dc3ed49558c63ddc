//! Include-guard detection and prefixing.
//!
//! A guard pair is an `#ifndef NAME` line immediately followed by a
//! `#define NAME` line. Only the first pair in document order is ever
//! considered; everything here is a pure text transform.
//!
//! # Example
//!
//! ```
//! use headerguard::guard::GuardRewriter;
//!
//! let rewriter = GuardRewriter::new("VEGAFEM").unwrap();
//! let rewrite = rewriter.rewrite("#ifndef _OBJMESH_H_\n#define _OBJMESH_H_\n");
//!
//! assert_eq!(
//!     rewrite.content,
//!     "#ifndef VEGAFEM_OBJMESH_H\n#define VEGAFEM_OBJMESH_H\n"
//! );
//! ```

use std::borrow::Cow;
use std::fmt;
use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::trace;

use crate::error::{Error, Result};

/// `#ifndef` line, line break, `#define` line, line break. Trailing blanks on
/// either line are tolerated and dropped when the line is rewritten.
const GUARD_PAIR_PATTERN: &str = concat!(
    r"(?P<ifndef>#ifndef[ \t]*(?P<guard>\w*))[ \t]*(?P<ifndef_eol>\r?\n)",
    r"(?P<define>#define[ \t]*(?P<macro>\w*))[ \t]*(?P<define_eol>\r?\n)",
);

fn guard_pair_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(GUARD_PAIR_PATTERN).expect("Invalid guard pair pattern"))
}

/// Which line of a guard pair a change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Directive {
    /// The `#ifndef NAME` line.
    Ifndef,
    /// The `#define NAME` line.
    Define,
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ifndef => write!(f, "#ifndef"),
            Self::Define => write!(f, "#define"),
        }
    }
}

/// The first include-guard pair located in a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardPair<'a> {
    /// Byte range of both lines, terminators included.
    pub span: Range<usize>,
    /// The `#ifndef` line without trailing blanks or terminator.
    pub ifndef_line: &'a str,
    /// Macro token tested by `#ifndef`.
    pub guard_token: &'a str,
    /// The `#define` line without trailing blanks or terminator.
    pub define_line: &'a str,
    /// Macro token defined by `#define`.
    pub define_token: &'a str,
    ifndef_eol: &'a str,
    define_eol: &'a str,
}

/// One guard line renamed in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuardChange {
    /// Which line was rewritten.
    pub directive: Directive,
    /// Token before the rewrite.
    pub from: String,
    /// Token after the rewrite.
    pub to: String,
}

impl fmt::Display for GuardChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.directive, self.from, self.to)
    }
}

/// Result of rewriting one file's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// The rewritten text (identical to the input when nothing changed).
    pub content: String,
    /// Lines that were renamed, in the order they were applied.
    pub changes: Vec<GuardChange>,
}

impl Rewrite {
    /// Whether the content differs from the input.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// Strip the leading and trailing underscores of a guard token.
#[must_use]
pub fn guard_name(token: &str) -> &str {
    token.trim_start_matches('_').trim_end_matches('_')
}

/// Check that `tag` can prefix a C preprocessor macro name.
///
/// # Errors
///
/// Returns [`Error::InvalidTag`] describing the first violated rule.
pub fn validate_tag(tag: &str) -> Result<()> {
    let Some(first) = tag.chars().next() else {
        return Err(Error::invalid_tag(tag, "must not be empty"));
    };
    if first.is_ascii_digit() {
        return Err(Error::invalid_tag(tag, "must not start with a digit"));
    }
    if !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(Error::invalid_tag(
            tag,
            "must contain only ASCII letters, digits and underscores",
        ));
    }
    if tag.ends_with('_') {
        return Err(Error::invalid_tag(
            tag,
            "must not end with an underscore (one is added)",
        ));
    }
    Ok(())
}

/// Prefixes the first include guard of a header with a project tag.
#[derive(Debug, Clone)]
pub struct GuardRewriter {
    tag: String,
    prefix: String,
}

impl GuardRewriter {
    /// Create a rewriter for `tag`; macro names become `<tag>_<name>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag is not a valid macro prefix.
    pub fn new(tag: impl Into<String>) -> Result<Self> {
        let tag = tag.into();
        validate_tag(&tag)?;
        let prefix = format!("{tag}_");
        Ok(Self { tag, prefix })
    }

    /// The project tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Whether a token already carries the project prefix.
    #[must_use]
    pub fn is_tagged(&self, token: &str) -> bool {
        token.starts_with(&self.prefix)
    }

    /// Locate the first guard pair in `text`, tagged or not.
    #[must_use]
    pub fn find_guard<'a>(&self, text: &'a str) -> Option<GuardPair<'a>> {
        let caps = guard_pair_regex().captures(text)?;
        let whole = caps.get(0)?;
        let blanks: &[char] = &[' ', '\t'];
        Some(GuardPair {
            span: whole.range(),
            ifndef_line: caps.name("ifndef")?.as_str().trim_end_matches(blanks),
            guard_token: caps.name("guard")?.as_str(),
            ifndef_eol: caps.name("ifndef_eol")?.as_str(),
            define_line: caps.name("define")?.as_str().trim_end_matches(blanks),
            define_token: caps.name("macro")?.as_str(),
            define_eol: caps.name("define_eol")?.as_str(),
        })
    }

    /// Prefix the `#ifndef` token of the first guard pair.
    ///
    /// The `#define` line is kept as is, minus trailing blanks.
    #[must_use]
    pub fn tag_ifndef<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self.retag(text, Directive::Ifndef) {
            Some((content, _)) => Cow::Owned(content),
            None => Cow::Borrowed(text),
        }
    }

    /// Prefix the `#define` token of the first guard pair.
    ///
    /// The `#ifndef` line is kept as is, minus trailing blanks.
    #[must_use]
    pub fn tag_define<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self.retag(text, Directive::Define) {
            Some((content, _)) => Cow::Owned(content),
            None => Cow::Borrowed(text),
        }
    }

    /// Tag the `#ifndef` line, then the `#define` line, of the first guard
    /// pair. Both steps are no-ops on a pair that is already tagged.
    #[must_use]
    pub fn rewrite(&self, text: &str) -> Rewrite {
        let mut content = text.to_string();
        let mut changes = Vec::new();

        for directive in [Directive::Ifndef, Directive::Define] {
            if let Some((retagged, change)) = self.retag(&content, directive) {
                content = retagged;
                changes.push(change);
            }
        }

        Rewrite { content, changes }
    }

    fn retag(&self, text: &str, directive: Directive) -> Option<(String, GuardChange)> {
        let pair = self.find_guard(text)?;
        let token = match directive {
            Directive::Ifndef => pair.guard_token,
            Directive::Define => pair.define_token,
        };
        if self.is_tagged(token) {
            trace!(%directive, token, "Guard already tagged");
            return None;
        }

        let renamed = format!("{}{}", self.prefix, guard_name(token));
        let replacement = match directive {
            Directive::Ifndef => format!(
                "#ifndef {renamed}{}{}{}",
                pair.ifndef_eol, pair.define_line, pair.define_eol
            ),
            Directive::Define => format!(
                "{}{}#define {renamed}{}",
                pair.ifndef_line, pair.ifndef_eol, pair.define_eol
            ),
        };

        let mut content = String::with_capacity(text.len() + self.prefix.len());
        content.push_str(&text[..pair.span.start]);
        content.push_str(&replacement);
        content.push_str(&text[pair.span.end..]);

        Some((
            content,
            GuardChange {
                directive,
                from: token.to_string(),
                to: renamed,
            },
        ))
    }
}
