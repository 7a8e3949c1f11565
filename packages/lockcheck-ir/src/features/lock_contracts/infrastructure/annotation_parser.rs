//! Annotation comment parser
//!
//! Grammar (one annotation per comment line):
//! ```text
//! //@requires(from.mu, to.mu)
//! /* @guarded_by(mu) */
//!  * @returns(c.mu)          (continuation line of a block comment)
//! ```
//! Tag names are case-insensitive. Parameters are trimmed and empty ones
//! dropped, so `@requires(mu, )` yields the single target `mu`.

use super::error::{AnnotationError, Result};
use crate::features::lock_contracts::domain::AnnotationKind;

/// One parsed annotation: `kind(params...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub kind: AnnotationKind,
    pub params: Vec<String>,
}

/// Annotation body of a single comment line, without the leading `@`
///
/// Returns `None` when the line is not an annotation.
pub fn extract_annotation(line: &str) -> Option<&str> {
    if !line.contains('@') {
        return None;
    }
    let mut text = line.trim();
    text = text.strip_prefix("//").unwrap_or(text);
    text = text.strip_prefix("/*").unwrap_or(text);
    text = text.strip_suffix("*/").unwrap_or(text);
    text = text.trim();
    // Continuation line inside a block comment
    if let Some(rest) = text.strip_prefix('*') {
        text = rest.trim_start();
    }
    text.strip_prefix('@').map(str::trim)
}

/// Parse an annotation body such as `requires(from.mu, to.mu)`
pub fn parse_annotation(body: &str) -> Result<Annotation> {
    let (open, close) = match (body.find('('), body.find(')')) {
        (Some(open), Some(close)) if open < close => (open, close),
        _ => return Err(AnnotationError::InvalidFormat(body.to_string())),
    };

    let name = body[..open].trim();
    let kind =
        AnnotationKind::from_tag(name).ok_or_else(|| AnnotationError::UnknownTag(name.to_string()))?;
    let params = body[open + 1..close]
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();

    Ok(Annotation { kind, params })
}

/// Parse one raw comment line; `Ok(None)` if it carries no annotation
pub fn parse_comment_line(line: &str) -> Result<Option<Annotation>> {
    extract_annotation(line).map(parse_annotation).transpose()
}

/// Parse every annotation in a (possibly multi-line block) comment
///
/// Each line is reported independently so one malformed line does not hide
/// the others.
pub fn parse_comment(comment: &str) -> Vec<Result<Annotation>> {
    comment
        .lines()
        .filter_map(|line| parse_comment_line(line).transpose())
        .collect()
}
