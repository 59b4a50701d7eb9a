//! A small structural query language over tag trees.
//!
//! A query is a space-separated sequence of per-level filter steps, each
//! matched against descendants of the queried tag:
//!
//! * `*` matches any tag;
//! * a type keyword (`Int`, `compound`, ..., case-insensitive) matches by
//!   kind;
//! * `#name` matches by tag name;
//! * `[2]` matches the tag at that position of its parent list;
//! * `a>b` requires `b` to match with its direct parent matching `a`
//!   (split at the last `>`);
//! * `a,b` requires both filters to match the same tag.
//!
//! Steps not joined by `>` may skip intermediate levels, so `List #id`
//! finds `#id` tags anywhere below any list, while `List>Compound` only
//! finds compounds sitting directly inside a list.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::tree::Payload;
use crate::{TagId, TagType, Tree};

/// One parsed filter step.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `*`: matches any tag.
    Any,
    /// A type keyword: matches by kind.
    Type(TagType),
    /// `#name`: matches by name.
    Name(String),
    /// `[n]`: matches the tag at position `n` of its parent list.
    Index(usize),
    /// `parent>child`: matches where `child` matches the tag and `parent`
    /// matches its direct parent.
    Child(Box<Filter>, Box<Filter>),
    /// `a,b,...`: all must match the same tag.
    All(Vec<Filter>),
}

impl Filter {
    /// Parse a single filter expression (one step of a query).
    pub fn parse(expr: &str) -> Result<Filter> {
        if expr.contains(',') {
            let filters = expr
                .split(',')
                .map(Filter::parse)
                .collect::<Result<Vec<_>>>()?;
            return Ok(Filter::All(filters));
        }
        if let Some(split) = expr.rfind('>') {
            let parent = Filter::parse(&expr[..split])?;
            let child = Filter::parse(&expr[split + 1..])?;
            return Ok(Filter::Child(Box::new(parent), Box::new(child)));
        }
        if let Some(name) = expr.strip_prefix('#') {
            return Ok(Filter::Name(name.to_owned()));
        }
        if expr.is_empty() || expr == "*" {
            return Ok(Filter::Any);
        }
        if let Some(inner) = expr.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            if let Ok(index) = inner.parse::<usize>() {
                return Ok(Filter::Index(index));
            }
        }
        TagType::from_name(expr)
            .map(Filter::Type)
            .ok_or_else(|| Error::filter(expr))
    }

    /// Whether this filter matches the given tag.
    pub(crate) fn matches(&self, tree: &Tree, id: TagId) -> bool {
        match self {
            Filter::Any => true,
            Filter::Type(t) => tree.node(id).payload.tag_type() == *t,
            Filter::Name(name) => tree.node(id).name.as_deref() == Some(name.as_str()),
            Filter::Index(index) => {
                let parent = match tree.node(id).parent {
                    Some(p) => p,
                    None => return false,
                };
                match &tree.node(parent).payload {
                    Payload::List { items, .. } => {
                        items.iter().position(|&c| c == id) == Some(*index)
                    }
                    _ => false,
                }
            }
            Filter::Child(parent, child) => {
                let p = match tree.node(id).parent {
                    Some(p) => p,
                    None => return false,
                };
                parent.matches(tree, p) && child.matches(tree, id)
            }
            Filter::All(filters) => filters.iter().all(|f| f.matches(tree, id)),
        }
    }
}

/// Parse a whole query string into its filter steps.
pub fn parse_query(query: &str) -> Result<Vec<Filter>> {
    let steps = query
        .split_whitespace()
        .map(Filter::parse)
        .collect::<Result<Vec<_>>>()?;
    if steps.is_empty() {
        return Err(Error::Query("empty query".to_owned()));
    }
    Ok(steps)
}

/// Walk the subtree under `from`, collecting tags that satisfy the final
/// step, deduplicated by identity in first-visit order.
pub(crate) fn run(tree: &Tree, from: TagId, steps: &[Filter]) -> Vec<TagId> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    collect(tree, from, steps, 0, &mut seen, &mut out);
    out
}

fn collect(
    tree: &Tree,
    node: TagId,
    steps: &[Filter],
    step: usize,
    seen: &mut HashSet<TagId>,
    out: &mut Vec<TagId>,
) {
    let last = step == steps.len() - 1;
    for child in tree.children_of(node) {
        if steps[step].matches(tree, child) {
            if last && seen.insert(child) {
                out.push(child);
            }
            if tree.is_collection(child) {
                if !last {
                    collect(tree, child, steps, step + 1, seen, out);
                }
                // a matching step may also be satisfied deeper down
                collect(tree, child, steps, step, seen, out);
            }
        } else if tree.is_collection(child) {
            collect(tree, child, steps, step, seen, out);
        }
    }
}
