//! Splitting kintone query strings into condition, ordering and paging.
//!
//! kintone has no separate `limit`/`offset` parameters for record
//! retrieval: they are clauses at the tail of the query string, after any
//! `order by`. Callers may pass a query that already carries some of these
//! clauses, so the client takes it apart before appending its own.

use regex::Regex;
use std::sync::OnceLock;

fn paging_tail_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(limit|offset)\s+(\d+)\s*$").expect("valid paging clause regex")
    })
}

fn order_by_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\border\s+by\b").expect("valid order by regex"))
}

/// A query split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParts {
    /// The filter condition, possibly empty.
    pub condition: String,
    /// The full `order by ...` clause, as written.
    pub order_by: Option<String>,
    /// Effective limit, if any.
    pub limit: Option<u32>,
    /// Effective offset.
    pub offset: u32,
}

impl QueryParts {
    /// Parse `query`, merging its paging clauses with the defaults.
    ///
    /// Only trailing `limit`/`offset` clauses and an `order by` outside
    /// string literals are recognised; everything else stays in the
    /// condition untouched. A limit in the query caps `default_limit` (the
    /// smaller wins). An offset in the query replaces `default_offset`.
    pub fn parse(query: Option<&str>, default_limit: Option<u32>, default_offset: u32) -> Self {
        let query = query.map(str::trim).unwrap_or_default();
        // Same byte layout as `query`, so offsets found here slice `query`.
        let masked = mask_string_literals(query);

        let mut end = masked.len();
        let mut query_limit = None;
        let mut query_offset = None;
        while let Some(caps) = paging_tail_re().captures(&masked[..end]) {
            let (Some(whole), Some(keyword), Some(number)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                break;
            };
            let slot = if keyword.as_str().eq_ignore_ascii_case("limit") {
                &mut query_limit
            } else {
                &mut query_offset
            };
            if slot.is_some() {
                break;
            }
            *slot = Some(number.as_str().parse().unwrap_or(u32::MAX));
            end = whole.start();
        }

        let (condition, order_by) = match order_by_re().find(&masked[..end]) {
            Some(m) => (
                &query[..m.start()],
                Some(query[m.start()..end].trim().to_string()),
            ),
            None => (&query[..end], None),
        };

        let limit = match (query_limit, default_limit) {
            (Some(q), Some(d)) => Some(q.min(d)),
            (q, d) => q.or(d),
        };

        Self {
            condition: condition.trim().to_string(),
            order_by,
            limit,
            offset: query_offset.unwrap_or(default_offset),
        }
    }

    /// Condition and ordering only, with paging dropped.
    pub fn without_paging(&self) -> String {
        join_clauses(&[
            self.condition.as_str(),
            self.order_by.as_deref().unwrap_or_default(),
        ])
    }

    /// Reassemble with explicit paging.
    pub fn with_paging(&self, limit: u32, offset: u32) -> String {
        let paging = format!("limit {} offset {}", limit, offset);
        join_clauses(&[self.without_paging().as_str(), paging.as_str()])
    }
}

/// Replace the contents of `"..."` literals with `x`, byte for byte.
///
/// Quote characters stay in place and `\"` inside a literal does not end
/// it. Match positions outside literals are therefore char boundaries of
/// the original string.
fn mask_string_literals(query: &str) -> String {
    let mut masked = String::with_capacity(query.len());
    let mut in_literal = false;
    let mut escaped = false;
    for c in query.chars() {
        if !in_literal {
            in_literal = c == '"';
            masked.push(c);
            continue;
        }
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            in_literal = false;
            masked.push(c);
            continue;
        }
        masked.extend(std::iter::repeat('x').take(c.len_utf8()));
    }
    masked
}

fn join_clauses(clauses: &[&str]) -> String {
    clauses
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
