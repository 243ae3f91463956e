//! Query and update evaluation for the in-memory backend
//!
//! Supports the subset of the document query language the repository produces plus
//! the common comparison operators.

use crate::errors::StoreError;
use bson::{Bson, Document, Regex};
use std::cmp::Ordering;

/// Resolve a dotted path inside a document
pub(crate) fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Bson::Document(inner) => inner.get(segment)?,
            _ => return None,
        };
    }
    Some(current)
}

fn set_path(document: &mut Document, path: &str, value: Bson) {
    match path.split_once('.') {
        None => {
            document.insert(path, value);
        }
        Some((head, rest)) => {
            if !matches!(document.get(head), Some(Bson::Document(_))) {
                document.insert(head, Document::new());
            }
            if let Some(Bson::Document(inner)) = document.get_mut(head) {
                set_path(inner, rest, value);
            }
        }
    }
}

fn remove_path(document: &mut Document, path: &str) {
    match path.split_once('.') {
        None => {
            document.remove(path);
        }
        Some((head, rest)) => {
            if let Some(Bson::Document(inner)) = document.get_mut(head) {
                remove_path(inner, rest);
            }
        }
    }
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(i) => Some(f64::from(*i)),
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(d) => Some(*d),
        _ => None,
    }
}

/// Canonical ordering of BSON types when comparing mixed values
fn type_rank(value: Option<&Bson>) -> u8 {
    match value {
        None | Some(Bson::Null) | Some(Bson::Undefined) => 0,
        Some(Bson::Int32(_)) | Some(Bson::Int64(_)) | Some(Bson::Double(_)) => 1,
        Some(Bson::String(_)) | Some(Bson::Symbol(_)) => 2,
        Some(Bson::Document(_)) => 3,
        Some(Bson::Array(_)) => 4,
        Some(Bson::Binary(_)) => 5,
        Some(Bson::ObjectId(_)) => 6,
        Some(Bson::Boolean(_)) => 7,
        Some(Bson::DateTime(_)) => 8,
        Some(Bson::Timestamp(_)) => 9,
        Some(Bson::RegularExpression(_)) => 10,
        Some(_) => 11,
    }
}

/// Compare two values of the same type class, `None` when they are not comparable
fn compare(a: &Bson, b: &Bson) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return x.partial_cmp(&y);
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::DateTime(x), Bson::DateTime(y)) => Some(x.cmp(y)),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => Some(x.cmp(y)),
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        (Bson::Timestamp(x), Bson::Timestamp(y)) => Some((x.time, x.increment).cmp(&(y.time, y.increment))),
        _ => None,
    }
}

/// Total order used for sorting
pub(crate) fn sort_cmp(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let (rank_a, rank_b) = (type_rank(a), type_rank(b));
    if rank_a != rank_b {
        return rank_a.cmp(&rank_b);
    }
    match (a, b) {
        (Some(x), Some(y)) => compare(x, y).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

fn scalar_equals(actual: &Bson, expected: &Bson) -> bool {
    if let (Some(x), Some(y)) = (as_number(actual), as_number(expected)) {
        return x == y;
    }
    actual == expected
}

/// Equality with query semantics: `null` also matches a missing field, and an array
/// field matches when any element equals the expected scalar
fn values_equal(actual: Option<&Bson>, expected: &Bson) -> bool {
    match (actual, expected) {
        (None, Bson::Null) => true,
        (None, _) => false,
        (Some(Bson::Array(items)), expected) if !matches!(expected, Bson::Array(_)) => {
            items.iter().any(|item| scalar_equals(item, expected))
        }
        (Some(actual), expected) => scalar_equals(actual, expected),
    }
}

fn build_regex(pattern: &str, options: &str) -> Result<regex::Regex, StoreError> {
    regex::RegexBuilder::new(pattern)
        .case_insensitive(options.contains('i'))
        .multi_line(options.contains('m'))
        .dot_matches_new_line(options.contains('s'))
        .ignore_whitespace(options.contains('x'))
        .build()
        .map_err(|e| StoreError::InvalidQuery(format!("bad pattern '{}': {}", pattern, e)))
}

fn regex_matches(actual: Option<&Bson>, pattern: &str, options: &str) -> Result<bool, StoreError> {
    let re = build_regex(pattern, options)?;
    Ok(match actual {
        Some(Bson::String(s)) => re.is_match(s),
        Some(Bson::Array(items)) => items
            .iter()
            .any(|item| matches!(item, Bson::String(s) if re.is_match(s))),
        _ => false,
    })
}

fn is_operator_document(value: &Bson) -> Option<&Document> {
    match value {
        Bson::Document(d) if d.keys().next().is_some_and(|k| k.starts_with('$')) => Some(d),
        _ => None,
    }
}

fn operators_match(actual: Option<&Bson>, operators: &Document) -> Result<bool, StoreError> {
    for (op, operand) in operators {
        let ok = match op.as_str() {
            "$eq" => values_equal(actual, operand),
            "$ne" => !values_equal(actual, operand),
            "$gt" | "$gte" | "$lt" | "$lte" => match actual.and_then(|a| compare(a, operand)) {
                Some(ordering) => match op.as_str() {
                    "$gt" => ordering == Ordering::Greater,
                    "$gte" => ordering != Ordering::Less,
                    "$lt" => ordering == Ordering::Less,
                    _ => ordering != Ordering::Greater,
                },
                None => false,
            },
            "$in" | "$nin" => {
                let candidates = operand.as_array().ok_or_else(|| {
                    StoreError::InvalidQuery(format!("{} needs an array", op))
                })?;
                let found = candidates.iter().any(|c| values_equal(actual, c));
                if op == "$in" { found } else { !found }
            }
            "$exists" => {
                let wanted = match operand {
                    Bson::Boolean(b) => *b,
                    other => as_number(other).is_some_and(|n| n != 0.0),
                };
                actual.is_some() == wanted
            }
            "$regex" => {
                let options = operators.get_str("$options").unwrap_or("");
                match operand {
                    Bson::String(pattern) => regex_matches(actual, pattern, options)?,
                    Bson::RegularExpression(Regex { pattern, options: inline }) => {
                        regex_matches(actual, pattern, &format!("{}{}", inline, options))?
                    }
                    _ => return Err(StoreError::InvalidQuery("$regex needs a pattern".into())),
                }
            }
            "$options" => true,
            "$not" => match operand {
                Bson::Document(inner) => !operators_match(actual, inner)?,
                Bson::RegularExpression(re) => !regex_matches(actual, &re.pattern, &re.options)?,
                _ => return Err(StoreError::InvalidQuery("$not needs an expression".into())),
            },
            other => {
                return Err(StoreError::InvalidQuery(format!(
                    "unsupported operator {}",
                    other
                )))
            }
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

fn clauses(operand: &Bson, op: &str) -> Result<Vec<Document>, StoreError> {
    operand
        .as_array()
        .map(|items| items.iter().filter_map(|i| i.as_document().cloned()).collect())
        .ok_or_else(|| StoreError::InvalidQuery(format!("{} needs an array of filters", op)))
}

/// Evaluate a filter against a document
pub(crate) fn matches(document: &Document, filter: &Document) -> Result<bool, StoreError> {
    for (key, condition) in filter {
        let ok = match key.as_str() {
            "$and" => {
                let mut all = true;
                for clause in clauses(condition, key)? {
                    if !matches(document, &clause)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            "$or" => {
                let mut any = false;
                for clause in clauses(condition, key)? {
                    if matches(document, &clause)? {
                        any = true;
                        break;
                    }
                }
                any
            }
            path => {
                let actual = lookup(document, path);
                if let Some(operators) = is_operator_document(condition) {
                    operators_match(actual, operators)?
                } else if let Bson::RegularExpression(re) = condition {
                    regex_matches(actual, &re.pattern, &re.options)?
                } else {
                    values_equal(actual, condition)
                }
            }
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Apply an operator update (`$set`, `$unset`) in place
pub(crate) fn apply_update(document: &mut Document, update: &Document) -> Result<(), StoreError> {
    if update.is_empty() {
        return Err(StoreError::InvalidQuery("update document is empty".into()));
    }
    for (op, operand) in update {
        let fields = operand.as_document().ok_or_else(|| {
            StoreError::InvalidQuery(format!("{} needs a document of fields", op))
        })?;
        match op.as_str() {
            "$set" => {
                for (path, value) in fields {
                    if path == "_id" && document.get("_id") != Some(value) {
                        return Err(StoreError::ImmutableField("_id".into()));
                    }
                    set_path(document, path, value.clone());
                }
            }
            "$unset" => {
                for path in fields.keys() {
                    if path == "_id" {
                        return Err(StoreError::ImmutableField("_id".into()));
                    }
                    remove_path(document, path);
                }
            }
            other => {
                return Err(StoreError::InvalidQuery(format!(
                    "unsupported update operator {}",
                    other
                )))
            }
        }
    }
    Ok(())
}

/// Build the replacement for `current`, keeping its `_id`
pub(crate) fn apply_replacement(
    current: &Document,
    replacement: &Document,
) -> Result<Document, StoreError> {
    if replacement.keys().any(|k| k.starts_with('$')) {
        return Err(StoreError::InvalidQuery(
            "replacement document must not contain update operators".into(),
        ));
    }
    let id = current.get("_id").cloned().unwrap_or(Bson::Null);
    if let Some(new_id) = replacement.get("_id") {
        if *new_id != id {
            return Err(StoreError::ImmutableField("_id".into()));
        }
    }

    let mut replaced = Document::new();
    replaced.insert("_id", id);
    for (key, value) in replacement {
        if key != "_id" {
            replaced.insert(key.as_str(), value.clone());
        }
    }
    Ok(replaced)
}
