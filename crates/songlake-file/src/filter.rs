//! Document filters.
//!
//! [`to_filter`] translates a [`Predicate`] into a JSON document filter and
//! [`matches`] evaluates such a filter against a stored document.
//!
//! | predicate            | filter                                    |
//! |----------------------|-------------------------------------------|
//! | match all            | `{}`                                      |
//! | id in set            | `{"_id": {"$in": [...]}}`                 |
//! | tag equals           | `{"tags.<name>": "<value>"}`              |
//! | tag exists           | `{"tags.<name>": {"$exists": true}}`      |
//! | all / any / none     | `{"$and": [...]}` / `$or` / `$nor`        |

use serde_json::{Map, Value, json};

use songlake_core::query::{Combinator, Predicate, TagClause};

const TAGS_PREFIX: &str = "tags.";

/// Translate a predicate into a document filter.
pub fn to_filter(predicate: &Predicate) -> Value {
    match predicate {
        Predicate::MatchAll => json!({}),
        Predicate::IdIn(ids) => {
            let ids: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
            json!({ "_id": { "$in": ids } })
        }
        Predicate::Tags {
            combinator,
            clauses,
        } => {
            let entries: Vec<Value> = clauses.iter().map(clause_filter).collect();
            let operator = match combinator {
                Combinator::All => "$and",
                Combinator::Any => "$or",
                Combinator::None => "$nor",
            };
            json!({ operator: entries })
        }
    }
}

fn clause_filter(clause: &TagClause) -> Value {
    let mut entry = Map::new();
    let field = format!("{}{}", TAGS_PREFIX, clause.name());
    let condition = match clause {
        TagClause::Equals { value, .. } => Value::String(value.clone()),
        TagClause::Exists { .. } => json!({ "$exists": true }),
    };
    entry.insert(field, condition);
    Value::Object(entry)
}

/// Evaluate a document filter against a document.
///
/// Every top-level entry must hold. Unknown operators never match.
pub fn matches(filter: &Value, doc: &Value) -> bool {
    let Some(entries) = filter.as_object() else {
        return false;
    };

    entries.iter().all(|(key, condition)| match key.as_str() {
        "$and" => sub_filters(condition).is_some_and(|mut fs| fs.all(|f| matches(f, doc))),
        "$or" => sub_filters(condition).is_some_and(|mut fs| fs.any(|f| matches(f, doc))),
        "$nor" => sub_filters(condition).is_some_and(|mut fs| !fs.any(|f| matches(f, doc))),
        path => field_matches(field(doc, path), condition),
    })
}

fn sub_filters(condition: &Value) -> Option<impl Iterator<Item = &Value>> {
    condition.as_array().map(|a| a.iter())
}

fn field_matches(value: Option<&Value>, condition: &Value) -> bool {
    let operators = condition
        .as_object()
        .filter(|o| !o.is_empty() && o.keys().all(|k| k.starts_with('$')));

    let Some(operators) = operators else {
        return value == Some(condition);
    };

    operators.iter().all(|(op, arg)| match op.as_str() {
        "$exists" => arg.as_bool() == Some(value.is_some()),
        "$eq" => value == Some(arg),
        "$in" => arg
            .as_array()
            .is_some_and(|candidates| value.is_some_and(|v| candidates.contains(v))),
        _ => false,
    })
}

/// Resolve a dotted path. A key containing dots is tried whole before the
/// path is split, so tag names with dots still resolve.
fn field<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let object = doc.as_object()?;
    if let Some(value) = object.get(path) {
        return Some(value);
    }
    let (head, rest) = path.split_once('.')?;
    field(object.get(head)?, rest)
}
