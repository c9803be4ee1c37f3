//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! Translation of document-database style filters and update expressions into
//! the shapes the document API accepts.
//!
use crate::error::{ia_err, ia_error, unsupported_err, AstraError};
use derive_builder::Builder;
use serde_json::{Map, Number, Value};

/// Options that affect how a filter is translated and paged.
///
/// ```
/// use astra_rust_sdk::QueryOptionsBuilder;
/// let opts = QueryOptionsBuilder::default().page_size(50u32).build().unwrap();
/// assert_eq!(opts.page_size, Some(50));
/// ```
#[derive(Default, Debug, Clone, Builder)]
#[builder(default)]
pub struct QueryOptions {
    /// Collations are not supported: setting one makes translation fail.
    #[builder(setter(strip_option))]
    pub collation: Option<Value>,
    #[builder(setter(strip_option))]
    pub page_size: Option<u32>,
    #[builder(setter(into, strip_option))]
    pub page_state: Option<String>,
}

/// Canonicalize a filter with default options. See [`canonicalize_filter()`].
pub fn canonicalize(filter: &Value) -> Result<Map<String, Value>, AstraError> {
    canonicalize_filter(filter, &QueryOptions::default())
}

/// Rewrite every top-level literal (string, number, boolean or null) in `filter`
/// into an explicit `{"$eq": literal}` operator. Operator objects, arrays and
/// nested objects pass through unchanged, so `{"a": 1}` and `{"a": {"$eq": 1}}`
/// produce identical output.
///
/// A `null` filter is treated as the empty filter. Any other non-object filter is
/// an illegal argument, and a requested collation is an unsupported feature.
pub fn canonicalize_filter(
    filter: &Value,
    options: &QueryOptions,
) -> Result<Map<String, Value>, AstraError> {
    if options.collation.is_some() {
        return unsupported_err!("Collations are not supported");
    }
    let fields = match filter {
        Value::Null => return Ok(Map::new()),
        Value::Object(m) => m,
        other => return ia_err!("filter must be a JSON object, got {}", other),
    };
    let mut out = Map::with_capacity(fields.len());
    for (k, v) in fields {
        let cv = match v {
            Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => {
                let mut eq = Map::new();
                eq.insert("$eq".to_string(), v.clone());
                Value::Object(eq)
            }
            _ => v.clone(),
        };
        out.insert(k.clone(), cv);
    }
    Ok(out)
}

/// A parsed update expression.
///
/// `$set` members and plain (non-operator) members are merged as a partial
/// update. `$inc` members are applied client-side against the current document:
/// this is a read-modify-write and is not atomic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSpec {
    pub set: Map<String, Value>,
    pub inc: Map<String, Value>,
}

impl UpdateSpec {
    pub fn parse(update: &Value) -> Result<UpdateSpec, AstraError> {
        let fields = match update {
            Value::Object(m) => m,
            other => return ia_err!("update must be a JSON object, got {}", other),
        };
        let mut spec = UpdateSpec::default();
        for (k, v) in fields {
            match k.as_str() {
                "$set" => match v {
                    Value::Object(m) => {
                        for (sk, sv) in m {
                            spec.set.insert(sk.clone(), sv.clone());
                        }
                    }
                    _ => return ia_err!("$set requires an object"),
                },
                "$inc" => match v {
                    Value::Object(m) => {
                        for (ik, iv) in m {
                            if !iv.is_number() {
                                return ia_err!("$inc amount for '{}' must be a number", ik);
                            }
                            spec.inc.insert(ik.clone(), iv.clone());
                        }
                    }
                    _ => return ia_err!("$inc requires an object"),
                },
                op if op.starts_with('$') => {
                    return unsupported_err!("update operator {} is not supported", op);
                }
                _ => {
                    spec.set.insert(k.clone(), v.clone());
                }
            }
        }
        Ok(spec)
    }

    /// Returns true if the update contains a client-side increment.
    pub fn has_increments(&self) -> bool {
        !self.inc.is_empty()
    }

    /// Build the partial document to send for this update, given the current
    /// stored document. Dotted keys are expanded into nested objects.
    pub fn patch_for(&self, current: &Value) -> Result<Map<String, Value>, AstraError> {
        let mut patch = expand_dotted(&self.set);
        for (k, delta) in &self.inc {
            let sum = match lookup_dotted(current, k) {
                None | Some(Value::Null) => delta.clone(),
                Some(Value::Number(n)) => add_numbers(n, delta, k)?,
                Some(_) => return ia_err!("cannot increment non-numeric field '{}'", k),
            };
            insert_dotted(&mut patch, k, sum);
        }
        Ok(patch)
    }

    /// Apply this update locally, returning the document as it will be stored.
    pub fn apply(&self, current: &Value) -> Result<Value, AstraError> {
        let patch = self.patch_for(current)?;
        let mut after = match current {
            Value::Object(_) => current.clone(),
            _ => Value::Object(Map::new()),
        };
        deep_merge(&mut after, &Value::Object(patch));
        Ok(after)
    }
}

fn add_numbers(current: &Number, delta: &Value, key: &str) -> Result<Value, AstraError> {
    if let (Some(a), Some(b)) = (current.as_i64(), delta.as_i64()) {
        if let Some(s) = a.checked_add(b) {
            return Ok(Value::from(s));
        }
    }
    let a = current.as_f64().unwrap_or(0.0);
    let b = delta.as_f64().unwrap_or(0.0);
    Number::from_f64(a + b)
        .map(Value::Number)
        .ok_or_else(|| ia_error!("increment of '{}' is not a finite number", key))
}

pub(crate) fn lookup_dotted<'a>(doc: &'a Value, key: &str) -> Option<&'a Value> {
    let mut cur = doc;
    for part in key.split('.') {
        cur = cur.as_object()?.get(part)?;
    }
    Some(cur)
}

fn insert_dotted(target: &mut Map<String, Value>, key: &str, value: Value) {
    let mut parts: Vec<&str> = key.split('.').collect();
    let last = match parts.pop() {
        Some(l) => l,
        None => return,
    };
    let mut cur = target;
    for p in parts {
        let entry = cur
            .entry(p.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        cur = match entry {
            Value::Object(m) => m,
            _ => return,
        };
    }
    cur.insert(last.to_string(), value);
}

/// Expand `{"a.b": 1}` into `{"a": {"b": 1}}`. Keys without dots are kept as is.
pub fn expand_dotted(fields: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for (k, v) in fields {
        if k.contains('.') {
            insert_dotted(&mut out, k, v.clone());
        } else {
            match (out.get_mut(k), v) {
                (Some(existing @ Value::Object(_)), Value::Object(_)) => deep_merge(existing, v),
                _ => {
                    out.insert(k.clone(), v.clone());
                }
            }
        }
    }
    out
}

// Object members merge recursively; anything else replaces.
pub(crate) fn deep_merge(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(t), Value::Object(p)) => {
            for (k, pv) in p {
                match t.get_mut(k) {
                    Some(tv) if tv.is_object() && pv.is_object() => deep_merge(tv, pv),
                    _ => {
                        t.insert(k.clone(), pv.clone());
                    }
                }
            }
        }
        (t, p) => *t = p.clone(),
    }
}
