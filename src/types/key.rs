//! Canonical cache keys for remote calls.
//!
//! A key is the compact JSON encoding of `[args, kwargs]` with object keys
//! sorted at every nesting level, so two calls whose named arguments (or
//! nested mappings) were built in a different order resolve to the same
//! entry. Positional order is significant.

use std::fmt;

use serde_json::Value;

use super::CallArgs;

/// Canonical, order-normalized identity of a call's arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key derived from the call arguments only.
    pub fn for_call(call: &CallArgs) -> Self {
        let mut out = String::with_capacity(64);
        write_call(call, &mut out);
        Self(out)
    }

    /// Key derived from the method name and the call arguments.
    pub fn for_method_call(method: &str, call: &CallArgs) -> Self {
        let mut out = String::with_capacity(method.len() + 64);
        out.push_str(method);
        out.push(':');
        write_call(call, &mut out);
        Self(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.0
    }
}

fn write_call(call: &CallArgs, out: &mut String) {
    out.push('[');
    out.push('[');
    for (i, arg) in call.args.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_canonical(arg, out);
    }
    out.push(']');
    out.push(',');
    write_object(call.kwargs.iter(), out);
    out.push(']');
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => write_object(map.iter(), out),
        // Scalars: Value's Display is compact JSON with proper escaping.
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn write_object<'a>(entries: impl Iterator<Item = (&'a String, &'a Value)>, out: &mut String) {
    // serde_json may preserve insertion order (feature `preserve_order`
    // anywhere in the dependency graph), so sort explicitly.
    let mut entries: Vec<_> = entries.collect();
    entries.sort_unstable_by(|a, b| a.0.cmp(b.0));

    out.push('{');
    for (i, (name, value)) in entries.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&Value::String(name.clone()).to_string());
        out.push(':');
        write_canonical(value, out);
    }
    out.push('}');
}
