//! Call arguments passed through a gateway

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Result;

/// Positional and named arguments of one remote call.
///
/// ```rust
/// # use rpc_cachetools::CallArgs;
/// let call = CallArgs::new().arg("hi").kwarg("some_arg", true);
/// assert_eq!(call.args.len(), 1);
/// assert_eq!(call.kwargs["some_arg"], true);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallArgs {
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub kwargs: Map<String, Value>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Set a named argument, replacing any previous value for `name`.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(name.into(), value.into());
        self
    }

    /// Append a positional argument from any serializable value.
    pub fn arg_serialized<T: Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        Ok(self.arg(serde_json::to_value(value)?))
    }

    /// Set a named argument from any serializable value.
    pub fn kwarg_serialized<T: Serialize + ?Sized>(
        self,
        name: impl Into<String>,
        value: &T,
    ) -> Result<Self> {
        Ok(self.kwarg(name, serde_json::to_value(value)?))
    }

    /// Look up a named argument.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.kwargs.get(name)
    }

    /// Whether the call carries no arguments at all.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.kwargs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_collects_args_in_order() {
        let call = CallArgs::new().arg(1).arg("two").arg(json!([3]));
        assert_eq!(call.args, vec![json!(1), json!("two"), json!([3])]);
        assert!(call.kwargs.is_empty());
    }

    #[test]
    fn kwarg_overwrites_previous_value() {
        let call = CallArgs::new().kwarg("a", 1).kwarg("a", 2);
        assert_eq!(call.get("a"), Some(&json!(2)));
        assert_eq!(call.kwargs.len(), 1);
    }

    #[test]
    fn serialized_helpers_accept_structs() {
        #[derive(Serialize)]
        struct Point {
            x: i32,
            y: i32,
        }
        let call = CallArgs::new()
            .arg_serialized(&Point { x: 1, y: 2 })
            .unwrap()
            .kwarg_serialized("origin", &Point { x: 0, y: 0 })
            .unwrap();
        assert_eq!(call.args[0], json!({"x": 1, "y": 2}));
        assert_eq!(call.get("origin"), Some(&json!({"x": 0, "y": 0})));
    }

    #[test]
    fn empty_call() {
        assert!(CallArgs::new().is_empty());
        assert!(!CallArgs::new().arg(Value::Null).is_empty());
    }
}
