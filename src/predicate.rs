//! Predicate requirements

use crate::difference::Difference;
use crate::error::{CheckError, Result};
use crate::value::Value;
use regex::Regex;
use std::fmt;
use std::rc::Rc;

/// What a predicate says about one element
#[derive(Debug, Clone)]
pub enum Verdict {
    Pass,
    Fail,
    /// A ready-made difference, passed through unchanged
    Difference(Difference),
    /// A dynamically produced value. Only values equal to `True` or
    /// `False` are accepted; anything else breaks the predicate contract.
    Value(Value),
}

impl From<bool> for Verdict {
    fn from(ok: bool) -> Self {
        if ok {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }
}

impl From<Difference> for Verdict {
    fn from(diff: Difference) -> Self {
        Verdict::Difference(diff)
    }
}

impl From<Value> for Verdict {
    fn from(value: Value) -> Self {
        Verdict::Value(value)
    }
}

/// How an element is handed to the predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// The whole element as one argument
    Unary,
    /// Tuple fields as separate arguments
    Variadic,
}

/// Invocable capability behind every predicate requirement
pub trait CustomPredicate {
    fn name(&self) -> &str;

    fn arity(&self) -> Arity {
        Arity::Unary
    }

    /// Evaluate the predicate. An `Err` counts as a failed check.
    fn call(&self, args: &[Value]) -> anyhow::Result<Verdict>;
}

struct UnaryFn<F> {
    name: String,
    func: F,
}

impl<F> CustomPredicate for UnaryFn<F>
where
    F: Fn(&Value) -> anyhow::Result<Verdict>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, args: &[Value]) -> anyhow::Result<Verdict> {
        (self.func)(&args[0])
    }
}

struct VariadicFn<F> {
    name: String,
    func: F,
}

impl<F> CustomPredicate for VariadicFn<F>
where
    F: Fn(&[Value]) -> anyhow::Result<Verdict>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn arity(&self) -> Arity {
        Arity::Variadic
    }

    fn call(&self, args: &[Value]) -> anyhow::Result<Verdict> {
        (self.func)(args)
    }
}

/// Regex search against a string element
struct PatternSearch {
    regex: Regex,
}

impl CustomPredicate for PatternSearch {
    fn name(&self) -> &str {
        self.regex.as_str()
    }

    fn call(&self, args: &[Value]) -> anyhow::Result<Verdict> {
        args[0].with_resolved(|value| match value {
            Value::Str(s) => Ok(self.regex.is_match(s).into()),
            other => anyhow::bail!("expected string, got '{}'", other.type_name()),
        })
    }
}

/// A named predicate requirement
#[derive(Clone)]
pub struct Predicate {
    inner: Rc<dyn CustomPredicate>,
}

impl Predicate {
    /// Predicate over whole elements
    pub fn unary<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> anyhow::Result<Verdict> + 'static,
    {
        Self::custom(UnaryFn {
            name: name.into(),
            func,
        })
    }

    /// Predicate receiving tuple fields as separate arguments
    pub fn variadic<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> anyhow::Result<Verdict> + 'static,
    {
        Self::custom(VariadicFn {
            name: name.into(),
            func,
        })
    }

    pub fn custom(predicate: impl CustomPredicate + 'static) -> Self {
        Self {
            inner: Rc::new(predicate),
        }
    }

    pub fn pattern(regex: Regex) -> Self {
        Self::custom(PatternSearch { regex })
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn arity(&self) -> Arity {
        self.inner.arity()
    }

    /// Check one element, returning the difference it produces, if any.
    ///
    /// Errors raised by the predicate count as `false`; only a verdict
    /// outside the contract is reported as an error.
    pub fn check_element(&self, element: &Value) -> Result<Option<Difference>> {
        let outcome = match (self.arity(), element.resolve().as_ref()) {
            (Arity::Variadic, Value::Tuple(fields)) => self.inner.call(fields),
            _ => self.inner.call(std::slice::from_ref(element)),
        };

        let verdict = outcome.unwrap_or_else(|err| {
            log::debug!(
                "predicate '{}' raised on {}: {}; counting as false",
                self.name(),
                element,
                err
            );
            Verdict::Fail
        });

        match verdict {
            Verdict::Pass => Ok(None),
            Verdict::Fail => Ok(Some(Difference::invalid(element.clone()))),
            Verdict::Difference(diff) => Ok(Some(diff)),
            Verdict::Value(value) => {
                if value == Value::Bool(true) || value == Value::Int(1) {
                    Ok(None)
                } else if value == Value::Bool(false) || value == Value::Int(0) {
                    Ok(Some(Difference::invalid(element.clone())))
                } else {
                    Err(CheckError::predicate_contract(self.name(), value.to_string()))
                }
            }
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicate({:?})", self.name())
    }
}
