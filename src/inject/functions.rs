//! The fixed set of functions available to manifest templates.
//!
//! The set is closed: templates can call exactly these operations and
//! nothing else. Each has a fixed arity, checked at parse time.

use std::path::Path;

use anyhow::{bail, Context};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;

/// A template function name, resolved at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFn {
    /// `include <path>` reads another file as a string, relative to the
    /// template's directory.
    Include,
    /// `base64 <string>` encodes with the standard alphabet.
    Base64,
    /// `loop <n>` yields `[0, 1, .., n-1]` for repeat constructs.
    Loop,
    /// `quote <string>` wraps in a JSON string literal.
    Quote,
    /// `trim <string>` strips leading and trailing whitespace.
    Trim,
    /// `stringify <value>` serializes any value as compact JSON.
    Stringify,
    /// `env <key> <default>` reads an environment variable.
    Env,
}

impl TemplateFn {
    /// Resolve a function name, or `None` for anything outside the set.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "include" => Some(TemplateFn::Include),
            "base64" => Some(TemplateFn::Base64),
            "loop" => Some(TemplateFn::Loop),
            "quote" => Some(TemplateFn::Quote),
            "trim" => Some(TemplateFn::Trim),
            "stringify" => Some(TemplateFn::Stringify),
            "env" => Some(TemplateFn::Env),
            _ => None,
        }
    }

    /// The name templates call this function by.
    pub fn name(&self) -> &'static str {
        match self {
            TemplateFn::Include => "include",
            TemplateFn::Base64 => "base64",
            TemplateFn::Loop => "loop",
            TemplateFn::Quote => "quote",
            TemplateFn::Trim => "trim",
            TemplateFn::Stringify => "stringify",
            TemplateFn::Env => "env",
        }
    }

    /// Number of arguments the function takes.
    pub fn arity(&self) -> usize {
        match self {
            TemplateFn::Env => 2,
            _ => 1,
        }
    }

    /// Invoke the function. `base_dir` anchors `include` paths.
    pub fn call(&self, args: &[Value], base_dir: &Path) -> anyhow::Result<Value> {
        if args.len() != self.arity() {
            bail!(
                "{} takes {} argument(s), got {}",
                self.name(),
                self.arity(),
                args.len()
            );
        }
        match self {
            TemplateFn::Include => {
                let rel = coerce_str(&args[0]).context("include path")?;
                let path = base_dir.join(&rel);
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("include '{}'", path.display()))?;
                Ok(Value::String(content))
            }
            TemplateFn::Base64 => {
                let input = coerce_str(&args[0]).context("base64 input")?;
                Ok(Value::String(STANDARD.encode(input.as_bytes())))
            }
            TemplateFn::Loop => {
                let n = args[0]
                    .as_f64()
                    .with_context(|| format!("loop count, got {}", args[0]))?;
                if !(0.0..=u32::MAX as f64).contains(&n) {
                    bail!("loop count out of range: {}", n);
                }
                let items = (0..n as u32).map(Value::from).collect();
                Ok(Value::Array(items))
            }
            TemplateFn::Quote => {
                let input = coerce_str(&args[0]).context("quote input")?;
                Ok(Value::String(Value::String(input).to_string()))
            }
            TemplateFn::Trim => {
                let input = coerce_str(&args[0]).context("trim input")?;
                Ok(Value::String(input.trim().to_string()))
            }
            TemplateFn::Stringify => Ok(Value::String(args[0].to_string())),
            TemplateFn::Env => {
                let key = coerce_str(&args[0]).context("env key")?;
                let default = coerce_str(&args[1]).context("env default")?;
                let value = match std::env::var(&key) {
                    Ok(v) if !v.is_empty() => v,
                    _ => default,
                };
                Ok(Value::String(value))
            }
        }
    }
}

/// Coerce a scalar value to text for a string-typed argument.
fn coerce_str(value: &Value) -> anyhow::Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => bail!("expected a string, got {}", other),
    }
}
