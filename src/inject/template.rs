//! Text templating over `{{ }}` actions.
//!
//! Manifest files are treated as text templates. Everything outside `{{ }}`
//! passes through untouched; inside an action the engine evaluates a small
//! pipeline language against the injector scope:
//!
//! - `{{.dotted.path}}` looks a value up in the scope
//! - `{{fn arg ...}}` calls one of the functions in [`TemplateFn`]
//! - `{{expr | fn | fn arg}}` pipes a value through stages, appended as the
//!   final argument of each stage
//! - `{{range expr}} body {{end}}` repeats the body over an array value,
//!   binding `.` to the element
//!
//! The function set is closed and arities are checked at parse time.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{Result, RiggerError};
use crate::inject::functions::TemplateFn;

macro_rules! lazy_regex {
    ($name:ident, $pattern:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($pattern).unwrap());
    };
}

lazy_regex!(
    RE_TOKEN,
    r#"^(?:(?P<pipe>\|)|(?P<str>"(?:[^"\\]|\\.)*")|(?P<num>-?\d+(?:\.\d+)?)|(?P<path>\.[A-Za-z0-9_.-]*)|(?P<ident>[A-Za-z_][A-Za-z0-9_]*))"#
);

/// One token inside a `{{ }}` action.
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Pipe,
    Str(String),
    Num(Value),
    /// Dotted lookup path; empty means `.` itself.
    Path(Vec<String>),
    Ident(String),
}

/// An evaluatable expression.
#[derive(Debug, Clone)]
enum Expr {
    /// The current value (`.`): the whole scope at top level, the bound
    /// element inside a range body.
    Dot,
    Path(Vec<String>),
    Str(String),
    Num(Value),
    Call(TemplateFn, Vec<Expr>),
}

/// A head expression piped through zero or more function stages.
#[derive(Debug, Clone)]
struct Pipeline {
    head: Expr,
    stages: Vec<(TemplateFn, Vec<Expr>)>,
}

/// A parsed piece of the template.
#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Action(Pipeline),
    Range(Pipeline, Vec<Segment>),
}

enum RawItem {
    Literal(String),
    Action(Vec<Token>),
}

/// A parsed template, ready to render against a scope.
#[derive(Debug)]
pub struct Template {
    segments: Vec<Segment>,
    source: PathBuf,
}

impl Template {
    /// Parse template source. `path` labels parse and render errors.
    pub fn parse(source: &str, path: &Path) -> Result<Self> {
        let raw = scan_raw(source, path)?;
        let mut items = raw.into_iter();
        let (segments, _) = build_block(&mut items, false, path)?;
        Ok(Template {
            segments,
            source: path.to_path_buf(),
        })
    }

    /// Render against the scope. `base_dir` anchors `include` paths.
    pub fn render(&self, scope: &Map<String, Value>, base_dir: &Path) -> Result<String> {
        let renderer = Renderer {
            root: scope,
            base_dir,
            source: &self.source,
        };
        let mut out = String::new();
        renderer.render(&self.segments, None, &mut out)?;
        Ok(out)
    }
}

// --- Scanning ---

/// Split the source into literal runs and action token lists.
fn scan_raw(source: &str, path: &Path) -> Result<Vec<RawItem>> {
    let mut items = Vec::new();
    let mut rest = source;
    loop {
        match rest.find("{{") {
            None => {
                if !rest.is_empty() {
                    items.push(RawItem::Literal(rest.to_string()));
                }
                break;
            }
            Some(start) => {
                if start > 0 {
                    items.push(RawItem::Literal(rest[..start].to_string()));
                }
                let after = &rest[start + 2..];
                let end = after
                    .find("}}")
                    .ok_or_else(|| parse_error(path, "unclosed action"))?;
                let tokens = lex_action(&after[..end]).map_err(|m| parse_error(path, m))?;
                if tokens.is_empty() {
                    return Err(parse_error(path, "empty action"));
                }
                items.push(RawItem::Action(tokens));
                rest = &after[end + 2..];
            }
        }
    }
    Ok(items)
}

fn lex_action(body: &str) -> std::result::Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut rest = body.trim_start();
    while !rest.is_empty() {
        let caps = RE_TOKEN
            .captures(rest)
            .ok_or_else(|| format!("unexpected token at '{}'", truncate(rest)))?;
        let token = if caps.name("pipe").is_some() {
            Token::Pipe
        } else if let Some(m) = caps.name("str") {
            Token::Str(unquote(m.as_str())?)
        } else if let Some(m) = caps.name("num") {
            let value: Value = serde_json::from_str(m.as_str())
                .map_err(|_| format!("invalid number '{}'", m.as_str()))?;
            Token::Num(value)
        } else if let Some(m) = caps.name("path") {
            Token::Path(parse_path(m.as_str())?)
        } else if let Some(m) = caps.name("ident") {
            Token::Ident(m.as_str().to_string())
        } else {
            return Err(format!("unexpected token at '{}'", truncate(rest)));
        };
        let consumed = caps.get(0).map(|m| m.end()).unwrap_or(rest.len());
        tokens.push(token);
        rest = rest[consumed..].trim_start();
    }
    Ok(tokens)
}

fn truncate(s: &str) -> &str {
    let end = s
        .char_indices()
        .nth(16)
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    &s[..end]
}

fn unquote(raw: &str) -> std::result::Result<String, String> {
    let inner = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => return Err("dangling escape in string literal".into()),
        }
    }
    Ok(out)
}

fn parse_path(raw: &str) -> std::result::Result<Vec<String>, String> {
    let trimmed = &raw[1..];
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let mut segments = Vec::new();
    for seg in trimmed.split('.') {
        if seg.is_empty() {
            return Err(format!("invalid path '{raw}'"));
        }
        segments.push(seg.to_string());
    }
    Ok(segments)
}

// --- Parsing ---

fn build_block(
    items: &mut std::vec::IntoIter<RawItem>,
    in_range: bool,
    path: &Path,
) -> Result<(Vec<Segment>, bool)> {
    let mut segments = Vec::new();
    while let Some(item) = items.next() {
        match item {
            RawItem::Literal(text) => segments.push(Segment::Literal(text)),
            RawItem::Action(tokens) => {
                if tokens == [Token::Ident("end".to_string())] {
                    if in_range {
                        return Ok((segments, true));
                    }
                    return Err(parse_error(path, "'end' outside a range block"));
                }
                if let Some(Token::Ident(first)) = tokens.first() {
                    if first == "range" {
                        let pipeline =
                            parse_pipeline(&tokens[1..]).map_err(|m| parse_error(path, m))?;
                        let (body, saw_end) = build_block(items, true, path)?;
                        if !saw_end {
                            return Err(parse_error(path, "range block missing 'end'"));
                        }
                        segments.push(Segment::Range(pipeline, body));
                        continue;
                    }
                }
                let pipeline = parse_pipeline(&tokens).map_err(|m| parse_error(path, m))?;
                segments.push(Segment::Action(pipeline));
            }
        }
    }
    if in_range {
        return Err(parse_error(path, "range block missing 'end'"));
    }
    Ok((segments, false))
}

fn parse_pipeline(tokens: &[Token]) -> std::result::Result<Pipeline, String> {
    let mut groups = tokens.split(|t| *t == Token::Pipe);
    let head_tokens = groups.next().unwrap_or_default();
    let head = parse_head(head_tokens)?;
    let mut stages = Vec::new();
    for group in groups {
        stages.push(parse_stage(group)?);
    }
    Ok(Pipeline { head, stages })
}

fn parse_head(tokens: &[Token]) -> std::result::Result<Expr, String> {
    match tokens {
        [] => Err("expected an expression".into()),
        [Token::Ident(name), args @ ..] => {
            let (func, args) = resolve_call(name, args)?;
            if args.len() != func.arity() {
                return Err(format!(
                    "'{}' takes {} argument(s), got {}",
                    func.name(),
                    func.arity(),
                    args.len()
                ));
            }
            Ok(Expr::Call(func, args))
        }
        [single] => primary(single),
        _ => Err("expected a single value or a function call".into()),
    }
}

fn parse_stage(tokens: &[Token]) -> std::result::Result<(TemplateFn, Vec<Expr>), String> {
    match tokens {
        [Token::Ident(name), args @ ..] => {
            let (func, args) = resolve_call(name, args)?;
            if args.len() + 1 != func.arity() {
                return Err(format!(
                    "'{}' takes {} argument(s), got {} plus the piped value",
                    func.name(),
                    func.arity(),
                    args.len()
                ));
            }
            Ok((func, args))
        }
        _ => Err("expected a function after '|'".into()),
    }
}

fn resolve_call(
    name: &str,
    arg_tokens: &[Token],
) -> std::result::Result<(TemplateFn, Vec<Expr>), String> {
    let func = TemplateFn::from_name(name).ok_or_else(|| format!("unknown function '{name}'"))?;
    let args = arg_tokens.iter().map(primary).collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((func, args))
}

fn primary(token: &Token) -> std::result::Result<Expr, String> {
    match token {
        Token::Path(segs) if segs.is_empty() => Ok(Expr::Dot),
        Token::Path(segs) => Ok(Expr::Path(segs.clone())),
        Token::Str(s) => Ok(Expr::Str(s.clone())),
        Token::Num(v) => Ok(Expr::Num(v.clone())),
        Token::Ident(name) => Err(format!("unexpected identifier '{name}'")),
        Token::Pipe => Err("unexpected '|'".into()),
    }
}

fn parse_error(path: &Path, message: impl Into<String>) -> RiggerError {
    RiggerError::TemplateParse {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

// --- Rendering ---

struct Renderer<'a> {
    root: &'a Map<String, Value>,
    base_dir: &'a Path,
    source: &'a Path,
}

impl Renderer<'_> {
    fn render(&self, segments: &[Segment], dot: Option<&Value>, out: &mut String) -> Result<()> {
        for segment in segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Action(pipeline) => {
                    let value = self.eval_pipeline(pipeline, dot)?;
                    out.push_str(&render_value(&value));
                }
                Segment::Range(pipeline, body) => {
                    let value = self.eval_pipeline(pipeline, dot)?;
                    let items = value.as_array().ok_or_else(|| {
                        self.render_error(format!("range over non-array value {value}"))
                    })?;
                    for item in items {
                        self.render(body, Some(item), out)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn eval_pipeline(&self, pipeline: &Pipeline, dot: Option<&Value>) -> Result<Value> {
        let mut value = self.eval_expr(&pipeline.head, dot)?;
        for (func, args) in &pipeline.stages {
            let mut argv = Vec::with_capacity(args.len() + 1);
            for arg in args {
                argv.push(self.eval_expr(arg, dot)?);
            }
            argv.push(value);
            value = func
                .call(&argv, self.base_dir)
                .map_err(|e| self.render_error(format!("{e:#}")))?;
        }
        Ok(value)
    }

    fn eval_expr(&self, expr: &Expr, dot: Option<&Value>) -> Result<Value> {
        match expr {
            Expr::Dot => Ok(match dot {
                Some(value) => (*value).clone(),
                None => Value::Object(self.root.clone()),
            }),
            Expr::Path(segments) => self.resolve_path(segments, dot),
            Expr::Str(s) => Ok(Value::String(s.clone())),
            Expr::Num(v) => Ok(v.clone()),
            Expr::Call(func, args) => {
                let mut argv = Vec::with_capacity(args.len());
                for arg in args {
                    argv.push(self.eval_expr(arg, dot)?);
                }
                func.call(&argv, self.base_dir)
                    .map_err(|e| self.render_error(format!("{e:#}")))
            }
        }
    }

    fn resolve_path(&self, segments: &[String], dot: Option<&Value>) -> Result<Value> {
        let mut current: Option<&Value> = None;
        for (i, seg) in segments.iter().enumerate() {
            let next = if i == 0 {
                match dot {
                    Some(value) => value.get(seg),
                    None => self.root.get(seg),
                }
            } else {
                current.and_then(|v| v.get(seg))
            };
            match next {
                Some(value) => current = Some(value),
                None => {
                    return Err(
                        self.render_error(format!("no value for '.{}'", segments.join(".")))
                    )
                }
            }
        }
        Ok(current.cloned().unwrap_or(Value::Null))
    }

    fn render_error(&self, message: String) -> RiggerError {
        RiggerError::TemplateRender {
            path: self.source.to_path_buf(),
            message,
        }
    }
}

/// Interpolated form of a value: strings verbatim, everything else as
/// compact JSON.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
