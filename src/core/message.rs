//! Channel-specific message interpretation.
//!
//! Most channels pass the rendered message through untouched. The
//! `Security` channel renders its messages as a one-line subject followed by
//! tab-indented `Key:\tValue` sections; [`SecurityInterpreter`] turns that
//! layout into a nested `details` mapping.

use std::collections::HashMap;
use std::fmt;
use std::iter::Peekable;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::util::constants::{SECURITY_CHANNEL, UNPARSED_DETAILS_KEY};

/// Splits a raw rendered message into the message to keep and optional
/// structured details.
pub trait MessageInterpreter: Send + Sync {
    fn interpret(&self, message: &str) -> (String, Option<Map<String, Value>>);
}

/// Returns the message unchanged with no details.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl MessageInterpreter for PassThrough {
    fn interpret(&self, message: &str) -> (String, Option<Map<String, Value>>) {
        (message.to_string(), None)
    }
}

static PASS_THROUGH: PassThrough = PassThrough;

/// Interpreter for the Windows `Security` channel message layout.
///
/// ```text
/// An account was successfully logged on.
///
/// Subject:
///     Security ID:        S-1-5-18
///     Account Name:       DESKTOP$
///
/// Logon Type:             5
/// ```
///
/// The first non-empty line becomes the message. `Section:` lines open a
/// nested mapping for the deeper-indented lines below them, `Key:\tValue`
/// lines become entries, and deeper-indented bare values after a key form a
/// list. Anything else is collected under `unparsed`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityInterpreter;

impl MessageInterpreter for SecurityInterpreter {
    fn interpret(&self, message: &str) -> (String, Option<Map<String, Value>>) {
        let mut lines = message.lines().filter_map(Line::parse).peekable();

        let Some(subject) = lines.next() else {
            return (message.to_string(), None);
        };

        let mut unparsed = Vec::new();
        let mut details = parse_section(&mut lines, 0, &mut unparsed);
        if !unparsed.is_empty() {
            details.insert(UNPARSED_DETAILS_KEY.into(), Value::Array(unparsed));
        }

        let details = if details.is_empty() {
            None
        } else {
            Some(details)
        };
        (subject.text.to_string(), details)
    }
}

static PAIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^\t]+?):\t+(.*)$").expect("pair pattern is valid"));
static KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^\t]+):$").expect("key pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
enum LineKind<'a> {
    /// `Section:` with nothing after the colon.
    Key(&'a str),
    /// `Key:\tValue`.
    Pair(&'a str, &'a str),
    /// Anything else.
    Value,
}

#[derive(Debug, Clone)]
struct Line<'a> {
    indent: usize,
    text: &'a str,
    kind: LineKind<'a>,
}

impl<'a> Line<'a> {
    /// Classify one raw line. Blank lines yield `None`.
    fn parse(raw: &'a str) -> Option<Line<'a>> {
        let raw = raw.trim_end();
        let indent = raw.len() - raw.trim_start_matches('\t').len();
        let text = raw[indent..].trim_start();
        if text.is_empty() {
            return None;
        }

        let kind = if let Some(caps) = PAIR_RE.captures(text) {
            let key = caps.get(1).map_or("", |m| m.as_str().trim());
            let value = caps.get(2).map_or("", |m| m.as_str().trim());
            LineKind::Pair(key, value)
        } else if let Some(caps) = KEY_RE.captures(text) {
            LineKind::Key(caps.get(1).map_or("", |m| m.as_str().trim()))
        } else {
            LineKind::Value
        };

        Some(Line { indent, text, kind })
    }
}

/// Consume lines indented at least `depth` into a mapping.
fn parse_section<'a, I>(
    lines: &mut Peekable<I>,
    depth: usize,
    unparsed: &mut Vec<Value>,
) -> Map<String, Value>
where
    I: Iterator<Item = Line<'a>>,
{
    let mut map = Map::new();

    while let Some(line) = lines.next_if(|l| l.indent >= depth) {
        match line.kind {
            LineKind::Pair(key, value) => {
                let extra = take_values(lines, line.indent);
                let value = if extra.is_empty() {
                    Value::String(value.to_string())
                } else {
                    let mut list = vec![Value::String(value.to_string())];
                    list.extend(extra);
                    Value::Array(list)
                };
                map.insert(key.to_string(), value);
            }
            LineKind::Key(key) => {
                let value = match lines.peek() {
                    Some(next) if next.indent > line.indent => {
                        if next.kind == LineKind::Value {
                            Value::Array(take_values(lines, line.indent))
                        } else {
                            let nested_depth = next.indent;
                            Value::Object(parse_section(lines, nested_depth, unparsed))
                        }
                    }
                    _ => Value::String(String::new()),
                };
                map.insert(key.to_string(), value);
            }
            LineKind::Value => unparsed.push(Value::String(line.text.to_string())),
        }
    }

    map
}

/// Consume bare values indented deeper than `indent`.
fn take_values<'a, I>(lines: &mut Peekable<I>, indent: usize) -> Vec<Value>
where
    I: Iterator<Item = Line<'a>>,
{
    let mut values = Vec::new();
    while let Some(line) = lines.next_if(|l| l.indent > indent && l.kind == LineKind::Value) {
        values.push(Value::String(line.text.to_string()));
    }
    values
}

/// Interpreters keyed by channel name.
///
/// Channels without a registered interpreter use [`PassThrough`]. The
/// registry is immutable once built and can be shared across threads.
pub struct InterpreterRegistry {
    interpreters: HashMap<String, Box<dyn MessageInterpreter>>,
}

impl InterpreterRegistry {
    /// A registry with no channel-specific interpreters.
    pub fn empty() -> Self {
        Self {
            interpreters: HashMap::new(),
        }
    }

    /// Register (or replace) the interpreter for `channel`.
    pub fn register(
        &mut self,
        channel: impl Into<String>,
        interpreter: impl MessageInterpreter + 'static,
    ) {
        self.interpreters.insert(channel.into(), Box::new(interpreter));
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(
        mut self,
        channel: impl Into<String>,
        interpreter: impl MessageInterpreter + 'static,
    ) -> Self {
        self.register(channel, interpreter);
        self
    }

    /// The interpreter for `channel`, or [`PassThrough`].
    pub fn get(&self, channel: &str) -> &dyn MessageInterpreter {
        match self.interpreters.get(channel) {
            Some(interpreter) => interpreter.as_ref(),
            None => &PASS_THROUGH,
        }
    }

    /// Interpret `message` with the interpreter registered for `channel`.
    pub fn interpret(&self, channel: &str, message: &str) -> (String, Option<Map<String, Value>>) {
        self.get(channel).interpret(message)
    }
}

impl Default for InterpreterRegistry {
    fn default() -> Self {
        Self::empty().with(SECURITY_CHANNEL, SecurityInterpreter)
    }
}

impl fmt::Debug for InterpreterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut channels: Vec<&String> = self.interpreters.keys().collect();
        channels.sort();
        f.debug_struct("InterpreterRegistry")
            .field("channels", &channels)
            .finish()
    }
}
