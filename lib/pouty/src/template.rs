//! Runtime message templates.
//!
//! Templates use replacement fields in braces: `{}` takes the next
//! positional argument, `{0}` a positional argument by index and `{name}` a
//! keyword argument. Literal braces are written `{{` and `}}`. A field may
//! carry a conversion (`!s`, `!r`) and a format spec
//! `[[fill]align][0][width][.precision][type]` where align is one of `<`,
//! `>`, `^` and type one of `s`, `d`, `f`, `x`.
//!
//! Every argument must be used by the template and every field must find an
//! argument, otherwise rendering fails with a [`FormatError`].

use std::fmt::{self, Display, Formatter};

use crate::error::FormatError;

/// A value that can be interpolated into a template.
#[derive(Clone, Debug, PartialEq)]
pub enum Arg {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl Display for Arg {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match self {
            Arg::Str(value) => fmt.write_str(value),
            Arg::Int(value) => Display::fmt(value, fmt),
            Arg::UInt(value) => Display::fmt(value, fmt),
            Arg::Float(value) => Display::fmt(value, fmt),
            Arg::Bool(value) => Display::fmt(value, fmt),
        }
    }
}

impl Arg {
    /// Capture anything printable as a string argument.
    pub fn display(value: impl Display) -> Arg {
        Arg::Str(value.to_string())
    }

    fn is_numeric(&self) -> bool {
        matches!(self, Arg::Int(_) | Arg::UInt(_) | Arg::Float(_))
    }

    fn repr(&self) -> String {
        match self {
            Arg::Str(value) => format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'")),
            other => other.to_string(),
        }
    }
}

macro_rules! arg_from {
    ($variant:ident as $target:ty: $( $source:ty ),*) => {
        $(
            impl From<$source> for Arg {
                fn from(value: $source) -> Arg {
                    Arg::$variant(value as $target)
                }
            }
        )*
    };
}

arg_from!(Int as i64: i8, i16, i32, i64, isize);
arg_from!(UInt as u64: u8, u16, u32, u64, usize);
arg_from!(Float as f64: f32, f64);

impl From<bool> for Arg {
    fn from(value: bool) -> Arg {
        Arg::Bool(value)
    }
}

impl From<char> for Arg {
    fn from(value: char) -> Arg {
        Arg::Str(value.to_string())
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Arg {
        Arg::Str(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Arg {
        Arg::Str(value)
    }
}

impl From<&String> for Arg {
    fn from(value: &String) -> Arg {
        Arg::Str(value.clone())
    }
}

impl From<&std::path::Path> for Arg {
    fn from(value: &std::path::Path) -> Arg {
        Arg::Str(value.display().to_string())
    }
}

impl From<&std::path::PathBuf> for Arg {
    fn from(value: &std::path::PathBuf) -> Arg {
        Arg::Str(value.display().to_string())
    }
}

/// Positional and keyword arguments for one template.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Args {
    positional: Vec<Arg>,
    named: Vec<(String, Arg)>,
}

impl Args {
    pub fn new() -> Args {
        Args::default()
    }

    pub fn arg(mut self, value: impl Into<Arg>) -> Args {
        self.push(value);
        self
    }

    pub fn named(mut self, name: impl Into<String>, value: impl Into<Arg>) -> Args {
        self.insert(name, value);
        self
    }

    pub fn push(&mut self, value: impl Into<Arg>) {
        self.positional.push(value.into());
    }

    /// Set a keyword argument, replacing any earlier value for `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Arg>) {
        let name = name.into();
        let value = value.into();
        match self.named.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.named.push((name, value)),
        }
    }

    pub fn positional(&self) -> &[Arg] {
        &self.positional
    }

    pub fn get(&self, name: &str) -> Option<&Arg> {
        self.named.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

/// Build [`Args`]: positional values first, then keyword values after `;`.
///
/// ```
/// let args = pouty::args![42, "items"; key = "token"];
/// assert_eq!(2, args.positional().len());
/// ```
#[macro_export]
macro_rules! args {
    ($( $pos:expr ),* $(,)? $( ; $( $name:ident = $value:expr ),* $(,)? )?) => {{
        #[allow(unused_mut)]
        let mut args = $crate::Args::new();
        $( args.push($pos); )*
        $( $( args.insert(stringify!($name), $value); )* )?
        args
    }};
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Key {
    Index(usize),
    Name(String),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Conversion {
    Str,
    Repr,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
}

impl Align {
    fn from_char(ch: char) -> Option<Align> {
        match ch {
            '<' => Some(Align::Left),
            '>' => Some(Align::Right),
            '^' => Some(Align::Center),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Spec {
    fill: char,
    align: Option<Align>,
    zero: bool,
    width: usize,
    precision: Option<usize>,
    kind: Option<char>,
}

impl Default for Spec {
    fn default() -> Spec {
        Spec {
            fill: ' ',
            align: None,
            zero: false,
            width: 0,
            precision: None,
            kind: None,
        }
    }
}

impl Spec {
    fn parse(spec: &str) -> Option<Spec> {
        let chars: Vec<char> = spec.chars().collect();
        let mut parsed = Spec::default();
        let mut i = 0;

        if let Some(align) = chars.get(1).copied().and_then(Align::from_char) {
            parsed.fill = chars[0];
            parsed.align = Some(align);
            i = 2;
        } else if let Some(align) = chars.first().copied().and_then(Align::from_char) {
            parsed.align = Some(align);
            i = 1;
        }

        if chars.get(i) == Some(&'0') {
            parsed.zero = true;
            i += 1;
        }

        let (width, next) = digits(&chars, i);
        parsed.width = width.unwrap_or(0);
        i = next;

        if chars.get(i) == Some(&'.') {
            let (precision, next) = digits(&chars, i + 1);
            parsed.precision = Some(precision?);
            i = next;
        }

        if let Some(&kind) = chars.get(i) {
            if !"sdfx".contains(kind) {
                return None;
            }
            parsed.kind = Some(kind);
            i += 1;
        }

        if i == chars.len() {
            Some(parsed)
        } else {
            None
        }
    }

    fn apply(&self, arg: &Arg) -> Option<String> {
        let body = match (self.kind, arg) {
            (None, Arg::Float(value)) | (Some('f'), Arg::Float(value)) => match self.precision {
                Some(precision) => format!("{:.*}", precision, value),
                None if self.kind.is_some() => format!("{:.6}", value),
                None => value.to_string(),
            },
            (Some('f'), Arg::Int(value)) => {
                format!("{:.*}", self.precision.unwrap_or(6), *value as f64)
            }
            (Some('f'), Arg::UInt(value)) => {
                format!("{:.*}", self.precision.unwrap_or(6), *value as f64)
            }
            (None, Arg::Str(value)) | (Some('s'), Arg::Str(value)) => match self.precision {
                Some(precision) => value.chars().take(precision).collect(),
                None => value.clone(),
            },
            (_, Arg::Int(_)) | (_, Arg::UInt(_)) | (_, Arg::Bool(_)) if self.precision.is_some() => {
                return None
            }
            (None, other) => other.to_string(),
            (Some('d'), Arg::Int(value)) => value.to_string(),
            (Some('d'), Arg::UInt(value)) => value.to_string(),
            (Some('d'), Arg::Bool(value)) => (*value as u8).to_string(),
            (Some('x'), Arg::Int(value)) if *value < 0 => format!("-{:x}", value.unsigned_abs()),
            (Some('x'), Arg::Int(value)) => format!("{:x}", value),
            (Some('x'), Arg::UInt(value)) => format!("{:x}", value),
            _ => return None,
        };

        let numeric = arg.is_numeric() && self.kind != Some('s');
        let boolean = matches!(arg, Arg::Bool(_)) && self.kind != Some('s');
        // bools align like numbers but only zero-fill when shown as digits
        if self.zero && !numeric && !(boolean && self.kind == Some('d')) {
            return None;
        }

        Some(self.pad(body, numeric || boolean))
    }

    fn pad(&self, body: String, numeric: bool) -> String {
        let len = body.chars().count();
        if len >= self.width {
            return body;
        }
        let missing = self.width - len;

        if self.zero && self.align.is_none() {
            let (sign, digits) = match body.strip_prefix('-') {
                Some(digits) => ("-", digits),
                None => ("", body.as_str()),
            };
            return format!("{}{}{}", sign, "0".repeat(missing), digits);
        }

        let fill = |n: usize| self.fill.to_string().repeat(n);
        let default_align = if numeric { Align::Right } else { Align::Left };
        match self.align.unwrap_or(default_align) {
            Align::Left => format!("{}{}", body, fill(missing)),
            Align::Right => format!("{}{}", fill(missing), body),
            Align::Center => {
                let left = missing / 2;
                format!("{}{}{}", fill(left), body, fill(missing - left))
            }
        }
    }
}

fn digits(chars: &[char], start: usize) -> (Option<usize>, usize) {
    let mut end = start;
    while chars.get(end).map_or(false, char::is_ascii_digit) {
        end += 1;
    }
    if end == start {
        return (None, start);
    }
    let number: String = chars[start..end].iter().collect();
    (number.parse().ok(), end)
}

#[derive(Clone, Debug, PartialEq)]
struct Field {
    source: String,
    key: Key,
    conversion: Option<Conversion>,
    spec: Spec,
}

#[derive(Clone, Debug, PartialEq)]
enum Segment {
    Literal(String),
    Field(Field),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Numbering {
    Auto,
    Manual,
}

/// A parsed template, reusable across renders.
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Template, FormatError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut numbering = None;
        let mut next_auto = 0;

        let mut chars = source.char_indices().peekable();
        while let Some((offset, ch)) = chars.next() {
            match ch {
                '{' if chars.peek().map(|&(_, c)| c) == Some('{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek().map(|&(_, c)| c) == Some('}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(FormatError::UnmatchedBrace { brace: '}', offset }),
                '{' => {
                    let mut body = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        match c {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => return Err(FormatError::InvalidField(format!("{{{}{{", body))),
                            c => body.push(c),
                        }
                    }
                    if !closed {
                        return Err(FormatError::UnmatchedBrace { brace: '{', offset });
                    }

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    let field = parse_field(&body, &mut numbering, &mut next_auto)?;
                    segments.push(Segment::Field(field));
                }
                c => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Template { segments })
    }

    pub fn field_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| matches!(segment, Segment::Field(_)))
            .count()
    }

    pub fn render(&self, args: &Args) -> Result<String, FormatError> {
        let mut used_positional = vec![false; args.positional.len()];
        let mut used_named = vec![false; args.named.len()];
        let mut output = String::new();

        for segment in &self.segments {
            let field = match segment {
                Segment::Literal(text) => {
                    output.push_str(text);
                    continue;
                }
                Segment::Field(field) => field,
            };

            let value = match &field.key {
                Key::Index(index) => {
                    let value = args
                        .positional
                        .get(*index)
                        .ok_or(FormatError::MissingPositional(*index))?;
                    used_positional[*index] = true;
                    value
                }
                Key::Name(name) => {
                    let index = args
                        .named
                        .iter()
                        .position(|(n, _)| n == name)
                        .ok_or_else(|| FormatError::MissingNamed(name.clone()))?;
                    used_named[index] = true;
                    &args.named[index].1
                }
            };

            let converted;
            let value = match field.conversion {
                None => value,
                Some(Conversion::Str) => {
                    converted = Arg::Str(value.to_string());
                    &converted
                }
                Some(Conversion::Repr) => {
                    converted = Arg::Str(value.repr());
                    &converted
                }
            };

            let text = field.spec.apply(value).ok_or_else(|| FormatError::InvalidSpec {
                field: field.source.clone(),
                spec: field
                    .source
                    .splitn(2, ':')
                    .nth(1)
                    .unwrap_or_default()
                    .to_string(),
            })?;
            output.push_str(&text);
        }

        let unused = used_positional.iter().filter(|used| !**used).count();
        if unused > 0 {
            return Err(FormatError::UnusedPositional(unused));
        }
        if let Some(index) = used_named.iter().position(|used| !used) {
            return Err(FormatError::UnusedNamed(args.named[index].0.clone()));
        }

        Ok(output)
    }
}

fn parse_field(
    body: &str,
    numbering: &mut Option<Numbering>,
    next_auto: &mut usize,
) -> Result<Field, FormatError> {
    let invalid = || FormatError::InvalidField(body.to_string());

    let (name, rest) = match body.find(|c: char| c == '!' || c == ':') {
        Some(split) => (&body[..split], &body[split..]),
        None => (body, ""),
    };

    let (conversion, spec) = if let Some(rest) = rest.strip_prefix('!') {
        let mut chars = rest.chars();
        let conversion = match chars.next() {
            Some('s') => Conversion::Str,
            Some('r') => Conversion::Repr,
            _ => return Err(invalid()),
        };
        let after = chars.as_str();
        if after.is_empty() {
            (Some(conversion), "")
        } else {
            (Some(conversion), after.strip_prefix(':').ok_or_else(invalid)?)
        }
    } else {
        (None, rest.strip_prefix(':').unwrap_or(""))
    };

    let key = if name.is_empty() {
        if *numbering == Some(Numbering::Manual) {
            return Err(FormatError::MixedNumbering);
        }
        *numbering = Some(Numbering::Auto);
        *next_auto += 1;
        Key::Index(*next_auto - 1)
    } else if name.chars().all(|c| c.is_ascii_digit()) {
        if *numbering == Some(Numbering::Auto) {
            return Err(FormatError::MixedNumbering);
        }
        *numbering = Some(Numbering::Manual);
        Key::Index(name.parse().map_err(|_| invalid())?)
    } else if is_identifier(name) {
        Key::Name(name.to_string())
    } else {
        return Err(invalid());
    };

    let spec = Spec::parse(spec).ok_or_else(|| FormatError::InvalidSpec {
        field: body.to_string(),
        spec: spec.to_string(),
    })?;

    Ok(Field {
        source: body.to_string(),
        key,
        conversion,
        spec,
    })
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Parse and render in one step.
pub fn render(template: &str, args: &Args) -> Result<String, FormatError> {
    Template::parse(template)?.render(args)
}
