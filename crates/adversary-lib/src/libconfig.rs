//! libconfig documents
//!
//! The simulator reads its configuration with libconfig, so templates arrive
//! as `.cfg` files and generated job configurations must leave as `.cfg`
//! files. Documents are exchanged as `serde_json` maps: groups become
//! objects, arrays and lists become arrays.
//!
//! Integers outside the 32-bit range are written with the `L` suffix, and
//! floats always carry a decimal point or exponent so libconfig keeps their
//! type.

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_until, take_while, take_while1, take_while_m_n},
    character::complete::{char, digit0, digit1, hex_digit1, multispace1, not_line_ending, one_of, satisfy},
    combinator::{all_consuming, cut, map, map_res, opt, recognize, value},
    multi::{fold_many0, many0_count, separated_list0},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};
use serde_json::{Map, Number, Value};
use std::fmt::Write as _;
use std::path::Path;
use thiserror::Error;

/// File extension libconfig documents use
pub const EXTENSION: &str = "cfg";

const INDENT: &str = "    ";

#[derive(Error, Debug, PartialEq)]
pub enum LibconfigError {
    #[error("libconfig syntax error on line {line}")]
    Syntax { line: usize },

    #[error("Cannot write {kind} at '{path}' as libconfig")]
    Unrepresentable { path: String, kind: &'static str },
}

/// Whether `path` names a libconfig document
pub fn is_libconfig_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(EXTENSION))
}

/// Parse a libconfig document into its top-level settings
pub fn from_str(text: &str) -> Result<Map<String, Value>, LibconfigError> {
    match all_consuming(terminated(settings, skip))(text) {
        Ok((_, root)) => Ok(root),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(LibconfigError::Syntax {
            line: line_of(text, e.input),
        }),
        Err(nom::Err::Incomplete(_)) => Err(LibconfigError::Syntax {
            line: text.lines().count().max(1),
        }),
    }
}

/// Render top-level settings as a libconfig document
pub fn to_string(root: &Map<String, Value>) -> Result<String, LibconfigError> {
    let mut out = String::new();
    write_settings(&mut out, root, 0, "")?;
    Ok(out)
}

fn line_of(text: &str, rest: &str) -> usize {
    let consumed = text.len() - rest.len();
    text[..consumed].matches('\n').count() + 1
}

// ---- reading ----

/// Whitespace and `#`, `//` and `/* */` comments
fn skip(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0_count(alt((
            value((), multispace1),
            value((), pair(alt((tag("#"), tag("//"))), not_line_ending)),
            value((), tuple((tag("/*"), take_until("*/"), tag("*/")))),
        ))),
    )(input)
}

fn name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '*'),
        take_while(is_name_char),
    ))(input)
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '*')
}

fn settings(input: &str) -> IResult<&str, Map<String, Value>> {
    fold_many0(setting, Map::new, |mut map, (key, value)| {
        map.insert(key.to_string(), value);
        map
    })(input)
}

fn setting(input: &str) -> IResult<&str, (&str, Value)> {
    let (input, key) = preceded(skip, name)(input)?;
    let (input, _) = cut(preceded(skip, one_of("=:")))(input)?;
    let (input, value) = cut(setting_value)(input)?;
    let (input, _) = opt(preceded(skip, one_of(";,")))(input)?;
    Ok((input, (key, value)))
}

fn setting_value(input: &str) -> IResult<&str, Value> {
    preceded(skip, alt((group, array, list, scalar)))(input)
}

fn group(input: &str) -> IResult<&str, Value> {
    map(
        delimited(char('{'), settings, preceded(skip, char('}'))),
        Value::Object,
    )(input)
}

fn array(input: &str) -> IResult<&str, Value> {
    map(
        delimited(
            char('['),
            separated_list0(preceded(skip, char(',')), preceded(skip, scalar)),
            preceded(skip, char(']')),
        ),
        Value::Array,
    )(input)
}

fn list(input: &str) -> IResult<&str, Value> {
    map(
        delimited(
            char('('),
            separated_list0(preceded(skip, char(',')), setting_value),
            preceded(skip, char(')')),
        ),
        Value::Array,
    )(input)
}

fn scalar(input: &str) -> IResult<&str, Value> {
    alt((
        map(boolean, Value::Bool),
        map(string, Value::String),
        float,
        hex_integer,
        integer,
    ))(input)
}

fn boolean(input: &str) -> IResult<&str, bool> {
    alt((
        value(true, tag_no_case("true")),
        value(false, tag_no_case("false")),
    ))(input)
}

fn exponent(input: &str) -> IResult<&str, &str> {
    recognize(tuple((one_of("eE"), opt(one_of("+-")), digit1)))(input)
}

fn float(input: &str) -> IResult<&str, Value> {
    let literal = recognize(pair(
        opt(one_of("+-")),
        alt((
            recognize(tuple((digit1, char('.'), digit0, opt(exponent)))),
            recognize(tuple((char('.'), digit1, opt(exponent)))),
            recognize(pair(digit1, exponent)),
        )),
    ));
    map_res(literal, |s: &str| {
        s.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or(())
    })(input)
}

fn integer_suffix(input: &str) -> IResult<&str, Option<&str>> {
    opt(alt((tag_no_case("LL"), tag_no_case("L"))))(input)
}

fn integer(input: &str) -> IResult<&str, Value> {
    map_res(
        terminated(recognize(pair(opt(one_of("+-")), digit1)), integer_suffix),
        |s: &str| s.parse::<i64>().map(Value::from),
    )(input)
}

fn hex_integer(input: &str) -> IResult<&str, Value> {
    map_res(
        delimited(tag_no_case("0x"), hex_digit1, integer_suffix),
        |s: &str| i64::from_str_radix(s, 16).map(Value::from),
    )(input)
}

enum Fragment<'a> {
    Literal(&'a str),
    Escaped(char),
}

fn escaped(input: &str) -> IResult<&str, char> {
    preceded(
        char('\\'),
        alt((
            value('\\', char('\\')),
            value('"', char('"')),
            value('\n', char('n')),
            value('\r', char('r')),
            value('\t', char('t')),
            value('\u{0c}', char('f')),
            map_res(
                preceded(char('x'), take_while_m_n(2, 2, |c: char| c.is_ascii_hexdigit())),
                |hex: &str| u8::from_str_radix(hex, 16).map(char::from),
            ),
        )),
    )(input)
}

fn quoted(input: &str) -> IResult<&str, String> {
    let fragment = alt((
        map(take_while1(|c: char| c != '"' && c != '\\'), Fragment::Literal),
        map(escaped, Fragment::Escaped),
    ));
    delimited(
        char('"'),
        fold_many0(fragment, String::new, |mut s, fragment| {
            match fragment {
                Fragment::Literal(text) => s.push_str(text),
                Fragment::Escaped(c) => s.push(c),
            }
            s
        }),
        char('"'),
    )(input)
}

/// Adjacent string literals are concatenated
fn string(input: &str) -> IResult<&str, String> {
    let (input, first) = quoted(input)?;
    fold_many0(preceded(skip, quoted), move || first.clone(), |mut s, next| {
        s.push_str(&next);
        s
    })(input)
}

// ---- writing ----

fn write_settings(
    out: &mut String,
    map: &Map<String, Value>,
    depth: usize,
    path: &str,
) -> Result<(), LibconfigError> {
    for (key, value) in map {
        let child = if path.is_empty() {
            key.clone()
        } else {
            format!("{path}.{key}")
        };
        if !is_valid_name(key) {
            return Err(LibconfigError::Unrepresentable {
                path: child,
                kind: "setting name",
            });
        }
        out.push_str(&INDENT.repeat(depth));
        out.push_str(key);
        out.push_str(" = ");
        write_value(out, value, depth, &child)?;
        out.push_str(";\n");
    }
    Ok(())
}

fn write_value(
    out: &mut String,
    value: &Value,
    depth: usize,
    path: &str,
) -> Result<(), LibconfigError> {
    match value {
        Value::Null => {
            return Err(LibconfigError::Unrepresentable {
                path: path.to_string(),
                kind: "null",
            })
        }
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => write_number(out, n, path)?,
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            // Homogeneous scalars form an array, anything else a list
            let (open, close) = match scalar_kind(items) {
                Some(_) => ("[ ", " ]"),
                None => ("( ", " )"),
            };
            if items.is_empty() {
                out.push_str(open.trim_end());
                out.push_str(close);
                return Ok(());
            }
            out.push_str(open);
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item, depth, &format!("{path}[{i}]"))?;
            }
            out.push_str(close);
        }
        Value::Object(map) => {
            out.push_str("{\n");
            write_settings(out, map, depth + 1, path)?;
            out.push_str(&INDENT.repeat(depth));
            out.push('}');
        }
    }
    Ok(())
}

#[derive(PartialEq, Clone, Copy)]
enum ScalarKind {
    Bool,
    Integer,
    Float,
    String,
}

fn kind_of(value: &Value) -> Option<ScalarKind> {
    match value {
        Value::Bool(_) => Some(ScalarKind::Bool),
        Value::Number(n) if n.is_f64() => Some(ScalarKind::Float),
        Value::Number(_) => Some(ScalarKind::Integer),
        Value::String(_) => Some(ScalarKind::String),
        _ => None,
    }
}

/// Shared scalar kind of `items`; an empty array counts as scalar
fn scalar_kind(items: &[Value]) -> Option<Option<ScalarKind>> {
    let mut kinds = items.iter().map(kind_of);
    match kinds.next() {
        None => Some(None),
        Some(None) => None,
        Some(first) => kinds.all(|k| k == first).then_some(first),
    }
}

fn write_number(out: &mut String, n: &Number, path: &str) -> Result<(), LibconfigError> {
    if let Some(i) = n.as_i64() {
        if i32::try_from(i).is_ok() {
            let _ = write!(out, "{i}");
        } else {
            let _ = write!(out, "{i}L");
        }
    } else if n.is_u64() {
        return Err(LibconfigError::Unrepresentable {
            path: path.to_string(),
            kind: "integer above the 64-bit signed range",
        });
    } else if let Some(f) = n.as_f64() {
        // Debug formatting keeps the decimal point on integral values
        let _ = write!(out, "{f:?}");
    }
    Ok(())
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn is_valid_name(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '*')
        && chars.all(is_name_char)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DOCUMENT: &str = r#"
# Simulator configuration
policy = "fcfs";

application = {
    name = "echo"; // inline comment
    max_attack_job_size_ns = 1000.0;
    seed = 0x1F;
};

/* traffic
   sources */
innocent_traffic :
{
    rate_bps = 10000000000L;
    trace = "caida/" "2019.packets";
    enabled = TRUE
};

ports = [ 80, 443 ];
mixed = ( 1, "two", { three = 3.5e1; } );
"#;

    #[test]
    fn test_parse_document() {
        let root = from_str(DOCUMENT).unwrap();

        assert_eq!(root["policy"], "fcfs");
        assert_eq!(root["application"]["name"], "echo");
        assert_eq!(root["application"]["max_attack_job_size_ns"], 1000.0);
        assert!(root["application"]["max_attack_job_size_ns"].is_f64());
        assert_eq!(root["application"]["seed"], 31);
        assert_eq!(root["innocent_traffic"]["rate_bps"], 10_000_000_000i64);
        assert_eq!(root["innocent_traffic"]["trace"], "caida/2019.packets");
        assert_eq!(root["innocent_traffic"]["enabled"], true);
        assert_eq!(root["ports"], json!([80, 443]));
        assert_eq!(root["mixed"], json!([1, "two", {"three": 35.0}]));
    }

    #[test]
    fn test_parse_string_escapes() {
        let root = from_str(r#"path = "a\"b\\c\n\x41";"#).unwrap();
        assert_eq!(root["path"], "a\"b\\c\nA");
    }

    #[test]
    fn test_syntax_error_reports_line() {
        let err = from_str("a = 1;\nb = 2;\nc = ;\n").unwrap_err();
        assert_eq!(err, LibconfigError::Syntax { line: 3 });

        let err = from_str("a = { b = 1;\n").unwrap_err();
        assert!(matches!(err, LibconfigError::Syntax { .. }));
    }

    #[test]
    fn test_written_document_reads_back() {
        let root = from_str(DOCUMENT).unwrap();
        let written = to_string(&root).unwrap();
        assert_eq!(from_str(&written).unwrap(), root);
    }

    #[test]
    fn test_write_keeps_value_types() {
        let root = json!({
            "job_size_ns": 1600.0,
            "packet_size_bits": 8192,
            "rate_bps": 10_000_000_000u64,
            "flags": [],
            "label": "tab\there",
            "group": { "nested": true }
        });
        let Value::Object(root) = root else { unreachable!() };
        let written = to_string(&root).unwrap();

        assert!(written.contains("job_size_ns = 1600.0;\n"));
        assert!(written.contains("packet_size_bits = 8192;\n"));
        assert!(written.contains("rate_bps = 10000000000L;\n"));
        assert!(written.contains("flags = [ ];\n"));
        assert!(written.contains("label = \"tab\\there\";\n"));
        assert!(written.contains("group = {\n    nested = true;\n};\n"));
    }

    #[test]
    fn test_write_rejects_null_and_bad_names() {
        let Value::Object(root) = json!({"attack_traffic": {"trace": null}}) else {
            unreachable!()
        };
        assert_eq!(
            to_string(&root).unwrap_err(),
            LibconfigError::Unrepresentable {
                path: "attack_traffic.trace".into(),
                kind: "null"
            }
        );

        let Value::Object(root) = json!({"1st": 1}) else { unreachable!() };
        assert!(to_string(&root).is_err());
    }

    #[test]
    fn test_is_libconfig_path() {
        assert!(is_libconfig_path(Path::new("/tmp/template.cfg")));
        assert!(is_libconfig_path(Path::new("TEMPLATE.CFG")));
        assert!(!is_libconfig_path(Path::new("template.toml")));
        assert!(!is_libconfig_path(Path::new("template")));
    }
}
