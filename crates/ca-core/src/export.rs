//! Export serializer: parameter tables → copy-pasteable variant literals.
//!
//! Output format, one block per table, blocks separated by a blank line:
//!
//! ```text
//! // Final Card Animation Variants
//! const cardAnimationVariants = {
//!   "gcp": {
//!     "collapsed": {
//!       "x": 44,
//!       ...
//! };
//! ```
//!
//! The mapping literal is indented JSON: quoted keys, numbers in shortest
//! round-trip form, integral values without a fraction. `parse_export`
//! reads the same format back.

use crate::config::ExportConfig;
use crate::error::{AnimatorError, AnimatorResult};
use crate::model::{GroupAnimationParams, StateKind, TransformField};
use crate::params::ParamTable;
use std::fmt::Write;
use winnow::ascii::{float, multispace0, multispace1, till_line_ending};
use winnow::combinator::{alt, delimited, opt, preceded, repeat, separated, separated_pair, terminated};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{any, take_while};

/// One labelled table in an export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportBlock {
    /// Text of the `//` comment line introducing the block.
    pub label: String,
    /// Name of the `const` the table is assigned to.
    pub binding: String,
    /// Keys in output order.
    pub entries: Vec<(String, GroupAnimationParams)>,
}

impl ExportBlock {
    pub fn new(
        label: impl Into<String>,
        binding: impl Into<String>,
        entries: Vec<(String, GroupAnimationParams)>,
    ) -> Self {
        Self {
            label: label.into(),
            binding: binding.into(),
            entries,
        }
    }

    /// Block for a dynamic table, keyed by group identifier in table order.
    pub fn from_table(label: impl Into<String>, binding: impl Into<String>, table: &ParamTable) -> Self {
        let entries = table
            .iter()
            .map(|(id, params)| (id.as_str().to_string(), *params))
            .collect();
        Self::new(label, binding, entries)
    }
}

// ─── Writer ──────────────────────────────────────────────────────────────

/// Render blocks as source text. Pure and order-stable.
#[must_use]
pub fn export_variants(blocks: &[ExportBlock], config: &ExportConfig) -> String {
    let mut out = String::with_capacity(blocks.len() * 512);
    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            out.push_str("\n\n");
        }
        let _ = writeln!(out, "// {}", block.label);
        let _ = write!(out, "const {} = ", block.binding);
        write_table(&mut out, &block.entries, config.indent);
        out.push(';');
    }
    out
}

fn write_table(out: &mut String, entries: &[(String, GroupAnimationParams)], indent: usize) {
    if entries.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push_str("{\n");
    for (i, (key, params)) in entries.iter().enumerate() {
        pad(out, indent);
        write_key(out, key);
        out.push_str(": {\n");
        for (j, state) in StateKind::ALL.iter().enumerate() {
            pad(out, indent * 2);
            write_key(out, state.name());
            out.push_str(": {\n");
            let transform = params.state(*state);
            for (k, field) in TransformField::ALL.iter().enumerate() {
                pad(out, indent * 3);
                write_key(out, field.name());
                out.push_str(": ");
                out.push_str(&format_num(transform.get(*field)));
                close_item(out, k + 1 < TransformField::ALL.len());
            }
            pad(out, indent * 2);
            out.push('}');
            close_item(out, j + 1 < StateKind::ALL.len());
        }
        pad(out, indent);
        out.push('}');
        close_item(out, i + 1 < entries.len());
    }
    out.push('}');
}

fn pad(out: &mut String, width: usize) {
    for _ in 0..width {
        out.push(' ');
    }
}

fn close_item(out: &mut String, more: bool) {
    if more {
        out.push(',');
    }
    out.push('\n');
}

fn write_key(out: &mut String, key: &str) {
    out.push('"');
    for c in key.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Shortest text that parses back to the same `f64`.
///
/// Integral values print without a fraction, `-0` prints as `0` and
/// non-finite values print as `null`.
pub fn format_num(n: f64) -> String {
    if !n.is_finite() {
        "null".to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        format!("{n}")
    }
}

// ─── Reader ──────────────────────────────────────────────────────────────

#[derive(Debug)]
enum Literal {
    Number(f64),
    Object(Vec<(String, Literal)>),
}

struct RawBlock {
    label: String,
    binding: String,
    table: Vec<(String, Literal)>,
}

/// Read an export produced by `export_variants` back into blocks.
///
/// `null` reads back as NaN. Fields missing from the text keep their
/// identity values.
pub fn parse_export(text: &str) -> AnimatorResult<Vec<ExportBlock>> {
    let raw: Vec<RawBlock> = terminated(repeat(0.., block), multispace0)
        .parse(text)
        .map_err(|e| AnimatorError::ExportParse {
            message: e.to_string(),
        })?;
    raw.into_iter().map(convert_block).collect()
}

fn block(input: &mut &str) -> ModalResult<RawBlock> {
    (
        preceded((multispace0, "//"), till_line_ending),
        preceded((multispace0, "const", multispace1), identifier),
        preceded((multispace0, '=', multispace0), object),
        opt(preceded(multispace0, ';')),
    )
        .map(|(label, binding, table, _)| RawBlock {
            label: label.trim().to_string(),
            binding: binding.to_string(),
            table,
        })
        .parse_next(input)
}

fn object(input: &mut &str) -> ModalResult<Vec<(String, Literal)>> {
    delimited(
        ('{', multispace0),
        separated(0.., member, (multispace0, ',', multispace0)),
        (multispace0, '}'),
    )
    .parse_next(input)
}

fn member(input: &mut &str) -> ModalResult<(String, Literal)> {
    separated_pair(key, (multispace0, ':', multispace0), literal).parse_next(input)
}

fn literal(input: &mut &str) -> ModalResult<Literal> {
    alt((object.map(Literal::Object), number.map(Literal::Number))).parse_next(input)
}

fn number(input: &mut &str) -> ModalResult<f64> {
    alt(("null".value(f64::NAN), float)).parse_next(input)
}

fn key(input: &mut &str) -> ModalResult<String> {
    alt((quoted, identifier.map(str::to_string))).parse_next(input)
}

fn identifier<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_' || c == '$').parse_next(input)
}

fn next_char(input: &mut &str) -> ModalResult<char> {
    any.parse_next(input)
}

fn hex4<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    take_while(4, |c: char| c.is_ascii_hexdigit()).parse_next(input)
}

fn open_quote(input: &mut &str) -> ModalResult<char> {
    '"'.parse_next(input)
}

/// JSON string literal with the escapes `write_key` produces.
fn quoted(input: &mut &str) -> ModalResult<String> {
    open_quote(input)?;
    let mut out = String::new();
    loop {
        match next_char(input)? {
            '"' => return Ok(out),
            '\\' => match next_char(input)? {
                '"' => out.push('"'),
                '\\' => out.push('\\'),
                '/' => out.push('/'),
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                't' => out.push('\t'),
                'b' => out.push('\u{8}'),
                'f' => out.push('\u{c}'),
                'u' => {
                    let code = u32::from_str_radix(hex4(input)?, 16)
                        .map_err(|_| ErrMode::Cut(ContextError::new()))?;
                    out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
                _ => return Err(ErrMode::Cut(ContextError::new())),
            },
            c => out.push(c),
        }
    }
}

fn convert_block(raw: RawBlock) -> AnimatorResult<ExportBlock> {
    let entries = raw
        .table
        .into_iter()
        .map(|(key, value)| {
            let params = convert_params(&key, value)?;
            Ok((key, params))
        })
        .collect::<AnimatorResult<Vec<_>>>()?;
    Ok(ExportBlock {
        label: raw.label,
        binding: raw.binding,
        entries,
    })
}

fn convert_params(key: &str, value: Literal) -> AnimatorResult<GroupAnimationParams> {
    let Literal::Object(states) = value else {
        return Err(parse_error(format!("entry `{key}` is not an object")));
    };
    let mut params = GroupAnimationParams::IDENTITY;
    for (state_name, fields) in states {
        let state = StateKind::from_name(&state_name)
            .ok_or_else(|| parse_error(format!("unknown state `{state_name}` in `{key}`")))?;
        let Literal::Object(fields) = fields else {
            return Err(parse_error(format!("`{key}.{state_name}` is not an object")));
        };
        for (field_name, v) in fields {
            let field = TransformField::from_name(&field_name).ok_or_else(|| {
                parse_error(format!("unknown field `{field_name}` in `{key}.{state_name}`"))
            })?;
            let Literal::Number(v) = v else {
                return Err(parse_error(format!(
                    "`{key}.{state_name}.{field_name}` is not a number"
                )));
            };
            params.state_mut(state).set(field, v);
        }
    }
    Ok(params)
}

fn parse_error(message: String) -> AnimatorError {
    AnimatorError::ExportParse { message }
}
