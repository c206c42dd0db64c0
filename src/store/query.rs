//! Filter query-string parser
//!
//! List endpoints accept an optional filter expression after `?`, e.g.
//!
//! ```text
//! name eq 'Alpha' and indices.0.start ge 1000
//! ```
//!
//! The expression is parsed into store [`Filter`]s and evaluated by the
//! generic document layer. It is used for administrative listing only; the
//! channel-data read path builds its filters directly.
//!
//! # Supported Syntax
//!
//! ```text
//! expr       := and_expr ( OR and_expr )*
//! and_expr   := primary ( AND primary )*
//! primary    := '(' expr ')' | field op literal
//! op         := eq | ne | lt | le | gt | ge
//! literal    := 'string' | number
//! ```

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag, tag_no_case, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{map, map_opt, opt, recognize},
    multi::many0,
    number::complete::double,
    sequence::{delimited, preceded, tuple},
    IResult,
};

use crate::store::error::{StoreError, StoreResult};
use crate::store::filter::Filter;

/// Parse a filter expression; empty input matches everything
pub fn parse_filter(input: &str) -> StoreResult<Filter> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Filter::All);
    }

    match parse_or(input) {
        Ok((remaining, filter)) => {
            if remaining.trim().is_empty() {
                Ok(filter)
            } else {
                Err(StoreError::QueryParse(format!(
                    "Unexpected input after expression: '{}'",
                    remaining.trim()
                )))
            }
        }
        Err(e) => Err(StoreError::QueryParse(format!("Parse error: {:?}", e))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone)]
enum Literal {
    Str(String),
    Num(f64),
}

fn parse_or(input: &str) -> IResult<&str, Filter> {
    let (input, first) = parse_and(input)?;
    let (input, rest) = many0(preceded(
        delimited(multispace1, tag_no_case("or"), multispace1),
        parse_and,
    ))(input)?;

    if rest.is_empty() {
        Ok((input, first))
    } else {
        let mut filters = vec![first];
        filters.extend(rest);
        Ok((input, Filter::Or(filters)))
    }
}

fn parse_and(input: &str) -> IResult<&str, Filter> {
    let (input, first) = parse_primary(input)?;
    let (input, rest) = many0(preceded(
        delimited(multispace1, tag_no_case("and"), multispace1),
        parse_primary,
    ))(input)?;

    if rest.is_empty() {
        Ok((input, first))
    } else {
        let mut filters = vec![first];
        filters.extend(rest);
        Ok((input, Filter::And(filters)))
    }
}

fn parse_primary(input: &str) -> IResult<&str, Filter> {
    alt((parse_group, parse_comparison))(input)
}

fn parse_group(input: &str) -> IResult<&str, Filter> {
    delimited(
        tuple((char('('), multispace0)),
        parse_or,
        tuple((multispace0, char(')'))),
    )(input)
}

fn parse_comparison(input: &str) -> IResult<&str, Filter> {
    map_opt(
        tuple((
            parse_field,
            delimited(multispace1, parse_op, multispace1),
            parse_literal,
        )),
        |(field, op, literal)| build_comparison(field, op, literal),
    )(input)
}

/// Ordering operators only apply to numbers; `eq`/`ne` accept both
fn build_comparison(field: &str, op: CompareOp, literal: Literal) -> Option<Filter> {
    let field = field.to_string();
    match (op, literal) {
        (CompareOp::Eq, Literal::Str(s)) => Some(Filter::eq(field, s)),
        (CompareOp::Eq, Literal::Num(n)) => Some(Filter::eq(field, n)),
        (CompareOp::Ne, Literal::Str(s)) => Some(Filter::Ne {
            field,
            value: s.into(),
        }),
        (CompareOp::Ne, Literal::Num(n)) => Some(Filter::Ne {
            field,
            value: n.into(),
        }),
        (CompareOp::Lt, Literal::Num(n)) => Some(Filter::Lt { field, value: n }),
        (CompareOp::Le, Literal::Num(n)) => Some(Filter::Lte { field, value: n }),
        (CompareOp::Gt, Literal::Num(n)) => Some(Filter::Gt { field, value: n }),
        (CompareOp::Ge, Literal::Num(n)) => Some(Filter::Gte { field, value: n }),
        _ => None,
    }
}

fn parse_field(input: &str) -> IResult<&str, &str> {
    recognize(take_while1(|c: char| {
        c.is_alphanumeric() || c == '_' || c == '.'
    }))(input)
}

fn parse_op(input: &str) -> IResult<&str, CompareOp> {
    alt((
        map(tag_no_case("eq"), |_| CompareOp::Eq),
        map(tag_no_case("ne"), |_| CompareOp::Ne),
        map(tag_no_case("le"), |_| CompareOp::Le),
        map(tag_no_case("lt"), |_| CompareOp::Lt),
        map(tag_no_case("ge"), |_| CompareOp::Ge),
        map(tag_no_case("gt"), |_| CompareOp::Gt),
    ))(input)
}

fn parse_literal(input: &str) -> IResult<&str, Literal> {
    alt((
        map(parse_quoted_string, Literal::Str),
        map(double, Literal::Num),
    ))(input)
}

fn parse_quoted_string(input: &str) -> IResult<&str, String> {
    let (input, _) = char('\'')(input)?;
    let (input, content) = opt(escaped_transform(
        is_not("\\'"),
        '\\',
        alt((
            map(tag("'"), |_| "'"),
            map(tag("\\"), |_| "\\"),
        )),
    ))(input)?;
    let (input, _) = char('\'')(input)?;
    Ok((input, content.unwrap_or_default()))
}
