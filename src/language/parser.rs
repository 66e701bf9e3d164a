//! Parser for argument spellings: C type names (`const gchar **`), casts and
//! the literals that matter to format checking (`NULL`, `TRUE`, `5u`, `"(ss)"`).

use crate::language::{
    errors::SyntaxError,
    span::Span,
    types::{ArgumentDescriptor, IntWidth, TypeDescriptor},
};
use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, tag, tag_no_case, take_while, take_while1},
    character::complete::{char, digit1, hex_digit1, multispace0, none_of},
    combinator::{all_consuming, map, opt, recognize, value, verify},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated},
    IResult,
};

const QUALIFIERS: &[&str] = &["const", "volatile", "restrict"];
const BUILTIN_WORDS: &[&str] = &[
    "void", "_Bool", "bool", "char", "short", "int", "long", "float", "double", "signed",
    "unsigned",
];

/// An argument spelling after parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedArgument {
    pub descriptor: ArgumentDescriptor,
    /// Contents of a string literal argument.
    pub string_literal: Option<String>,
}

impl ParsedArgument {
    fn plain(descriptor: ArgumentDescriptor) -> Self {
        Self {
            descriptor,
            string_literal: None,
        }
    }
}

#[derive(Clone, Debug)]
enum Literal {
    Null,
    Integer(i128, TypeDescriptor),
}

pub fn parse_argument(spelling: &str) -> Result<ParsedArgument, SyntaxError> {
    match all_consuming(terminated(argument, multispace0))(spelling) {
        Ok((_, parsed)) => Ok(parsed),
        Err(err) => Err(spelling_error(spelling, err, "argument")),
    }
}

pub fn parse_type(spelling: &str) -> Result<TypeDescriptor, SyntaxError> {
    match all_consuming(terminated(type_spelling, multispace0))(spelling) {
        Ok((_, ty)) => Ok(ty),
        Err(err) => Err(spelling_error(spelling, err, "type")),
    }
}

fn spelling_error(
    spelling: &str,
    err: nom::Err<nom::error::Error<&str>>,
    what: &str,
) -> SyntaxError {
    let offset = match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => spelling.len() - e.input.len(),
        nom::Err::Incomplete(_) => spelling.len(),
    };
    SyntaxError::new(
        format!("cannot parse `{}` as a C {what}", spelling.trim()),
        Span::new(offset, spelling.len()),
    )
    .with_help("expected a C type such as `const gchar **`, `NULL`, an integer or a string literal")
}

fn argument(input: &str) -> IResult<&str, ParsedArgument> {
    alt((
        cast,
        map(string_literal, |text| ParsedArgument {
            descriptor: ArgumentDescriptor::of_type(TypeDescriptor::pointer_to(
                TypeDescriptor::char(),
            )),
            string_literal: Some(text),
        }),
        map(literal, |lit| ParsedArgument::plain(literal_descriptor(lit))),
        map(type_spelling, |ty| {
            ParsedArgument::plain(ArgumentDescriptor::of_type(ty))
        }),
    ))(input)
}

fn literal_descriptor(lit: Literal) -> ArgumentDescriptor {
    match lit {
        Literal::Null => ArgumentDescriptor::null(),
        Literal::Integer(value, ty) => ArgumentDescriptor::integer(ty, value),
    }
}

fn cast(input: &str) -> IResult<&str, ParsedArgument> {
    let (input, target) = delimited(
        preceded(multispace0, char('(')),
        type_spelling,
        preceded(multispace0, char(')')),
    )(input)?;
    let (input, lit) = literal(input)?;
    let descriptor = match (&target, lit) {
        (TypeDescriptor::Pointer { pointee, .. }, lit) => {
            let is_zero = matches!(lit, Literal::Null | Literal::Integer(0, _));
            ArgumentDescriptor {
                is_null_constant: is_zero && **pointee == TypeDescriptor::Unknown,
                ty: target.clone(),
                integer_constant: None,
            }
        }
        (_, Literal::Integer(value, _)) => ArgumentDescriptor::integer(target.clone(), value),
        (_, Literal::Null) => ArgumentDescriptor::of_type(target.clone()),
    };
    Ok((input, ParsedArgument::plain(descriptor)))
}

fn literal(input: &str) -> IResult<&str, Literal> {
    alt((
        value(Literal::Null, keyword("NULL")),
        map(keyword("TRUE"), |_| {
            Literal::Integer(1, TypeDescriptor::named("gboolean"))
        }),
        map(keyword("FALSE"), |_| {
            Literal::Integer(0, TypeDescriptor::named("gboolean"))
        }),
        integer_literal,
    ))(input)
}

fn keyword<'a>(expected: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    verify(word, move |w: &str| w == expected)
}

fn integer_literal(input: &str) -> IResult<&str, Literal> {
    let (input, _) = multispace0(input)?;
    let (input, negative) = opt(char('-'))(input)?;
    let (input, magnitude) = alt((
        map(preceded(tag_no_case("0x"), hex_digit1), |digits: &str| {
            i128::from_str_radix(digits, 16).ok()
        }),
        map(digit1, |digits: &str| digits.parse::<i128>().ok()),
    ))(input)?;
    let Some(magnitude) = magnitude else {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Digit,
        )));
    };
    let (input, suffix) = take_while(|c: char| matches!(c, 'u' | 'U' | 'l' | 'L'))(input)?;
    let value = if negative.is_some() { -magnitude } else { magnitude };
    Ok((input, Literal::Integer(value, suffix_type(suffix))))
}

fn suffix_type(suffix: &str) -> TypeDescriptor {
    let unsigned = suffix.contains(|c: char| c == 'u' || c == 'U');
    let longs = suffix.chars().filter(|c| matches!(c, 'l' | 'L')).count();
    match longs {
        0 => TypeDescriptor::int(IntWidth::W32, !unsigned),
        1 => TypeDescriptor::Long { signed: !unsigned },
        _ => TypeDescriptor::int(IntWidth::W64, !unsigned),
    }
}

fn string_literal(input: &str) -> IResult<&str, String> {
    map(
        delimited(
            preceded(multispace0, char('"')),
            opt(escaped_transform(
                none_of("\\\""),
                '\\',
                alt((
                    value("\\", tag("\\")),
                    value("\"", tag("\"")),
                    value("\n", tag("n")),
                    value("\t", tag("t")),
                )),
            )),
            char('"'),
        ),
        Option::unwrap_or_default,
    )(input)
}

fn word(input: &str) -> IResult<&str, &str> {
    preceded(
        multispace0,
        recognize(pair(
            take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
            take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        )),
    )(input)
}

fn qualifier(input: &str) -> IResult<&str, &str> {
    verify(word, |w: &str| QUALIFIERS.contains(&w))(input)
}

pub(crate) fn type_spelling(input: &str) -> IResult<&str, TypeDescriptor> {
    let start = input;
    let (mut input, words) = many0(word)(input)?;
    let mut pointee_const = words.contains(&"const");
    let Some(mut ty) = base_type(&words) else {
        return Err(nom::Err::Error(nom::error::Error::new(
            start,
            nom::error::ErrorKind::Verify,
        )));
    };
    loop {
        let (rest, star) = opt(preceded(multispace0, char('*')))(input)?;
        if star.is_none() {
            break;
        }
        let (rest, quals) = many0(qualifier)(rest)?;
        ty = TypeDescriptor::Pointer {
            pointee: Box::new(ty),
            is_const: pointee_const,
        };
        pointee_const = quals.contains(&"const");
        input = rest;
    }
    Ok((input, ty))
}

fn base_type(words: &[&str]) -> Option<TypeDescriptor> {
    let words: Vec<&str> = words
        .iter()
        .copied()
        .filter(|w| !QUALIFIERS.contains(w))
        .collect();
    match words.as_slice() {
        [] => None,
        ["struct" | "union" | "enum", name] => Some(TypeDescriptor::named(*name)),
        [name] if !BUILTIN_WORDS.contains(name) => Some(TypeDescriptor::named(*name)),
        _ if words.iter().all(|w| BUILTIN_WORDS.contains(w)) => builtin_type(&words),
        _ => None,
    }
}

fn builtin_type(words: &[&str]) -> Option<TypeDescriptor> {
    let count = |name: &str| words.iter().filter(|w| **w == name).count();
    let unsigned = count("unsigned") > 0;
    if unsigned && count("signed") > 0 {
        return None;
    }
    let longs = count("long");
    let has = |name: &str| count(name) > 0;
    let ty = if has("void") {
        TypeDescriptor::Unknown
    } else if has("_Bool") || has("bool") {
        TypeDescriptor::Bool
    } else if has("char") {
        TypeDescriptor::Char { signed: !unsigned }
    } else if has("float") {
        TypeDescriptor::Float
    } else if has("double") {
        if longs > 0 {
            TypeDescriptor::LongDouble
        } else {
            TypeDescriptor::Double
        }
    } else if has("short") {
        TypeDescriptor::int(IntWidth::W16, !unsigned)
    } else if longs == 1 {
        TypeDescriptor::Long { signed: !unsigned }
    } else if longs >= 2 {
        TypeDescriptor::int(IntWidth::W64, !unsigned)
    } else {
        TypeDescriptor::int(IntWidth::W32, !unsigned)
    };
    Some(ty)
}
