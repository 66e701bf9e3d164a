//! The two GVariant grammars.
//!
//! Type strings describe the shape of a value (`a{sv}`, `(ii)`, `ms`).
//! Format strings layer conversions on top of type strings (`@`, `&`, `^`).
//! Each function takes the unparsed rest of the format string and returns the
//! rest after one complete element.

use super::{compat::promoted_format_type, CallCheck, CheckFlags, FormatDiagnostic, ForcedType, Step};
use crate::language::{
    catalog::{VARIANT, VARIANT_BUILDER, VARIANT_ITER},
    types::{IntWidth, TypeDescriptor},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Grammar {
    TypeString,
    FormatString,
}

impl Grammar {
    fn label(self) -> &'static str {
        match self {
            Grammar::TypeString => "type string",
            Grammar::FormatString => "format string",
        }
    }
}

/// Targets of the `^` convenience conversions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Convenience {
    StringArray,
    ConstStringArray,
    ByteString,
    ConstByteString,
}

impl Convenience {
    fn expected_type(self) -> TypeDescriptor {
        let chars = TypeDescriptor::pointer_to(TypeDescriptor::char());
        let const_chars = TypeDescriptor::const_pointer_to(TypeDescriptor::char());
        match self {
            Convenience::StringArray => TypeDescriptor::pointer_to(chars),
            Convenience::ConstStringArray => TypeDescriptor::pointer_to(const_chars),
            Convenience::ByteString => chars,
            Convenience::ConstByteString => const_chars,
        }
    }
}

/// Checked in order; the first matching prefix wins.
const CONVENIENCE_CONVERSIONS: &[(&str, Convenience)] = &[
    ("as", Convenience::StringArray),
    ("ao", Convenience::StringArray),
    ("a&s", Convenience::ConstStringArray),
    ("a&o", Convenience::ConstStringArray),
    ("aay", Convenience::StringArray),
    ("ay", Convenience::ByteString),
    ("&ay", Convenience::ConstByteString),
    ("a&ay", Convenience::ConstStringArray),
];

fn split_token(input: &str) -> Option<(char, &str)> {
    let mut chars = input.chars();
    let token = chars.next()?;
    Some((token, chars.as_str()))
}

impl<'a> CallCheck<'a> {
    fn variant_pointer(&self) -> TypeDescriptor {
        self.checker.catalog().resolve_pointer_to_named_type(VARIANT)
    }

    pub(super) fn check_basic_type_string<'f>(
        &mut self,
        input: &'f str,
        flags: CheckFlags,
    ) -> Step<'f> {
        log::debug!("Checking basic type string ‘{input}’.");

        let Some((token, rest)) = split_token(input) else {
            return Err(self.grammar_error(
                "Expected a GVariant basic type string but reached the end of the format string.",
            ));
        };
        let expected = match token {
            'b' => TypeDescriptor::Bool,
            'y' => TypeDescriptor::Char { signed: false },
            'n' => TypeDescriptor::int(IntWidth::W16, true),
            'q' => TypeDescriptor::int(IntWidth::W16, false),
            'i' | 'h' => TypeDescriptor::int(IntWidth::W32, true),
            'u' => TypeDescriptor::int(IntWidth::W32, false),
            'x' => TypeDescriptor::int(IntWidth::W64, true),
            't' => TypeDescriptor::int(IntWidth::W64, false),
            'd' => TypeDescriptor::Double,
            // TODO: validate `o` and `g` literals as D-Bus object paths and signatures.
            's' | 'o' | 'g' => TypeDescriptor::pointer_to(TypeDescriptor::char()),
            '?' => self.variant_pointer(),
            other => {
                return Err(self.grammar_error(format!(
                    "Expected a GVariant basic type string but saw ‘{other}’."
                )))
            }
        };
        // Booleans and narrow integers arrive as promoted ints when read from `...`.
        let expected = if !flags.direction_out && matches!(token, 'b' | 'y' | 'n' | 'q') {
            promoted_format_type()
        } else {
            expected
        };

        self.consume_argument(expected, flags)?;
        Ok(rest)
    }

    pub(super) fn check_type_string<'f>(&mut self, input: &'f str, flags: CheckFlags) -> Step<'f> {
        log::debug!("Checking type string ‘{input}’.");

        let Some((token, rest)) = split_token(input) else {
            return self.check_basic_type_string(input, flags);
        };
        match token {
            'v' | 'r' | '*' => {
                self.consume_argument(self.variant_pointer(), flags)?;
                Ok(rest)
            }
            'a' => {
                let flags = flags.allowing_null();
                let container = if flags.direction_out {
                    VARIANT_ITER
                } else {
                    VARIANT_BUILDER
                };
                let rest = self.check_type_string(rest, flags.without_consuming())?;
                let expected = self
                    .checker
                    .catalog()
                    .resolve_pointer_to_named_type(container);
                self.consume_argument(expected, flags)?;
                Ok(rest)
            }
            'm' => self.check_type_string(rest, flags.allowing_null()),
            '(' => self.check_tuple(rest, flags, Grammar::TypeString),
            '{' => self.check_dict_entry(rest, flags, Grammar::TypeString),
            _ => self.check_basic_type_string(input, flags),
        }
    }

    pub(super) fn check_basic_format_string<'f>(
        &mut self,
        input: &'f str,
        flags: CheckFlags,
    ) -> Step<'f> {
        log::debug!("Checking basic format string ‘{input}’.");

        match split_token(input) {
            Some(('@', rest)) => {
                let rest = self.check_basic_type_string(rest, flags.without_consuming())?;
                self.consume_argument(self.variant_pointer(), flags.forcing(ForcedType::Container))?;
                Ok(rest)
            }
            Some(('?', rest)) => {
                self.consume_argument(self.variant_pointer(), flags)?;
                Ok(rest)
            }
            // Ignored for inbound arguments; outbound ones must be const.
            Some(('&', rest)) => self.check_basic_type_string(rest, flags.requiring_const()),
            Some(('^', rest)) => self.check_convenience(rest, flags),
            _ => self.check_basic_type_string(input, flags),
        }
    }

    pub(super) fn check_format_string<'f>(
        &mut self,
        input: &'f str,
        flags: CheckFlags,
    ) -> Step<'f> {
        log::debug!("Checking format string ‘{input}’.");

        let Some((token, rest)) = split_token(input) else {
            return self.check_type_string(input, flags);
        };
        match token {
            '@' => {
                // The nested type string is only validated; the argument is a
                // single GVariant of that type.
                let rest = self.check_type_string(rest, flags.without_consuming())?;
                self.consume_argument(self.variant_pointer(), flags.forcing(ForcedType::Container))?;
                Ok(rest)
            }
            'm' => self.check_format_string(rest, flags.allowing_null()),
            '*' | '?' | 'r' => {
                self.consume_argument(self.variant_pointer(), flags)?;
                Ok(rest)
            }
            '(' => self.check_tuple(rest, flags, Grammar::FormatString),
            '{' => self.check_dict_entry(rest, flags, Grammar::FormatString),
            '&' => self.check_type_string(rest, flags.requiring_const()),
            '^' => self.check_basic_format_string(input, flags),
            _ => self.check_type_string(input, flags),
        }
    }

    fn check_convenience<'f>(&mut self, input: &'f str, flags: CheckFlags) -> Step<'f> {
        let Some((prefix, conversion)) = CONVENIENCE_CONVERSIONS
            .iter()
            .find(|(prefix, _)| input.starts_with(prefix))
        else {
            return Err(self.grammar_error(
                "Invalid GVariant basic format string: convenience operator ‘^’ was not followed by a recognized convenience conversion.",
            ));
        };
        self.consume_argument(conversion.expected_type(), flags)?;
        Ok(&input[prefix.len()..])
    }

    fn check_element<'f>(&mut self, input: &'f str, flags: CheckFlags, grammar: Grammar) -> Step<'f> {
        match grammar {
            Grammar::TypeString => self.check_type_string(input, flags),
            Grammar::FormatString => self.check_format_string(input, flags),
        }
    }

    fn check_dict_key<'f>(&mut self, input: &'f str, flags: CheckFlags, grammar: Grammar) -> Step<'f> {
        match grammar {
            Grammar::TypeString => self.check_basic_type_string(input, flags),
            Grammar::FormatString => self.check_basic_format_string(input, flags),
        }
    }

    /// Elements of a tuple whose opening `(` is already consumed.
    fn check_tuple<'f>(&mut self, input: &'f str, flags: CheckFlags, grammar: Grammar) -> Step<'f> {
        let mut rest = input;
        loop {
            match split_token(rest) {
                Some((')', after)) => return Ok(after),
                Some(_) => rest = self.check_element(rest, flags, grammar)?,
                None => {
                    return Err(self.grammar_error(format!(
                        "Invalid GVariant {}: tuple did not end with ‘)’.",
                        grammar.label()
                    )))
                }
            }
        }
    }

    fn dict_arity_error(&self, grammar: Grammar) -> FormatDiagnostic {
        self.grammar_error(format!(
            "Invalid GVariant {}: dict did not contain exactly two elements.",
            grammar.label()
        ))
    }

    /// Key and value of a dict entry whose opening `{` is already consumed.
    fn check_dict_entry<'f>(
        &mut self,
        input: &'f str,
        flags: CheckFlags,
        grammar: Grammar,
    ) -> Step<'f> {
        if input.starts_with('}') {
            return Err(self.dict_arity_error(grammar));
        }
        let rest = self.check_dict_key(input, flags, grammar)?;

        if rest.starts_with('}') {
            return Err(self.dict_arity_error(grammar));
        }
        let rest = self.check_element(rest, flags, grammar)?;

        match split_token(rest) {
            Some(('}', after)) => Ok(after),
            Some(_) => Err(self.grammar_error(format!(
                "Invalid GVariant {}: dict contains more than two elements.",
                grammar.label()
            ))),
            None => Err(self.grammar_error(format!(
                "Invalid GVariant {}: dict did not end with ‘}}’.",
                grammar.label()
            ))),
        }
    }
}
