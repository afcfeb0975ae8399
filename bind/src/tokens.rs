//! Flag parsing over a synthesized grammar.
//!
//! Standard long-flag semantics: `--name value` and `--name=value`, a bare
//! `--` ends flag parsing, negative numbers count as values, and when a flag
//! repeats the last occurrence wins. Anything the grammar does not claim is
//! returned as a leftover token, in input order, for the caller to accept or
//! reject.

use std::sync::LazyLock;

use config_schema_core::Value;
use indexmap::IndexMap;
use regex::Regex;
use tracing::debug;

use crate::error::{BindError, Result};
use crate::grammar::{ArgumentGrammar, ArgumentSpec, FlagMatch, Nargs};

static NEGATIVE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-(\d+|\d*\.\d+)([eE][-+]?\d+)?$").expect("static regex must compile")
});

/// Values supplied on the command line, before defaults are applied.
#[derive(Debug, Default)]
pub(crate) struct ParsedTokens {
    /// Supplied values keyed by destination, in first-seen order.
    pub values: IndexMap<String, Value>,
    /// Tokens the grammar did not claim.
    pub leftover: Vec<String>,
}

/// Returns `true` if `token` would be read as an option rather than a value.
fn looks_like_flag(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-') && !NEGATIVE_NUMBER_RE.is_match(token)
}

fn is_help_flag(token: &str) -> bool {
    token == "-h" || token == "--help"
}

/// Parses `tokens` against `grammar`.
///
/// `help_program` enables `-h`/`--help`, which aborts parsing with
/// [`BindError::HelpRequested`] carrying usage rendered for that program.
pub(crate) fn parse_tokens(
    grammar: &ArgumentGrammar,
    tokens: &[String],
    help_program: Option<&str>,
) -> Result<ParsedTokens> {
    let mut parsed = ParsedTokens::default();
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        i += 1;

        if token == "--" {
            parsed.leftover.extend(tokens[i..].iter().cloned());
            break;
        }
        if let Some(program) = help_program {
            if is_help_flag(token) {
                return Err(BindError::HelpRequested(grammar.render_help(program, true)));
            }
        }
        if !token.starts_with("--") || token.len() == 2 {
            parsed.leftover.push(token.clone());
            continue;
        }

        let (flag, inline) = match token.split_once('=') {
            Some((flag, value)) => (flag, Some(value)),
            None => (token.as_str(), None),
        };

        match grammar.resolve(flag) {
            None => {
                debug!(token = %token, "Unrecognized flag");
                parsed.leftover.push(token.clone());
            }
            Some(FlagMatch::Negate(spec)) => {
                if let Some(value) = inline {
                    return Err(BindError::UnexpectedValue {
                        flag: flag.to_string(),
                        value: value.to_string(),
                    });
                }
                parsed.values.insert(spec.dest.clone(), Value::Bool(false));
            }
            Some(FlagMatch::Affirm(spec)) => {
                match consume_values(spec, inline, tokens, &mut i)? {
                    Some(value) => {
                        parsed.values.insert(spec.dest.clone(), value);
                    }
                    // A required list given no values counts as unsupplied.
                    None => {
                        parsed.values.shift_remove(&spec.dest);
                    }
                }
            }
        }
    }

    Ok(parsed)
}

/// Reads the values for one occurrence of `spec`'s flag.
///
/// Returns `None` only for a required list followed by no values.
fn consume_values(
    spec: &ArgumentSpec,
    inline: Option<&str>,
    tokens: &[String],
    i: &mut usize,
) -> Result<Option<Value>> {
    let next_value = |i: usize| tokens.get(i).filter(|t| !looks_like_flag(t));

    match spec.nargs {
        Nargs::One => {
            let token = match inline {
                Some(value) => value,
                None => {
                    let value = next_value(*i).ok_or_else(|| BindError::ExpectedArgument {
                        flag: spec.flag.clone(),
                        expected: "expected one argument",
                    })?;
                    *i += 1;
                    value.as_str()
                }
            };
            Ok(Some(spec.coerce(token)?))
        }
        Nargs::Optional => {
            if let Some(value) = inline {
                return Ok(Some(spec.coerce(value)?));
            }
            match next_value(*i) {
                Some(value) => {
                    *i += 1;
                    Ok(Some(spec.coerce(value)?))
                }
                None => Ok(Some(spec.const_value.clone().unwrap_or(Value::Bool(true)))),
            }
        }
        Nargs::OneOrMore => {
            let mut items = Vec::new();
            if let Some(value) = inline {
                items.push(spec.coerce(value)?);
            } else {
                while let Some(value) = next_value(*i) {
                    items.push(spec.coerce(value)?);
                    *i += 1;
                }
            }
            if items.is_empty() && spec.required {
                return Ok(None);
            }
            Ok(Some(Value::List(items)))
        }
    }
}
