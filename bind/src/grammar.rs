//! Argument grammar synthesis.
//!
//! Turns [`FieldDescriptor`]s into one long flag each, following a fixed
//! per-category policy:
//!
//! | category | shape | arity |
//! |---|---|---|
//! | int / float / str / enum | `--name VALUE` | [`Nargs::One`] |
//! | list | `--name VALUE [VALUE ...]` | [`Nargs::OneOrMore`] |
//! | bool | `--name [VALUE]`, plus `--no_name` for a `true` default | [`Nargs::Optional`] |
//!
//! A nullable bool whose default is `none` takes exactly one value, so that
//! "not given" stays distinguishable from a bare flag.

use std::collections::HashSet;
use std::fmt::Write as _;

use config_schema_core::{
    DefaultValue, FieldDescriptor, SchemaError, TypeCategory, Value, ValueError,
};
use tracing::debug;

/// Prefix of the negation flag declared for booleans defaulting to `true`.
pub const NEGATION_PREFIX: &str = "no_";

/// How many tokens a flag consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nargs {
    /// Exactly one.
    One,
    /// Zero or one; a bare flag stores the argument's `const_value`.
    Optional,
    /// At least one.
    OneOrMore,
}

impl Nargs {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::One => "1",
            Self::Optional => "?",
            Self::OneOrMore => "+",
        }
    }
}

/// One synthesized argument.
#[derive(Debug, Clone)]
pub struct ArgumentSpec {
    /// Destination name; the field name.
    pub dest: String,
    /// Affirming long flag, `--<dest>`.
    pub flag: String,
    /// `--no_<dest>`, which stores `false` into `dest`.
    pub negated_flag: Option<String>,
    pub category: TypeCategory,
    pub nullable: bool,
    pub nargs: Nargs,
    /// Value stored for a bare flag under [`Nargs::Optional`].
    pub const_value: Option<Value>,
    pub default: Option<DefaultValue>,
    pub required: bool,
    /// Owning schema, or `None` for an extra argument.
    pub owner: Option<String>,
    pub help: Option<String>,
}

impl ArgumentSpec {
    /// Coerces one token for this argument.
    pub fn coerce(&self, token: &str) -> Result<Value, ValueError> {
        self.category.coerce_token(&self.dest, token)
    }

    /// Placeholder shown for values in usage text.
    pub fn metavar(&self) -> String {
        match &self.category {
            TypeCategory::Enum(e) => {
                let literals: Vec<String> = e.members.iter().map(|m| m.value.to_string()).collect();
                format!("{{{}}}", literals.join(","))
            }
            _ => self.dest.to_uppercase(),
        }
    }

    fn usage_fragment(&self) -> String {
        let metavar = self.metavar();
        match self.nargs {
            Nargs::One => format!("{} {metavar}", self.flag),
            Nargs::Optional => format!("{} [{metavar}]", self.flag),
            Nargs::OneOrMore => format!("{} {metavar} [{metavar} ...]", self.flag),
        }
    }
}

/// A flag resolved against the grammar.
#[derive(Debug, Clone, Copy)]
pub enum FlagMatch<'a> {
    Affirm(&'a ArgumentSpec),
    Negate(&'a ArgumentSpec),
}

/// The combined argument grammar of a schema set.
///
/// Built once and only read afterwards; every bind call borrows it.
#[derive(Debug, Clone, Default)]
pub struct ArgumentGrammar {
    arguments: Vec<ArgumentSpec>,
}

impl ArgumentGrammar {
    /// Synthesizes a grammar from descriptors, in descriptor order.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::FlagConflict`] when two arguments claim the
    /// same option string (including a negation flag colliding with a field
    /// named `no_<x>`).
    ///
    /// # Examples
    ///
    /// ```
    /// use config_schema_bind::{ArgumentGrammar, Nargs};
    /// use config_schema_core::*;
    ///
    /// let schema = ConfigSchema::new("s")
    ///     .with_field(FieldSchema::new("foo", TypeDescriptor::Int))
    ///     .with_field(FieldSchema::new("baz", TypeDescriptor::Bool).with_default(true));
    /// let desc = introspect(&schema).unwrap();
    /// let grammar = ArgumentGrammar::synthesize(&desc.fields).unwrap();
    ///
    /// let foo = grammar.argument("foo").unwrap();
    /// assert!(foo.required);
    /// assert_eq!(foo.nargs, Nargs::One);
    ///
    /// let baz = grammar.argument("baz").unwrap();
    /// assert_eq!(baz.negated_flag.as_deref(), Some("--no_baz"));
    /// assert_eq!(baz.nargs, Nargs::Optional);
    /// ```
    pub fn synthesize<'a>(
        descriptors: impl IntoIterator<Item = &'a FieldDescriptor>,
    ) -> Result<Self, SchemaError> {
        let mut arguments = Vec::new();
        let mut taken: HashSet<String> = HashSet::new();

        for descriptor in descriptors {
            let spec = synthesize_argument(descriptor);
            for flag in std::iter::once(&spec.flag).chain(spec.negated_flag.as_ref()) {
                if !taken.insert(flag.clone()) {
                    return Err(SchemaError::FlagConflict(flag.clone()));
                }
            }
            arguments.push(spec);
        }

        debug!(arguments = arguments.len(), "Synthesized argument grammar");
        Ok(Self { arguments })
    }

    /// Arguments in declaration order.
    pub fn arguments(&self) -> &[ArgumentSpec] {
        &self.arguments
    }

    /// Looks an argument up by destination.
    pub fn argument(&self, dest: &str) -> Option<&ArgumentSpec> {
        self.arguments.iter().find(|a| a.dest == dest)
    }

    /// Resolves an option string (`--foo` or `--no_foo`).
    pub fn resolve(&self, flag: &str) -> Option<FlagMatch<'_>> {
        self.arguments.iter().find_map(|a| {
            if a.flag == flag {
                Some(FlagMatch::Affirm(a))
            } else if a.negated_flag.as_deref() == Some(flag) {
                Some(FlagMatch::Negate(a))
            } else {
                None
            }
        })
    }

    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// Renders usage and an options listing.
    ///
    /// # Examples
    ///
    /// ```
    /// use config_schema_bind::ArgumentGrammar;
    /// use config_schema_core::*;
    ///
    /// let schema = ConfigSchema::new("s")
    ///     .with_field(FieldSchema::new("foo", TypeDescriptor::Int))
    ///     .with_field(
    ///         FieldSchema::new("baz", TypeDescriptor::Str)
    ///             .with_default("toto")
    ///             .with_help("help message"),
    ///     );
    /// let grammar = ArgumentGrammar::synthesize(&introspect(&schema).unwrap().fields).unwrap();
    ///
    /// let help = grammar.render_help("prog", true);
    /// assert!(help.starts_with("usage: prog [-h] --foo FOO [--baz BAZ]"));
    /// assert!(help.contains("help message (default: toto)"));
    /// ```
    pub fn render_help(&self, program: &str, with_help_flag: bool) -> String {
        let mut usage = format!("usage: {program}");
        if with_help_flag {
            usage.push_str(" [-h]");
        }
        for arg in &self.arguments {
            if let Some(neg) = &arg.negated_flag {
                let _ = write!(usage, " [{neg}]");
            }
            if arg.required {
                let _ = write!(usage, " {}", arg.usage_fragment());
            } else {
                let _ = write!(usage, " [{}]", arg.usage_fragment());
            }
        }

        let mut rows: Vec<(String, String)> = Vec::new();
        if with_help_flag {
            rows.push(("-h, --help".into(), "show this help message and exit".into()));
        }
        for arg in &self.arguments {
            if let Some(neg) = &arg.negated_flag {
                rows.push((neg.clone(), format!("set {} to false", arg.dest)));
            }
            let mut text = arg.help.clone().unwrap_or_default();
            let note = if arg.required {
                Some("required".to_string())
            } else {
                arg.default
                    .as_ref()
                    .and_then(DefaultValue::literal)
                    .map(|v| format!("default: {v}"))
            };
            if let Some(note) = note {
                if !text.is_empty() {
                    text.push(' ');
                }
                let _ = write!(text, "({note})");
            }
            rows.push((arg.usage_fragment(), text));
        }

        let width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
        let mut out = usage;
        out.push_str("\n\noptions:\n");
        for (left, right) in rows {
            if right.is_empty() {
                let _ = writeln!(out, "  {left}");
            } else {
                let _ = writeln!(out, "  {left:<width$}  {right}");
            }
        }
        out
    }
}

fn synthesize_argument(descriptor: &FieldDescriptor) -> ArgumentSpec {
    let mut spec = ArgumentSpec {
        dest: descriptor.name.clone(),
        flag: format!("--{}", descriptor.name),
        negated_flag: None,
        category: descriptor.category.clone(),
        nullable: descriptor.nullable,
        nargs: Nargs::One,
        const_value: None,
        default: descriptor.default.clone(),
        required: descriptor.required,
        owner: descriptor.owner.clone(),
        help: descriptor.help.clone(),
    };

    match descriptor.category {
        TypeCategory::Bool => {
            // Only a declared `true` earns a negation flag; an undeclared
            // default is also true but stays affirm-only.
            let declared = descriptor.default.as_ref().and_then(DefaultValue::literal);
            if declared == Some(&Value::Bool(true)) {
                spec.negated_flag = Some(format!("--{NEGATION_PREFIX}{}", descriptor.name));
            }
            let default = descriptor
                .default
                .clone()
                .unwrap_or(DefaultValue::Literal(Value::Bool(true)));
            let literal = default.literal().cloned();
            if !(descriptor.nullable && literal == Some(Value::None)) {
                spec.nargs = Nargs::Optional;
                spec.const_value = Some(Value::Bool(true));
            }
            spec.default = Some(default);
            spec.required = false;
        }
        TypeCategory::List(_) => spec.nargs = Nargs::OneOrMore,
        TypeCategory::Int | TypeCategory::Float | TypeCategory::Str | TypeCategory::Enum(_) => {}
    }

    spec
}
