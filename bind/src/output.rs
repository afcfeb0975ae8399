//! Output formatting for grammars and bindings.

use config_schema_core::Value;
use serde::Serialize;

use crate::binder::ArgumentBinder;
use crate::grammar::{ArgumentGrammar, ArgumentSpec};
use crate::instance::Binding;

/// Formats for a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Formats for a synthesized grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum GrammarFormat {
    #[default]
    Json,
    Yaml,
    Markdown,
    /// Usage text, as printed for `--help`.
    Help,
}

/// Serializable view of one argument.
#[derive(Debug, Clone, Serialize)]
pub struct ArgumentSummary {
    pub dest: String,
    pub flag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negated_flag: Option<String>,
    #[serde(rename = "type")]
    pub category: String,
    pub nargs: &'static str,
    pub nullable: bool,
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl From<&ArgumentSpec> for ArgumentSummary {
    fn from(spec: &ArgumentSpec) -> Self {
        let choices = spec
            .category
            .enum_values()
            .map(|literals| literals.into_iter().cloned().collect())
            .unwrap_or_default();
        Self {
            dest: spec.dest.clone(),
            flag: spec.flag.clone(),
            negated_flag: spec.negated_flag.clone(),
            category: spec.category.name(),
            nargs: spec.nargs.symbol(),
            nullable: spec.nullable,
            required: spec.required,
            choices,
            default: spec.default.as_ref().and_then(|d| d.literal()).cloned(),
            owner: spec.owner.clone(),
            help: spec.help.clone(),
        }
    }
}

/// Summarizes every argument of a grammar.
pub fn summarize(grammar: &ArgumentGrammar) -> Vec<ArgumentSummary> {
    grammar.arguments().iter().map(ArgumentSummary::from).collect()
}

/// Formats a binding in the requested output format.
pub fn format_binding(binding: &Binding, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(binding)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(binding).map_err(|e| format!("YAML serialization failed: {e}"))
        }
    }
}

/// Formats a binder's grammar in the requested output format.
pub fn format_grammar(binder: &ArgumentBinder, format: GrammarFormat) -> Result<String, String> {
    let summary = summarize(binder.grammar());
    match format {
        GrammarFormat::Json => serde_json::to_string_pretty(&summary)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        GrammarFormat::Yaml => {
            serde_yaml::to_string(&summary).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        GrammarFormat::Markdown => Ok(grammar_to_markdown(&summary)),
        GrammarFormat::Help => Ok(binder.render_help()),
    }
}

fn grammar_to_markdown(summary: &[ArgumentSummary]) -> String {
    let mut out = String::new();
    out.push_str("| Flag | Type | Nargs | Required | Default | Description |\n");
    out.push_str("|------|------|-------|----------|---------|-------------|\n");
    for arg in summary {
        let flag = match &arg.negated_flag {
            Some(neg) => format!("`{}`, `{neg}`", arg.flag),
            None => format!("`{}`", arg.flag),
        };
        let ty = if arg.choices.is_empty() {
            arg.category.clone()
        } else {
            let choices: Vec<String> = arg.choices.iter().map(Value::to_string).collect();
            format!("{{{}}}", choices.join(","))
        };
        let required = if arg.required { "yes" } else { "no" };
        let default = arg
            .default
            .as_ref()
            .map(|v| format!("`{v}`"))
            .unwrap_or_default();
        let help = arg.help.as_deref().unwrap_or("");
        out.push_str(&format!(
            "| {flag} | {ty} | `{}` | {required} | {default} | {help} |\n",
            arg.nargs
        ));
    }
    out
}
