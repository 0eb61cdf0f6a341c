//! Response formatter. Turns raw model output into a display-ready report.
//!
//! Two ordered rule lists:
//!
//! 1. `MARKUP_RULES` strip markdown/HTML artifacts. Order matters: `**` before `*`,
//!    ```` ``` ```` before `` ` ``, links before generic tags. The list is re-run until
//!    nothing changes, so removing one marker can never expose another.
//! 2. `LAYOUT_RULES` insert structural whitespace. Each anchor rule swallows the
//!    whole whitespace run on both sides of its anchor and writes a fixed
//!    separator back, so the last rule touching a run decides it. Competency
//!    lines run before the headings that introduce them for that reason.
//!
//! A later layout rule can still split a span an earlier one matched (a
//! numbered item inside a competency parenthetical), so `format_report` reruns
//! the whole pipeline until the text stops changing. Newlines written by the
//! layout rules are never turned back into spaces, so a split span stays
//! split and the loop settles within a couple of passes.

use std::borrow::Cow;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

/// Upper bound on full pipeline passes in `format_report`.
const MAX_PASSES: usize = 8;

/// How many matches a rule rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    First,
    All,
}

/// A single (pattern, replacement) substitution.
pub struct Rule {
    pub name: &'static str,
    pattern: Regex,
    replacement: &'static str,
    scope: Scope,
}

impl Rule {
    fn new(name: &'static str, pattern: &str, replacement: &'static str, scope: Scope) -> Self {
        Rule {
            name,
            pattern: Regex::new(pattern).expect("formatter rule pattern must compile"),
            replacement,
            scope,
        }
    }

    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match self.scope {
            Scope::First => self.pattern.replace(text, self.replacement),
            Scope::All => self.pattern.replace_all(text, self.replacement),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .field("scope", &self.scope)
            .finish()
    }
}

lazy_static! {
    static ref MARKUP_RULES: Vec<Rule> = vec![
        Rule::new("bold", r"\*\*", "", Scope::All),
        Rule::new("italic", r"\*", "", Scope::All),
        Rule::new("underline", r"__", "", Scope::All),
        Rule::new("strikethrough", r"~~", "", Scope::All),
        Rule::new("code_fence", r"```", "", Scope::All),
        Rule::new("code_span", r"`", "", Scope::All),
        Rule::new("horizontal_rule", r"-{3,}", "", Scope::All),
        Rule::new("link", r"\[(.*?)\]\(.*?\)", "${1}", Scope::All),
        Rule::new("html_tag", r"</?[^>]+(?:>|$)", "", Scope::All),
    ];

    static ref LAYOUT_RULES: Vec<Rule> = vec![
        Rule::new(
            "competency_line",
            r"\s*(Competência [IVXLCDM]+ \(.*?\): \d+/200)\s*",
            "\n${1}\n",
            Scope::All,
        ),
        Rule::new(
            "feedback_marker",
            r"\s*(Pontos Fortes:|Ajustes:)\s*",
            "\n${1}\n",
            Scope::All,
        ),
        Rule::new(
            "final_score_banner",
            r"(?:=+[^\S\n]*)?(Nota Final: \d+/1000)(?:[^\S\n]*=+)?\s*",
            "===== ${1} =====\n\n",
            Scope::First,
        ),
        Rule::new(
            "details_heading",
            r"\s*(Detalhamento por Competência:)\s*",
            "\n\n${1}\n\n",
            Scope::First,
        ),
        Rule::new(
            "closing_section",
            r"\s*(Recomendações para Melhoria:|Observação Final:)\s*",
            "\n\n${1}\n\n",
            Scope::All,
        ),
        // `12. ` preceded by start of line or whitespace; `1000.` and `8.5` stay put.
        Rule::new(
            "numbered_item",
            r"(?m)(?:^|[^\S\n]*\n[^\S\n]*|[^\S\n]+)(\d{1,2}\.)[^\S\n]+",
            "\n${1} ",
            Scope::All,
        ),
        Rule::new("blank_runs", r"\n{3,}", "\n\n", Scope::All),
    ];
}

fn apply_rules(rules: &[Rule], text: &str) -> String {
    rules
        .iter()
        .fold(text.to_string(), |acc, rule| rule.apply(&acc).into_owned())
}

/// Removes inline markup. Every rule only deletes characters, so the loop ends.
pub fn strip_markup(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = apply_rules(&MARKUP_RULES, &current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Inserts section breaks and list breaks, collapses blank runs.
pub fn apply_layout(text: &str) -> String {
    apply_rules(&LAYOUT_RULES, text)
}

/// Full formatting pipeline: strip, lay out, trim, repeated until stable.
pub fn format_report(raw: &str) -> String {
    let mut current = raw.to_string();
    for _ in 0..MAX_PASSES {
        let next = apply_layout(&strip_markup(&current)).trim().to_string();
        if next == current {
            return current;
        }
        current = next;
    }
    warn!("Report layout still changing after {MAX_PASSES} passes");
    current
}
