//! Formula Rewrite Rules
//!
//! Each rule pairs a pattern with one phrase per language. The phrase is
//! either a capture template (`${name}` / `${1}`) or a function computing the
//! text from the match. Around every phrase the rule's shortcut is emitted,
//! so that `\sqrt` can be found both as `sqrt` and as `square root`.
//!
//! Rule order matters: the rewriter applies rules in list order on every pass.

use std::collections::BTreeMap;
use std::fmt;

use regex::{Captures, Regex};

use super::LatexLanguage;
use crate::core::search::error::{Result, SearchError};

/// Computes a phrase from a rule match.
pub type ComputeFn = fn(&Captures<'_>) -> String;

#[derive(Clone)]
pub enum Replacement {
    /// Template expanded against the match captures.
    Literal(String),
    Computed(ComputeFn),
}

impl Replacement {
    pub fn literal(template: impl Into<String>) -> Self {
        Self::Literal(template.into())
    }

    fn render(&self, caps: &Captures<'_>) -> String {
        match self {
            Self::Literal(template) => {
                let mut out = String::new();
                caps.expand(template, &mut out);
                out
            }
            Self::Computed(compute) => compute(caps),
        }
    }
}

impl fmt::Debug for Replacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(template) => f.debug_tuple("Literal").field(template).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

// ============================================================================
// Rule Specification
// ============================================================================

/// Uncompiled rule, built with a small builder API.
#[derive(Debug, Clone)]
pub struct RuleSpec {
    pattern: String,
    shortcut: Option<String>,
    function_form: bool,
    replacements: BTreeMap<LatexLanguage, Replacement>,
}

impl RuleSpec {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            shortcut: None,
            function_form: false,
            replacements: BTreeMap::new(),
        }
    }

    /// Short name emitted in front of the phrase.
    pub fn shortcut(mut self, shortcut: impl Into<String>) -> Self {
        self.shortcut = Some(shortcut.into());
        self
    }

    /// Wrap the phrase as `\REPL{...}` so that the braces it opens stay
    /// balanced until the final cleanup.
    pub fn function_form(mut self) -> Self {
        self.function_form = true;
        self
    }

    pub fn phrase(mut self, language: LatexLanguage, replacement: Replacement) -> Self {
        self.replacements.insert(language, replacement);
        self
    }

    pub fn english(self, replacement: Replacement) -> Self {
        self.phrase(LatexLanguage::English, replacement)
    }

    pub fn polish(self, replacement: Replacement) -> Self {
        self.phrase(LatexLanguage::Polish, replacement)
    }

    pub fn compile(self) -> Result<TransformationRule> {
        let pattern = Regex::new(&self.pattern).map_err(|source| SearchError::Pattern {
            rule: self.pattern.clone(),
            source,
        })?;

        if self.replacements.is_empty() {
            return Err(SearchError::Config(format!(
                "rule '{}' has no replacement",
                self.pattern
            )));
        }

        Ok(TransformationRule {
            pattern,
            shortcut: self.shortcut.unwrap_or_default(),
            function_form: self.function_form,
            replacements: self.replacements,
        })
    }
}

// ============================================================================
// Compiled Rule
// ============================================================================

#[derive(Debug, Clone)]
pub struct TransformationRule {
    pattern: Regex,
    shortcut: String,
    function_form: bool,
    replacements: BTreeMap<LatexLanguage, Replacement>,
}

impl TransformationRule {
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn shortcut(&self) -> Option<&str> {
        (!self.shortcut.is_empty()).then_some(self.shortcut.as_str())
    }

    pub fn is_function_form(&self) -> bool {
        self.function_form
    }

    /// Replace every match in `text`, returning the new text and the number
    /// of substitutions. A language without its own phrase uses the first
    /// phrase the rule has.
    pub fn apply(&self, text: &str, language: LatexLanguage) -> (String, usize) {
        let Some(replacement) = self
            .replacements
            .get(&language)
            .or_else(|| self.replacements.values().next())
        else {
            return (text.to_string(), 0);
        };

        let mut count = 0;
        let rewritten = self.pattern.replace_all(text, |caps: &Captures<'_>| {
            count += 1;
            self.decorate(&replacement.render(caps))
        });
        (rewritten.into_owned(), count)
    }

    fn decorate(&self, phrase: &str) -> String {
        if self.function_form {
            format!(" \\REPL{{{} {}}} ", self.shortcut, phrase)
        } else {
            format!(" {} {} ", self.shortcut, phrase)
        }
    }
}

// ============================================================================
// Rule Set
// ============================================================================

/// Ordered, compiled rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<TransformationRule>,
}

impl RuleSet {
    pub fn compile(specs: impl IntoIterator<Item = RuleSpec>) -> Result<Self> {
        let rules = specs
            .into_iter()
            .map(RuleSpec::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// English and Polish phrasing for common notation.
    pub fn builtin() -> Result<Self> {
        Self::compile(builtin_specs())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TransformationRule> {
        self.rules.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransformationRule> {
        self.rules.iter()
    }
}

// ============================================================================
// Builtin Rules
// ============================================================================

/// Any `\command` that may start an integral: `\int`, `\iint`, `\oint`, ...
const INTEGRAL: &str = r"\\(?:(?P<o>o)?i{0,3}int|smallint|intop)";

/// A single argument: one character, a command with up to two braced
/// arguments, or a braced group.
fn arg(name: &str, optional: bool) -> String {
    let opt = if optional { "?" } else { "" };
    format!(
        r"\s*(?P<{name}>[0-9A-Za-z]|\\[0-9A-Za-z]+(?:(?:\s*\{{.*\}}\s*){{1,2}})?|\{{\s*.*?\s*\}}){opt}\s*"
    )
}

fn word(pattern: impl Into<String>, english: &str, polish: &str) -> RuleSpec {
    RuleSpec::new(pattern)
        .english(Replacement::literal(english))
        .polish(Replacement::literal(polish))
}

fn computed(pattern: impl Into<String>, english: ComputeFn, polish: ComputeFn) -> RuleSpec {
    RuleSpec::new(pattern)
        .english(Replacement::Computed(english))
        .polish(Replacement::Computed(polish))
}

fn group<'c>(caps: &'c Captures<'_>, name: &str) -> &'c str {
    caps.name(name).map_or("", |m| m.as_str())
}

fn join_words(words: &[&str]) -> String {
    words
        .iter()
        .filter(|w| !w.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

fn contour_en(caps: &Captures<'_>) -> &'static str {
    if caps.name("o").is_some() {
        "contour"
    } else {
        ""
    }
}

fn contour_pl(caps: &Captures<'_>) -> &'static str {
    if caps.name("o").is_some() {
        "po konturze"
    } else {
        ""
    }
}

fn indefinite_integral_en(caps: &Captures<'_>) -> String {
    join_words(&[contour_en(caps), "indefinite integral of", group(caps, "rest")])
}

fn indefinite_integral_pl(caps: &Captures<'_>) -> String {
    join_words(&["całka nieoznaczona", contour_pl(caps), "z", group(caps, "rest")])
}

fn definite_integral_en(caps: &Captures<'_>) -> String {
    join_words(&[
        contour_en(caps),
        "definite integral from",
        group(caps, "sub"),
        "to",
        group(caps, "sup"),
        "of",
    ])
}

fn definite_integral_pl(caps: &Captures<'_>) -> String {
    join_words(&[
        "całka oznaczona",
        contour_pl(caps),
        "od",
        group(caps, "sub"),
        "do",
        group(caps, "sup"),
        "z",
    ])
}

fn trig_shortcut(caps: &Captures<'_>) -> String {
    format!(
        "{}{}{}",
        group(caps, "arc"),
        group(caps, "func"),
        group(caps, "h")
    )
}

fn trig_en(caps: &Captures<'_>) -> String {
    let name = match group(caps, "func") {
        "sin" => "sine",
        "cos" => "cosine",
        "tan" => "tangent",
        _ => "cotangent",
    };
    let arc = if caps.name("arc").is_some() { "inverse arc" } else { "" };
    let hyperbolic = if caps.name("h").is_some() { "hyperbolic" } else { "" };
    join_words(&[&trig_shortcut(caps), arc, hyperbolic, name, "function of"])
}

fn trig_pl(caps: &Captures<'_>) -> String {
    let name = match group(caps, "func") {
        "sin" => "sinus",
        "cos" => "kosinus",
        "tan" => "tangens",
        _ => "kotangens",
    };
    let arc = if caps.name("arc").is_some() { "arkus" } else { "" };
    let hyperbolic = if caps.name("h").is_some() { "hiperboliczny" } else { "" };
    join_words(&[&trig_shortcut(caps), "funkcja", arc, name, hyperbolic, "z"])
}

fn builtin_specs() -> Vec<RuleSpec> {
    vec![
        word(r"\\infty", "infinity", "nieskończoność").shortcut("infty"),
        word(r"\\dim", "dimension of", "wymiar").shortcut("dim"),
        word(r"\\degree", "degrees", "stopni").shortcut("degree"),
        word(r"\\to", "to", "dążące do"),
        word(r"\\limits", "in limits", "w granicach"),
        word(r"\\vec", "vector", "wektor"),
        word(r"\\dot", "time derivative of", "pochodna po czasie z"),
        word(r"\\bar", "average", "średnia"),
        word(r"\\hat", "operator", "operator"),
        // arithmetic
        word(r"\+", "plus", "plus"),
        word(r"-", "minus", "minus"),
        word(r"\*", "times", "razy mnożone przez"),
        word(r"\\times", "times", "razy mnożone przez"),
        word(r"/", "divided by", "dzielone przez"),
        word(r"=", "equals to", "równa się"),
        word(r"\\neq", "not equals to", "jest różne od"),
        word(r"\\approx", "is approximately", "równa się w przybliżeniu"),
        word(r"\\leq", "is less than equal to", "jest mniejsze lub równe"),
        word(r"\\ll", "is much smaller than", "jest dużo mniejsze niż"),
        word(r"\\geq", "is greater than equal to", "jest większe lub równe"),
        word(r"\\gg", "is much greater than", "jest dużo większe niż"),
        word(
            r"\\[td]?frac\{(.*)\}\{(.*)\}",
            "fraction ${1} divided by ${2}",
            "ułamek ${1} dzielone przez ${2}",
        )
        .function_form(),
        word(
            format!(r"\{{{}\\over{}\}}", arg("num", false), arg("den", false)),
            "fraction ${num} divided by ${den}",
            "ułamek ${num} dzielone przez ${den}",
        )
        .function_form(),
        word(r"\\Im", "imaginary part of", "część urojona zespolona z").function_form(),
        word(r"\\Re", "real part of", "część rzeczywista z").function_form(),
        // powers
        word(r"\^\s*(2|\{\s*2\s*\})", "squared", "do kwadratu"),
        word(
            r"\^\s*([0-13-9]+|\{\s*[0-13-9]+\s*\}|\{\s*(?:minus|plus|\+|-)\s*[0-9]+\s*\})",
            "to the power of ${1}",
            "podniesione do potęgi ${1}",
        ),
        word(r"\\sqrt", "square root function of", "funkcja pierwiastek kwadratowy z")
            .shortcut("sqrt")
            .function_form(),
        // limits and bounds; liminf/limsup go first since \lim is their prefix
        word(r"\\liminf", "infimum limit", "granica infimum").shortcut("liminf"),
        word(r"\\limsup", "supremum limit", "granica supremum").shortcut("limsup"),
        word(r"\\lim", "limit", "granica").shortcut("lim"),
        word(r"\\inf", "infimum of", "infimum z").shortcut("inf"),
        word(r"\\sup", "supremum of", "supremum z").shortcut("sup"),
        word(r"\\max", "maximum of", "maksimum z").shortcut("max"),
        word(r"\\min", "minimum of", "minimum z").shortcut("min"),
        word(r"\\sum", "sum of", "suma").shortcut("sum"),
        word(r"\\prod", "product of", "iloczyn").shortcut("prod"),
        word(r"\\partial", "partial derivative", "pochodna cząstkowa"),
        // integrals
        computed(
            format!(r"{INTEGRAL}\s*(?P<rest>[^_^o][^_^]*)"),
            indefinite_integral_en,
            indefinite_integral_pl,
        )
        .shortcut("int"),
        computed(
            format!(r"{INTEGRAL}\s*_{}\^?{}", arg("sub", false), arg("sup", true)),
            definite_integral_en,
            definite_integral_pl,
        )
        .shortcut("int")
        .function_form(),
        computed(
            format!(r"{INTEGRAL}\s*\^{}_?{}", arg("sup", false), arg("sub", true)),
            definite_integral_en,
            definite_integral_pl,
        )
        .shortcut("int")
        .function_form(),
        // symbols
        word(r"\\alpha", "alpha", "alfa").function_form(),
        word(r"\\pi", "number pi", "liczba pi").function_form(),
        word(r"\\Delta", "change delta of", "zmiana delta").function_form(),
        word(r"\\Nabla", "divergence nabla of", "dywergencja nabla"),
        // functions
        word(r"\\exp", "exponent function of", "funkcja wykładnicza z").shortcut("exp"),
        word(r"\\ln", "natural logarithm function of", "funkcja logarytm naturalny z")
            .shortcut("ln"),
        word(r"\\log", "logarithm function of", "funkcja logarytm z").shortcut("log"),
        computed(
            r"\\(?P<arc>arc)?(?P<func>sin|cos|cot|tan)(?P<h>h)?",
            trig_en,
            trig_pl,
        ),
        word(r"!", "factorial", "silnia"),
        word(
            format!(r"\\[td]?binom{}{}", arg("up", false), arg("down", false)),
            "binomial ${up} choose ${down}",
            "kombinacja ${up} nad ${down}",
        )
        .shortcut("binom")
        .function_form(),
        word(
            format!(r"\{{{}\\choose{}\}}", arg("up", false), arg("down", false)),
            "binomial ${up} choose ${down}",
            "kombinacja ${up} nad ${down}",
        )
        .shortcut("choose")
        .function_form(),
    ]
}
