//! Include/exclude rule chains over dotted entry paths and type names.
//!
//! Rules run left to right. The chain starts out rejecting everything when
//! the first rule is an include and accepting everything when it is an
//! exclude. A rule that could only confirm the running decision is skipped,
//! so an include never un-accepts and an exclude never un-rejects.

use crate::error::{ClassdexError, Result};
use regex::Regex;
use std::fmt;

/// A predicate over names.
pub trait Filter: Send + Sync {
    fn accepts(&self, name: &str) -> bool;
}

impl<F> Filter for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn accepts(&self, name: &str) -> bool {
        self(name)
    }
}

/// What a rule matches against
#[derive(Clone)]
pub enum Matcher {
    Prefix(String),
    Pattern(Regex),
}

impl Matcher {
    fn matches(&self, name: &str) -> bool {
        match self {
            Matcher::Prefix(prefix) => name.starts_with(prefix.as_str()),
            Matcher::Pattern(regex) => regex.is_match(name),
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Prefix(prefix) => write!(f, "prefix({})", prefix),
            Matcher::Pattern(regex) => write!(f, "regex({})", regex.as_str()),
        }
    }
}

/// One include or exclude rule
#[derive(Clone, Debug)]
pub enum Rule {
    Include(Matcher),
    Exclude(Matcher),
}

impl Rule {
    pub fn include_prefix(prefix: impl Into<String>) -> Self {
        Rule::Include(Matcher::Prefix(prefix.into()))
    }

    pub fn exclude_prefix(prefix: impl Into<String>) -> Self {
        Rule::Exclude(Matcher::Prefix(prefix.into()))
    }

    /// Include names the whole of which match `pattern`
    pub fn include_regex(pattern: &str) -> Result<Self> {
        Ok(Rule::Include(Matcher::Pattern(full_match(pattern)?)))
    }

    /// Exclude names the whole of which match `pattern`
    pub fn exclude_regex(pattern: &str) -> Result<Self> {
        Ok(Rule::Exclude(Matcher::Pattern(full_match(pattern)?)))
    }

    fn is_include(&self) -> bool {
        matches!(self, Rule::Include(_))
    }

    fn apply(&self, name: &str) -> bool {
        match self {
            Rule::Include(m) => m.matches(name),
            Rule::Exclude(m) => !m.matches(name),
        }
    }
}

fn full_match(pattern: &str) -> Result<Regex> {
    Ok(Regex::new(&format!("^(?:{})$", pattern))?)
}

/// Ordered include/exclude rules. An empty chain accepts everything.
#[derive(Clone, Debug, Default)]
pub struct IncludeExcludeChain {
    rules: Vec<Rule>,
}

impl IncludeExcludeChain {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Parse a comma separated list of prefix rules, e.g.
    /// `"+com.acme, -com.acme.internal"`.
    pub fn parse(rules: &str) -> Result<Self> {
        let mut parsed = Vec::new();
        for raw in rules.split(',') {
            let rule = raw.trim();
            if rule.is_empty() {
                continue;
            }
            let mut chars = rule.chars();
            let sign = chars.next();
            let prefix = chars.as_str();
            match sign {
                Some('+') => parsed.push(Rule::include_prefix(prefix)),
                Some('-') => parsed.push(Rule::exclude_prefix(prefix)),
                _ => {
                    return Err(ClassdexError::InvalidFilter(format!(
                        "rule '{}' should start with either + or -",
                        rule
                    )));
                }
            }
        }
        Ok(Self::new(parsed))
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn test(&self, name: &str) -> bool {
        let mut accept = match self.rules.first() {
            None => return true,
            Some(first) => !first.is_include(),
        };

        for rule in &self.rules {
            if accept == rule.is_include() {
                continue;
            }
            accept = rule.apply(name);
        }

        accept
    }
}

impl Filter for IncludeExcludeChain {
    fn accepts(&self, name: &str) -> bool {
        self.test(name)
    }
}

/// Fluent construction of an [`IncludeExcludeChain`].
#[derive(Default)]
pub struct FilterBuilder {
    rules: Vec<Rule>,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include names fully matching a regular expression
    pub fn include(mut self, regex: &str) -> Result<Self> {
        self.rules.push(Rule::include_regex(regex)?);
        Ok(self)
    }

    /// Exclude names fully matching a regular expression
    pub fn exclude(mut self, regex: &str) -> Result<Self> {
        self.rules.push(Rule::exclude_regex(regex)?);
        Ok(self)
    }

    pub fn include_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.rules.push(Rule::include_prefix(prefix));
        self
    }

    pub fn exclude_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.rules.push(Rule::exclude_prefix(prefix));
        self
    }

    /// Include everything inside a package, e.g. `com.acme`
    pub fn include_package(self, package: &str) -> Self {
        self.include_prefix(package_prefix(package))
    }

    pub fn exclude_package(self, package: &str) -> Self {
        self.exclude_prefix(package_prefix(package))
    }

    pub fn build(self) -> IncludeExcludeChain {
        IncludeExcludeChain::new(self.rules)
    }
}

fn package_prefix(package: &str) -> String {
    format!("{}.", package.trim_end_matches('.'))
}
