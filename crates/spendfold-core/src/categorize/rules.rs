use serde::{Deserialize, Serialize};

use crate::transaction::{HIDDEN_LABEL, PAYMENT_LABEL, UNCATEGORIZED_LABEL, entity_key};
use crate::{CoreError, CoreResult};

/// Pattern that matches every title.
pub const MATCH_ALL_PATTERN: &str = "*";

pub const DEFAULT_PAYMENT_PATTERNS: &[&str] = &["pagamento recebido", "payment received"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    #[default]
    Contains,
    Exact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub pattern: String,
    pub category: String,
    #[serde(default, rename = "match")]
    pub match_kind: MatchKind,
}

impl CategoryRule {
    pub fn contains(pattern: &str, category: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            category: category.to_string(),
            match_kind: MatchKind::Contains,
        }
    }

    pub fn exact(pattern: &str, category: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            category: category.to_string(),
            match_kind: MatchKind::Exact,
        }
    }

    /// `entity` must already be in entity-key form.
    pub fn matches(&self, entity: &str) -> bool {
        let pattern = entity_key(&self.pattern);
        if pattern == MATCH_ALL_PATTERN {
            return true;
        }
        match self.match_kind {
            MatchKind::Contains => entity.contains(&pattern),
            MatchKind::Exact => entity == pattern,
        }
    }
}

/// Which label an entity resolved to and which ordered rule produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub label: String,
    pub rule_index: Option<usize>,
}

/// Ordered category rules plus the reserved payment and hidden routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<CategoryRule>,
    payment_patterns: Vec<String>,
    hidden_patterns: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleFile {
    #[serde(default)]
    rules: Vec<CategoryRule>,
    #[serde(default)]
    payment_patterns: Option<Vec<String>>,
    #[serde(default)]
    hidden_patterns: Vec<String>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            payment_patterns: default_payment_patterns(),
            hidden_patterns: Vec::new(),
        }
    }
}

impl RuleSet {
    pub fn new(rules: Vec<CategoryRule>) -> CoreResult<Self> {
        Self::with_patterns(rules, default_payment_patterns(), Vec::new())
    }

    pub fn with_patterns(
        rules: Vec<CategoryRule>,
        payment_patterns: Vec<String>,
        hidden_patterns: Vec<String>,
    ) -> CoreResult<Self> {
        for (index, rule) in rules.iter().enumerate() {
            if rule.pattern.trim().is_empty() {
                return Err(CoreError::invalid_rule_set(&format!(
                    "rule {} has an empty pattern",
                    index + 1
                )));
            }
            if rule.category.trim().is_empty() {
                return Err(CoreError::invalid_rule_set(&format!(
                    "rule {} (`{}`) has an empty category",
                    index + 1,
                    rule.pattern
                )));
            }
        }

        Ok(Self {
            rules,
            payment_patterns: clean_patterns(payment_patterns),
            hidden_patterns: clean_patterns(hidden_patterns),
        })
    }

    pub fn from_toml_str(text: &str) -> CoreResult<Self> {
        let file: RuleFile =
            toml::from_str(text).map_err(|error| CoreError::invalid_rule_set(error.message()))?;
        Self::with_patterns(
            file.rules,
            file.payment_patterns
                .unwrap_or_else(default_payment_patterns),
            file.hidden_patterns,
        )
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn is_payment(&self, entity: &str) -> bool {
        self.payment_patterns
            .iter()
            .any(|pattern| entity.contains(pattern.as_str()))
    }

    pub fn is_hidden(&self, entity: &str) -> bool {
        self.hidden_patterns
            .iter()
            .any(|pattern| entity.contains(pattern.as_str()))
    }

    /// Resolves an entity key to exactly one label.
    pub fn evaluate(&self, entity: &str) -> Assignment {
        if self.is_payment(entity) {
            return Assignment {
                label: PAYMENT_LABEL.to_string(),
                rule_index: None,
            };
        }
        if self.is_hidden(entity) {
            return Assignment {
                label: HIDDEN_LABEL.to_string(),
                rule_index: None,
            };
        }

        self.rules
            .iter()
            .position(|rule| rule.matches(entity))
            .map(|index| Assignment {
                label: self.rules[index].category.clone(),
                rule_index: Some(index),
            })
            .unwrap_or_else(|| Assignment {
                label: UNCATEGORIZED_LABEL.to_string(),
                rule_index: None,
            })
    }
}

fn default_payment_patterns() -> Vec<String> {
    DEFAULT_PAYMENT_PATTERNS
        .iter()
        .map(|pattern| pattern.to_string())
        .collect()
}

fn clean_patterns(patterns: Vec<String>) -> Vec<String> {
    patterns
        .iter()
        .map(|pattern| entity_key(pattern))
        .filter(|pattern| !pattern.is_empty())
        .collect()
}
