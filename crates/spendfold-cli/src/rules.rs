use std::fs;
use std::path::Path;

use spendfold_core::categorize::RuleSet;
use spendfold_core::{CoreError, CoreResult};
use tracing::debug;

const BUNDLED_RULES: &str = include_str!("../config/default_rules.toml");

/// Rules from `--rules <path>` when given, otherwise the bundled set.
pub fn load_rules(path: Option<&Path>) -> CoreResult<RuleSet> {
    let Some(path) = path else {
        return RuleSet::from_toml_str(BUNDLED_RULES);
    };

    let text = fs::read_to_string(path).map_err(|error| {
        CoreError::invalid_rule_set(&format!("cannot read `{}`: {error}", path.display()))
    })?;
    let rules = RuleSet::from_toml_str(&text)?;
    debug!(path = %path.display(), rules = rules.rules().len(), "loaded category rules");
    Ok(rules)
}
