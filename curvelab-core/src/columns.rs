//! Ranked-rule column identification for foreign CSV headers.
//!
//! Exported training logs disagree about what the step and value columns are
//! called. Identification walks an ordered rule list: the first rule with a
//! matching header wins, and within one rule headers are scanned in table
//! order. Priority and tie-breaking live in the rule tables below where a
//! test can pin them.

/// How a rule's pattern is compared against headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Some header equals the pattern (ASCII case-insensitive).
    Exact,
    /// Some header equals the pattern, else some header ends with it (both
    /// case-insensitive). All headers are tried for an exact hit before any
    /// suffix hit counts.
    ExactThenSuffix,
}

/// One (pattern, comparison) entry in a matcher's priority list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRule {
    pub pattern: &'static str,
    pub kind: RuleKind,
}

impl ColumnRule {
    pub const fn exact(pattern: &'static str) -> Self {
        Self {
            pattern,
            kind: RuleKind::Exact,
        }
    }

    pub const fn exact_then_suffix(pattern: &'static str) -> Self {
        Self {
            pattern,
            kind: RuleKind::ExactThenSuffix,
        }
    }
}

/// Step-axis candidates, most common first.
pub const STEP_RULES: &[ColumnRule] = &[
    ColumnRule::exact("step"),
    ColumnRule::exact("global_step"),
    ColumnRule::exact("_step"),
    ColumnRule::exact("total_steps"),
    ColumnRule::exact("timestep"),
    ColumnRule::exact("epoch"),
    ColumnRule::exact("iteration"),
    ColumnRule::exact("frame"),
    ColumnRule::exact("time"),
    ColumnRule::exact("index"),
];

/// Metric-value candidates, most specific first. Suffix matching covers the
/// `{run name} - episode_return` shape tensorboard-style exports produce.
pub const VALUE_RULES: &[ColumnRule] = &[
    ColumnRule::exact_then_suffix("- episode_return"),
    ColumnRule::exact_then_suffix("charts/episodic_return"),
    ColumnRule::exact_then_suffix("eval/avg_reward"),
    ColumnRule::exact_then_suffix(" - episode_return"),
    ColumnRule::exact_then_suffix("rollout/ep_rew_mean"),
    ColumnRule::exact_then_suffix("Value"),
    ColumnRule::exact_then_suffix("eval_episodes/mean_reward"),
    ColumnRule::exact_then_suffix("eval_episode_reward"),
    ColumnRule::exact_then_suffix("AverageReturn"),
    ColumnRule::exact_then_suffix("MeanReturn"),
    ColumnRule::exact_then_suffix("performance/mean_episode_reward"),
    ColumnRule::exact_then_suffix("Train/mean_reward"),
    ColumnRule::exact_then_suffix("charts/zero_grad_ratio"),
    ColumnRule::exact_then_suffix("zero_vectors"),
];

/// Ranked-rule matcher pairing a step rule list with a value rule list.
#[derive(Debug, Clone)]
pub struct ColumnMatcher {
    step_rules: Vec<ColumnRule>,
    value_rules: Vec<ColumnRule>,
}

impl Default for ColumnMatcher {
    fn default() -> Self {
        Self {
            step_rules: STEP_RULES.to_vec(),
            value_rules: VALUE_RULES.to_vec(),
        }
    }
}

impl ColumnMatcher {
    pub fn new(step_rules: Vec<ColumnRule>, value_rules: Vec<ColumnRule>) -> Self {
        Self {
            step_rules,
            value_rules,
        }
    }

    /// First header matching the step rule list, in rule priority order.
    pub fn find_step<'a>(&self, headers: &'a [String]) -> Option<&'a str> {
        find(&self.step_rules, headers)
    }

    /// First header matching the value rule list, in rule priority order.
    pub fn find_value<'a>(&self, headers: &'a [String]) -> Option<&'a str> {
        find(&self.value_rules, headers)
    }
}

fn find<'a>(rules: &[ColumnRule], headers: &'a [String]) -> Option<&'a str> {
    let lowered: Vec<String> = headers.iter().map(|h| h.to_ascii_lowercase()).collect();
    for rule in rules {
        let pattern = rule.pattern.to_ascii_lowercase();
        let exact = lowered.iter().position(|h| *h == pattern);
        let hit = match rule.kind {
            RuleKind::Exact => exact,
            RuleKind::ExactThenSuffix => {
                exact.or_else(|| lowered.iter().position(|h| h.ends_with(&pattern)))
            }
        };
        if let Some(idx) = hit {
            return Some(&headers[idx]);
        }
    }
    None
}
