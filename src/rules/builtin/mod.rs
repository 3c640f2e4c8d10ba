mod aws;
mod azure;
mod gcp;

use super::{BestPracticePattern, Rule};

/// Returns all built-in rules, grouped by provider.
pub fn all_rules() -> Vec<Rule> {
    let mut rules = aws::rules();
    rules.extend(azure::rules());
    rules.extend(gcp::rules());
    rules
}

/// Returns all built-in best-practice patterns, grouped by provider.
pub fn all_practices() -> Vec<BestPracticePattern> {
    let mut practices = aws::practices();
    practices.extend(azure::practices());
    practices.extend(gcp::practices());
    practices
}
