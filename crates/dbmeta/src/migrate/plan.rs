//! Grouping of classified scripts into a dependency-ordered plan.

use tracing::warn;

use crate::scripts::{ClassifiedScript, ScriptCategory, ScriptFile};

/// Order in which script groups are applied. Tables may use domains and
/// procedures may use tables, so this order is fixed.
pub const GROUP_ORDER: [ScriptCategory; 3] = [
    ScriptCategory::Domain,
    ScriptCategory::Table,
    ScriptCategory::Procedure,
];

/// Scripts of one category, sorted by file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionGroup {
    pub category: ScriptCategory,
    pub scripts: Vec<ClassifiedScript>,
}

impl ExecutionGroup {
    fn new(category: ScriptCategory) -> Self {
        Self {
            category,
            scripts: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

/// Every group for one update run, in [`GROUP_ORDER`].
///
/// Groups can only be built through [`MigrationPlan::from_scripts`], so the
/// application order cannot be changed by callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationPlan {
    groups: Vec<ExecutionGroup>,
    skipped: Vec<ScriptFile>,
}

impl MigrationPlan {
    /// Classify scripts and sort them into groups.
    ///
    /// Unrecognized scripts are left out of the plan and listed in
    /// [`skipped`](MigrationPlan::skipped).
    pub fn from_scripts(scripts: impl IntoIterator<Item = ScriptFile>) -> Self {
        let mut groups: Vec<ExecutionGroup> =
            GROUP_ORDER.iter().map(|c| ExecutionGroup::new(*c)).collect();
        let mut skipped = Vec::new();

        for script in scripts {
            let classified = ClassifiedScript::new(script);
            match groups.iter_mut().find(|g| g.category == classified.category) {
                Some(group) => group.scripts.push(classified),
                None => {
                    warn!(
                        "Skipping unsupported script: {}",
                        classified.script.file_name()
                    );
                    skipped.push(classified.script);
                }
            }
        }

        for group in &mut groups {
            group
                .scripts
                .sort_by_key(|s| s.script.file_name());
        }

        Self { groups, skipped }
    }

    /// Groups in application order, including empty ones.
    pub fn groups(&self) -> &[ExecutionGroup] {
        &self.groups
    }

    /// Scripts that matched no known statement.
    pub fn skipped(&self) -> &[ScriptFile] {
        &self.skipped
    }

    /// Number of scripts that will be executed.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.scripts.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(name: &str, text: &str) -> ScriptFile {
        ScriptFile::new(format!("/scripts/{}", name), text)
    }

    #[test]
    fn test_groups_follow_fixed_order() {
        let plan = MigrationPlan::from_scripts(vec![
            script("a_proc.sql", "CREATE PROCEDURE P AS BEGIN END"),
            script("b_table.sql", "CREATE TABLE T (ID D_ID);"),
            script("c_domain.sql", "CREATE DOMAIN D_ID INTEGER;"),
        ]);

        let categories: Vec<ScriptCategory> = plan.groups().iter().map(|g| g.category).collect();
        assert_eq!(categories, GROUP_ORDER.to_vec());
        assert_eq!(plan.groups()[0].scripts[0].script.file_name(), "c_domain.sql");
        assert_eq!(plan.groups()[1].scripts[0].script.file_name(), "b_table.sql");
        assert_eq!(plan.groups()[2].scripts[0].script.file_name(), "a_proc.sql");
        assert_eq!(plan.len(), 3);
    }

    #[test]
    fn test_scripts_sorted_within_group() {
        let plan = MigrationPlan::from_scripts(vec![
            script("20_orders.sql", "CREATE TABLE ORDERS (ID INTEGER);"),
            script("10_customers.sql", "CREATE TABLE CUSTOMERS (ID INTEGER);"),
            script("15_alter.sql", "ALTER TABLE CUSTOMERS ADD NAME VARCHAR(10);"),
        ]);

        let names: Vec<String> = plan.groups()[1]
            .scripts
            .iter()
            .map(|s| s.script.file_name())
            .collect();
        assert_eq!(names, vec!["10_customers.sql", "15_alter.sql", "20_orders.sql"]);
        assert!(plan.groups()[0].is_empty());
        assert!(plan.groups()[2].is_empty());
    }

    #[test]
    fn test_unrecognized_scripts_skipped() {
        let plan = MigrationPlan::from_scripts(vec![
            script("select.sql", "SELECT 1 FROM RDB$DATABASE"),
            script("domain.sql", "CREATE DOMAIN D_ID INTEGER;"),
        ]);

        assert_eq!(plan.len(), 1);
        assert_eq!(plan.skipped().len(), 1);
        assert_eq!(plan.skipped()[0].file_name(), "select.sql");
    }

    #[test]
    fn test_empty_plan() {
        let plan = MigrationPlan::from_scripts(Vec::new());
        assert!(plan.is_empty());
        assert_eq!(plan.groups().len(), 3);
    }
}
