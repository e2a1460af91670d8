//! Dashboard table definitions and the plans that create them
//!
//! The tables are hard-coded DDL (PostgreSQL dialect). A plan is an ordered
//! list of steps; each step touches exactly one table and is either a
//! destructive reset (drop and recreate) or an idempotent ensure (create
//! when missing). Executing a plan is the server crate's job.

use std::fmt;

/// One table: its name and the column list of its `CREATE TABLE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static str,
}

impl TableDef {
    /// `CREATE TABLE IF NOT EXISTS` - safe to repeat
    pub fn create_if_missing_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (\n{}\n)",
            self.name,
            self.columns.trim_end()
        )
    }

    /// Unguarded `CREATE TABLE`, fails if the table exists
    pub fn create_sql(&self) -> String {
        format!("CREATE TABLE \"{}\" (\n{}\n)", self.name, self.columns.trim_end())
    }

    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS \"{}\"", self.name)
    }
}

pub const DASHBOARD_SETTINGS: TableDef = TableDef {
    name: "dashboard_settings",
    columns: r#"    "id" SERIAL PRIMARY KEY,
    "key" VARCHAR(255) UNIQUE NOT NULL,
    "value" JSONB NOT NULL,
    "created_at" TIMESTAMP(3) NOT NULL DEFAULT CURRENT_TIMESTAMP,
    "updated_at" TIMESTAMP(3) NOT NULL DEFAULT CURRENT_TIMESTAMP"#,
};

/// Account records. `id` is TEXT so auth adapters can store their own ids.
pub const USERS: TableDef = TableDef {
    name: "users",
    columns: r#"    "id" TEXT PRIMARY KEY DEFAULT gen_random_uuid()::text,
    "username" VARCHAR(255) UNIQUE,
    "email" VARCHAR(255),
    "first_name" VARCHAR(255),
    "last_name" VARCHAR(255),
    "password" VARCHAR(255),
    "is_active" BOOLEAN NOT NULL DEFAULT true,
    "is_admin" BOOLEAN NOT NULL DEFAULT false,
    "is_moderator" BOOLEAN NOT NULL DEFAULT false,
    "date_joined" TIMESTAMP(3) NOT NULL DEFAULT CURRENT_TIMESTAMP,
    "last_login" TIMESTAMP(3),
    "attributes" JSONB,
    "authentik_id" VARCHAR(255) UNIQUE,
    "matrix_user_id" VARCHAR(255),
    "phone_number" VARCHAR(20),
    "signal_uuid" VARCHAR(255),
    "notes" TEXT"#,
};

pub const COMMUNITY_BOOKMARKS: TableDef = TableDef {
    name: "community_bookmarks",
    columns: r#"    "id" SERIAL PRIMARY KEY,
    "user_id" TEXT REFERENCES "users"("id") ON DELETE CASCADE,
    "title" VARCHAR(255) NOT NULL,
    "url" VARCHAR(500) NOT NULL,
    "description" TEXT,
    "created_at" TIMESTAMP(3) NOT NULL DEFAULT CURRENT_TIMESTAMP"#,
};

pub const DASHBOARD_ANNOUNCEMENTS: TableDef = TableDef {
    name: "dashboard_announcements",
    columns: r#"    "id" SERIAL PRIMARY KEY,
    "title" VARCHAR(255) NOT NULL,
    "content" TEXT NOT NULL,
    "author_id" TEXT REFERENCES "users"("id"),
    "created_at" TIMESTAMP(3) NOT NULL DEFAULT CURRENT_TIMESTAMP,
    "updated_at" TIMESTAMP(3) NOT NULL DEFAULT CURRENT_TIMESTAMP,
    "is_active" BOOLEAN NOT NULL DEFAULT true"#,
};

pub const USER_INVITATIONS: TableDef = TableDef {
    name: "user_invitations",
    columns: r#"    "id" SERIAL PRIMARY KEY,
    "email" VARCHAR(255) NOT NULL,
    "token" VARCHAR(255) UNIQUE NOT NULL,
    "created_by_id" TEXT REFERENCES "users"("id"),
    "created_at" TIMESTAMP(3) NOT NULL DEFAULT CURRENT_TIMESTAMP,
    "expires_at" TIMESTAMP(3) NOT NULL,
    "used_at" TIMESTAMP(3),
    "is_active" BOOLEAN NOT NULL DEFAULT true"#,
};

/// Append-only audit log
pub const ADMIN_EVENTS: TableDef = TableDef {
    name: "admin_events",
    columns: r#"    "id" SERIAL PRIMARY KEY,
    "event_type" VARCHAR(100) NOT NULL,
    "username" VARCHAR(255) NOT NULL,
    "details" TEXT,
    "timestamp" TIMESTAMP(3) NOT NULL DEFAULT CURRENT_TIMESTAMP"#,
};

/// All tables in creation order. `users` precedes every table referencing it.
pub const ALL_TABLES: [TableDef; 6] = [
    DASHBOARD_SETTINGS,
    USERS,
    COMMUNITY_BOOKMARKS,
    DASHBOARD_ANNOUNCEMENTS,
    USER_INVITATIONS,
    ADMIN_EVENTS,
];

/// Tables rebuilt from scratch by the fallback migration
pub const RESET_TABLES: [TableDef; 1] = [DASHBOARD_SETTINGS];

/// Tables created only when missing
pub const ENSURED_TABLES: [TableDef; 5] = [
    USERS,
    COMMUNITY_BOOKMARKS,
    DASHBOARD_ANNOUNCEMENTS,
    USER_INVITATIONS,
    ADMIN_EVENTS,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Drop and recreate. Discards every row of the table.
    Reset,
    /// Create when missing, existing rows untouched.
    Ensure,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reset => f.write_str("reset"),
            Self::Ensure => f.write_str("ensure"),
        }
    }
}

/// One table's statements. Each entry is a single SQL statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub table: &'static str,
    pub kind: StepKind,
    pub statements: Vec<String>,
}

impl Step {
    pub fn reset(table: &TableDef) -> Self {
        Self {
            table: table.name,
            kind: StepKind::Reset,
            statements: vec![table.drop_sql(), table.create_sql()],
        }
    }

    pub fn ensure(table: &TableDef) -> Self {
        Self {
            table: table.name,
            kind: StepKind::Ensure,
            statements: vec![table.create_if_missing_sql()],
        }
    }
}

/// Ordered list of schema steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationPlan {
    steps: Vec<Step>,
}

impl MigrationPlan {
    /// The emergency fallback: reset the settings table, then create any
    /// missing table among the other five.
    pub fn force() -> Self {
        let steps = RESET_TABLES
            .iter()
            .map(Step::reset)
            .chain(ENSURED_TABLES.iter().map(Step::ensure))
            .collect();
        Self { steps }
    }

    /// Create missing tables only. Never destroys data.
    pub fn ensure_missing() -> Self {
        Self {
            steps: ENSURED_TABLES.iter().map(Step::ensure).collect(),
        }
    }

    /// Rebuild the settings table only
    pub fn reset_settings() -> Self {
        Self {
            steps: RESET_TABLES.iter().map(Step::reset).collect(),
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Table names in execution order
    pub fn tables(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.table).collect()
    }

    pub fn is_destructive(&self) -> bool {
        self.steps.iter().any(|s| s.kind == StepKind::Reset)
    }

    /// Render the plan as a SQL script, e.g. for manual review in psql.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        for step in &self.steps {
            out.push_str(&format!("-- {} {}\n", step.kind, step.table));
            for statement in &step.statements {
                out.push_str(statement);
                out.push_str(";\n");
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn force_plan_order() {
        let plan = MigrationPlan::force();
        assert_eq!(
            plan.tables(),
            vec![
                "dashboard_settings",
                "users",
                "community_bookmarks",
                "dashboard_announcements",
                "user_invitations",
                "admin_events",
            ]
        );
    }

    #[test]
    fn only_first_force_step_is_destructive() {
        let plan = MigrationPlan::force();
        assert_eq!(plan.steps()[0].kind, StepKind::Reset);
        assert!(plan.steps()[1..].iter().all(|s| s.kind == StepKind::Ensure));
        assert!(plan.is_destructive());
    }

    #[test]
    fn ensure_plan_never_drops() {
        let plan = MigrationPlan::ensure_missing();
        assert!(!plan.is_destructive());
        assert_eq!(plan.steps().len(), 5);
        for step in plan.steps() {
            for statement in &step.statements {
                assert!(statement.starts_with("CREATE TABLE IF NOT EXISTS"));
                assert!(!statement.contains("DROP"));
            }
        }
    }

    #[test]
    fn reset_step_drops_then_creates() {
        let plan = MigrationPlan::reset_settings();
        let step = &plan.steps()[0];
        assert_eq!(step.table, "dashboard_settings");
        assert_eq!(step.statements[0], "DROP TABLE IF EXISTS \"dashboard_settings\"");
        assert!(step.statements[1].starts_with("CREATE TABLE \"dashboard_settings\" ("));
    }

    #[test]
    fn statements_are_single() {
        // sqlx prepares each statement, so none may carry a second one
        for step in MigrationPlan::force().steps() {
            for statement in &step.statements {
                assert!(!statement.contains(';'), "{}", statement);
            }
        }
    }

    #[test]
    fn bookmarks_cascade_on_user_delete() {
        let sql = COMMUNITY_BOOKMARKS.create_if_missing_sql();
        assert!(sql.contains(r#"REFERENCES "users"("id") ON DELETE CASCADE"#));

        // announcements and invitations keep plain references
        assert!(!DASHBOARD_ANNOUNCEMENTS.columns.contains("CASCADE"));
        assert!(!USER_INVITATIONS.columns.contains("CASCADE"));
    }

    #[test]
    fn users_created_before_referencing_tables() {
        let names: Vec<_> = ALL_TABLES.iter().map(|t| t.name).collect();
        let users = names.iter().position(|n| *n == "users").unwrap();
        for table in ALL_TABLES.iter().filter(|t| t.columns.contains(r#"REFERENCES "users""#)) {
            let pos = names.iter().position(|n| *n == table.name).unwrap();
            assert!(pos > users, "{} created before users", table.name);
        }
    }

    #[test]
    fn script_terminates_each_statement() {
        let script = MigrationPlan::force().to_sql();
        assert_eq!(script.matches(";\n").count(), 7);
        assert!(script.starts_with("-- reset dashboard_settings\n"));
        assert!(script.contains("-- ensure admin_events\n"));
    }
}
