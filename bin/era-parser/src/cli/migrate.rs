use clap::Subcommand;

#[derive(Debug, Clone, Subcommand)]
pub enum MigrateAction {
    /// Show which migrations are applied and which are pending.
    Status,
    /// Apply pending migrations, optionally stopping after `version`.
    Run { version: Option<String> },
    /// List every known migration in version order.
    List,
}
