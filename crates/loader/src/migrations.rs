use std::{
    collections::HashSet,
    hash::{DefaultHasher, Hash, Hasher},
};

use chrono::Utc;
use era_state::{MigrationRow, StateStore};
use tracing::info;

use crate::{client::StoreClient, error::LoaderError};

struct Migration {
    version: &'static str,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "0001",
        name: "initial_schema",
        sql: include_str!("../migrations/0001_initial_schema.sql"),
    },
    Migration {
        version: "0002",
        name: "add_deneb_electra_tables",
        sql: include_str!("../migrations/0002_add_deneb_electra_tables.sql"),
    },
];

fn checksum(sql: &str) -> String {
    let mut hasher = DefaultHasher::new();
    sql.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// Applies every migration in `MIGRATIONS` not yet recorded in the state
/// store's `schema_migrations` log, in lexicographic version order.
/// A failing statement aborts the whole chain; migrations already applied
/// are never re-run.
pub async fn run_migrations(client: &mut StoreClient, state: &StateStore, database: &str) -> Result<(), LoaderError> {
    let applied: HashSet<String> = state
        .applied_migrations()?
        .into_iter()
        .map(|row| row.version)
        .collect();

    let mut pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| !applied.contains(m.version)).collect();
    pending.sort_by_key(|m| m.version);

    for migration in pending {
        info!(version = migration.version, name = migration.name, "applying migration");
        let rendered = migration.sql.replace("{database}", database);
        for statement in rendered.split(';') {
            let statement = statement.trim();
            if statement.is_empty() {
                continue;
            }
            client.execute_ddl(statement).await.map_err(|err| LoaderError::MigrationFailed {
                version: migration.version.to_string(),
                reason: err.to_string(),
            })?;
        }

        state.record_migration(&MigrationRow {
            version: migration.version.to_string(),
            name: migration.name.to_string(),
            applied_at: Utc::now(),
            checksum: checksum(migration.sql),
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_registered_in_version_order() {
        let versions: Vec<_> = MIGRATIONS.iter().map(|m| m.version).collect();
        let mut sorted = versions.clone();
        sorted.sort();
        assert_eq!(versions, sorted);
    }

    #[test]
    fn checksum_is_stable_for_the_same_sql() {
        assert_eq!(checksum("SELECT 1"), checksum("SELECT 1"));
        assert_ne!(checksum("SELECT 1"), checksum("SELECT 2"));
    }

    #[test]
    fn database_placeholder_is_substituted_in_every_statement() {
        let rendered = MIGRATIONS[0].sql.replace("{database}", "beacon_chain");
        assert!(!rendered.contains("{database}"));
        assert!(rendered.contains("beacon_chain.blocks"));
    }
}
