//! Per-test databases cloned from a migrated template.
//!
//! The template name embeds a hash of `migrations/`, so editing a migration
//! provisions a fresh template instead of reusing a stale one. Within one
//! test binary the template is resolved once and cached.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pg_embedded_setup_unpriv::test_support::hash_directory;
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use postgres::{Client, NoTls};
use uuid::Uuid;

use super::format_postgres_error;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");
const CLONE_ATTEMPTS: usize = 5;
const CLONE_BACKOFF: Duration = Duration::from_millis(500);

static TEMPLATE: Mutex<Option<String>> = Mutex::new(None);

fn template_name() -> Result<String, String> {
    let migrations = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let digest = hash_directory(migrations).map_err(|err| format!("hash migrations: {err}"))?;
    let short = digest.get(..8).unwrap_or(&digest);
    Ok(format!("blogstore_template_{short}"))
}

/// Resolve the template for the current migrations, creating and migrating
/// it when no earlier binary has.
fn migrated_template(cluster: &ClusterHandle) -> Result<String, String> {
    let mut cached = TEMPLATE.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(name) = cached.as_ref() {
        return Ok(name.clone());
    }

    let name = template_name()?;
    let exists = cluster
        .database_exists(name.as_str())
        .map_err(|err| format!("look up template {name}: {err:?}"))?;
    if !exists {
        cluster
            .create_database(name.as_str())
            .map_err(|err| format!("create template {name}: {err:?}"))?;
        migrate_schema(&cluster.connection().database_url(&name))?;
    }

    *cached = Some(name.clone());
    Ok(name)
}

fn migrate_schema(url: &str) -> Result<(), String> {
    let mut conn = PgConnection::establish(url).map_err(|err| format!("connect: {err}"))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| format!("migrate: {err}"))?;
    Ok(())
}

/// Clone a fresh, uniquely named database from the template.
///
/// Cloning fails while another session is connected to the template, so
/// each failure backs off and retries. The database is dropped with the
/// returned guard.
pub fn provision_template_database(cluster: &ClusterHandle) -> Result<TemporaryDatabase, String> {
    let mut failures = Vec::new();
    for attempt in 1..=CLONE_ATTEMPTS {
        let cloned = migrated_template(cluster).and_then(|template| {
            let name = format!("test_{}", Uuid::new_v4().simple());
            cluster
                .temporary_database_from_template(name.as_str(), template.as_str())
                .map_err(|err| format!("clone {template}: {err:?}"))
        });
        match cloned {
            Ok(database) => return Ok(database),
            Err(error) => failures.push(format!("attempt {attempt}: {error}")),
        }
        if attempt < CLONE_ATTEMPTS {
            std::thread::sleep(CLONE_BACKOFF);
        }
    }
    Err(failures.join("; "))
}

/// Drop `table_name` and its dependents.
pub fn drop_table(url: &str, table_name: &str) -> Result<(), String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    let quoted = table_name.replace('"', "\"\"");
    client
        .batch_execute(&format!(r#"DROP TABLE IF EXISTS "{quoted}" CASCADE"#))
        .map_err(|err| format_postgres_error(&err))
}
