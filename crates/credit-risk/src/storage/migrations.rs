use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use super::schema::{CREATE_TABLES, SCHEMA_VERSION};
use crate::catalog::{default_questionnaire, split_display_name};

/// Brings the database up to [`SCHEMA_VERSION`].
pub(super) fn run_migrations(conn: &mut Connection) -> rusqlite::Result<()> {
    let current_version = current_version(conn)?;

    if current_version == 0 {
        info!(version = SCHEMA_VERSION, "creating credit risk schema");
        initial_setup(conn)?;
    } else if current_version < SCHEMA_VERSION {
        // Only one schema version exists so far; future steps go here.
        info!(
            from = current_version,
            to = SCHEMA_VERSION,
            "migrating credit risk schema"
        );
    } else {
        info!(version = current_version, "schema up to date");
    }

    Ok(())
}

fn current_version(conn: &Connection) -> rusqlite::Result<i32> {
    let table_exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_migrations')",
        [],
        |row| row.get(0),
    )?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> = conn
        .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get(0)
        })
        .optional()?
        .flatten();

    Ok(version.unwrap_or(0))
}

fn initial_setup(conn: &mut Connection) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(CREATE_TABLES)?;
    seed_questionnaire(&tx)?;
    tx.execute(
        "INSERT INTO schema_migrations (version) VALUES (?1)",
        [SCHEMA_VERSION],
    )?;
    tx.commit()
}

fn seed_questionnaire(conn: &Connection) -> rusqlite::Result<()> {
    let existing: i64 = conn.query_row("SELECT COUNT(*) FROM catalog_groups", [], |row| {
        row.get(0)
    })?;
    if existing > 0 {
        return Ok(());
    }

    let mut insert_group =
        conn.prepare("INSERT INTO catalog_groups (name, weight_b) VALUES (?1, ?2)")?;
    let mut insert_item = conn.prepare(
        "INSERT INTO catalog_items (group_id, display_name, category, option_label, weight_d, weight_f)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;

    let mut items = 0usize;
    for group in default_questionnaire() {
        let group_id = insert_group.insert(params![group.name, group.weight_b])?;
        for item in group.items {
            let (category, option) = split_display_name(item.display_name);
            insert_item.execute(params![
                group_id,
                item.display_name,
                category,
                option,
                item.weight_d,
                item.weight_f
            ])?;
            items += 1;
        }
    }

    info!(
        groups = default_questionnaire().len(),
        items, "seeded default questionnaire"
    );
    Ok(())
}
