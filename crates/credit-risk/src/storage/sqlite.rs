use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::migrations::run_migrations;
use crate::accounts::{Admin, AdminId};
use crate::applications::{Application, ApplicationFields, ApplicationId, Gender};
use crate::catalog::{Group, GroupId, GroupWithItems, Item, ItemId};
use crate::repository::{
    AdminRepository, AnswerDetail, ApplicationRepository, CatalogRepository, RepositoryError,
    Score, ScoreId, ScoreRepository, ScoreUpsert,
};
use crate::scoring::RiskStatus;

const APPLICATION_COLUMNS: &str = "id, application_number, name, birth_date, birth_place, \
     gender, address, postal_code, owner_id, created_at, updated_at";

const SCORE_COLUMNS: &str =
    "s.id, s.application_id, s.total_score, s.status, s.created_at, s.updated_at";

const ITEM_COLUMNS: &str =
    "i.id, i.group_id, i.display_name, i.category, i.option_label, i.weight_d, i.weight_f";

/// SQLite-backed store. A single connection serializes statements; transactions make
/// multi-statement writes atomic.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) a database file and applies pending migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|err| RepositoryError::Unavailable(err.to_string()))?;
        }

        let conn = Connection::open(path)?;
        conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;
        conn.execute_batch("PRAGMA synchronous = NORMAL; PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Self::from_connection(conn)
    }

    /// In-memory database, used by tests and the demo command.
    pub fn open_in_memory() -> Result<Self, RepositoryError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::from_connection(conn)
    }

    fn from_connection(mut conn: Connection) -> Result<Self, RepositoryError> {
        run_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, RepositoryError> {
        self.conn
            .lock()
            .map_err(|_| RepositoryError::Unavailable("connection lock poisoned".to_string()))
    }

    fn row_to_admin(row: &Row<'_>) -> rusqlite::Result<Admin> {
        Ok(Admin {
            id: AdminId(row.get(0)?),
            email: row.get(1)?,
            password_hash: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    fn row_to_application(row: &Row<'_>) -> rusqlite::Result<Application> {
        let gender: String = row.get(5)?;
        let gender = Gender::parse(&gender).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(5, Type::Text, "unknown gender".into())
        })?;
        let birth_date: NaiveDate = row.get(3)?;

        Ok(Application {
            id: ApplicationId(row.get(0)?),
            application_number: row.get(1)?,
            name: row.get(2)?,
            birth_date,
            birth_place: row.get(4)?,
            gender,
            address: row.get(6)?,
            postal_code: row.get(7)?,
            owner_id: AdminId(row.get(8)?),
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    fn row_to_score(row: &Row<'_>) -> rusqlite::Result<Score> {
        let status: String = row.get(3)?;
        let status = RiskStatus::from_label(&status).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(3, Type::Text, "unknown risk status".into())
        })?;

        Ok(Score {
            id: ScoreId(row.get(0)?),
            application_id: ApplicationId(row.get(1)?),
            total_score: row.get(2)?,
            status,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    /// Reads an item from `offset` onwards in [`ITEM_COLUMNS`] order.
    fn row_to_item(row: &Row<'_>, offset: usize) -> rusqlite::Result<Item> {
        Ok(Item {
            id: ItemId(row.get(offset)?),
            group_id: GroupId(row.get(offset + 1)?),
            display_name: row.get(offset + 2)?,
            category: row.get(offset + 3)?,
            option: row.get(offset + 4)?,
            weight_d: row.get(offset + 5)?,
            weight_f: row.get(offset + 6)?,
        })
    }

    fn row_to_group(row: &Row<'_>, offset: usize) -> rusqlite::Result<Group> {
        Ok(Group {
            id: GroupId(row.get(offset)?),
            name: row.get(offset + 1)?,
            weight_b: row.get(offset + 2)?,
        })
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn conflict_or_unavailable(err: rusqlite::Error, message: &str) -> RepositoryError {
    if is_unique_violation(&err) {
        RepositoryError::Conflict(message.to_string())
    } else {
        RepositoryError::from(err)
    }
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(value: rusqlite::Error) -> Self {
        RepositoryError::Unavailable(value.to_string())
    }
}

fn fetch_application(
    conn: &Connection,
    id: ApplicationId,
) -> Result<Option<Application>, RepositoryError> {
    let sql = format!("SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = ?1");
    Ok(conn
        .query_row(&sql, [id.0], SqliteStore::row_to_application)
        .optional()?)
}

fn fetch_score(
    conn: &Connection,
    application: ApplicationId,
) -> Result<Option<Score>, RepositoryError> {
    let sql = format!("SELECT {SCORE_COLUMNS} FROM scores s WHERE s.application_id = ?1");
    Ok(conn
        .query_row(&sql, [application.0], SqliteStore::row_to_score)
        .optional()?)
}

fn replace_answers_in(
    conn: &Connection,
    application: ApplicationId,
    items: &[ItemId],
    now: DateTime<Utc>,
) -> Result<(), RepositoryError> {
    conn.execute(
        "DELETE FROM answers WHERE application_id = ?1",
        [application.0],
    )?;
    let mut insert = conn.prepare(
        "INSERT INTO answers (application_id, item_id, created_at) VALUES (?1, ?2, ?3)",
    )?;
    for item in items {
        insert.execute(params![application.0, item.0, now])?;
    }
    Ok(())
}

fn upsert_score_in(
    conn: &Connection,
    application: ApplicationId,
    total_score: f64,
    status: RiskStatus,
    now: DateTime<Utc>,
) -> Result<ScoreUpsert, RepositoryError> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM scores WHERE application_id = ?1",
            [application.0],
            |row| row.get(0),
        )
        .optional()?;

    let created = match existing {
        Some(id) => {
            conn.execute(
                "UPDATE scores SET total_score = ?1, status = ?2, updated_at = ?3 WHERE id = ?4",
                params![total_score, status.label(), now, id],
            )?;
            false
        }
        None => {
            conn.execute(
                "INSERT INTO scores (application_id, total_score, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![application.0, total_score, status.label(), now],
            )?;
            true
        }
    };

    let score = fetch_score(conn, application)?.ok_or(RepositoryError::NotFound)?;
    Ok(ScoreUpsert { score, created })
}

impl AdminRepository for SqliteStore {
    fn insert_admin(&self, email: &str, password_hash: &str) -> Result<Admin, RepositoryError> {
        let conn = self.lock()?;
        let created_at = Utc::now();
        conn.execute(
            "INSERT INTO admins (email, password_hash, created_at) VALUES (?1, ?2, ?3)",
            params![email, password_hash, created_at],
        )
        .map_err(|err| conflict_or_unavailable(err, "Email is already registered"))?;

        Ok(Admin {
            id: AdminId(conn.last_insert_rowid()),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at,
        })
    }

    fn admin_by_email(&self, email: &str) -> Result<Option<Admin>, RepositoryError> {
        let conn = self.lock()?;
        Ok(conn
            .query_row(
                "SELECT id, email, password_hash, created_at FROM admins WHERE email = ?1",
                [email],
                Self::row_to_admin,
            )
            .optional()?)
    }

    fn admin(&self, id: AdminId) -> Result<Option<Admin>, RepositoryError> {
        let conn = self.lock()?;
        Ok(conn
            .query_row(
                "SELECT id, email, password_hash, created_at FROM admins WHERE id = ?1",
                [id.0],
                Self::row_to_admin,
            )
            .optional()?)
    }
}

impl ApplicationRepository for SqliteStore {
    fn insert_application(
        &self,
        owner: AdminId,
        fields: &ApplicationFields,
    ) -> Result<Application, RepositoryError> {
        let conn = self.lock()?;
        let now = Utc::now();
        conn.execute(
            "INSERT INTO applications (application_number, name, birth_date, birth_place, gender,
                                       address, postal_code, owner_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
            params![
                fields.application_number,
                fields.name,
                fields.birth_date,
                fields.birth_place,
                fields.gender.label(),
                fields.address,
                fields.postal_code,
                owner.0,
                now
            ],
        )
        .map_err(|err| conflict_or_unavailable(err, "Application number is already registered"))?;

        let id = ApplicationId(conn.last_insert_rowid());
        fetch_application(&conn, id)?.ok_or(RepositoryError::NotFound)
    }

    fn update_application(
        &self,
        id: ApplicationId,
        fields: &ApplicationFields,
    ) -> Result<Application, RepositoryError> {
        let conn = self.lock()?;
        let updated = conn
            .execute(
                "UPDATE applications
                 SET application_number = ?1, name = ?2, birth_date = ?3, birth_place = ?4,
                     gender = ?5, address = ?6, postal_code = ?7, updated_at = ?8
                 WHERE id = ?9",
                params![
                    fields.application_number,
                    fields.name,
                    fields.birth_date,
                    fields.birth_place,
                    fields.gender.label(),
                    fields.address,
                    fields.postal_code,
                    Utc::now(),
                    id.0
                ],
            )
            .map_err(|err| {
                conflict_or_unavailable(err, "Application number is already registered")
            })?;

        if updated == 0 {
            return Err(RepositoryError::NotFound);
        }
        fetch_application(&conn, id)?.ok_or(RepositoryError::NotFound)
    }

    fn delete_application(&self, id: ApplicationId) -> Result<(), RepositoryError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM answers WHERE application_id = ?1", [id.0])?;
        tx.execute("DELETE FROM scores WHERE application_id = ?1", [id.0])?;
        let deleted = tx.execute("DELETE FROM applications WHERE id = ?1", [id.0])?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        tx.commit()?;
        Ok(())
    }

    fn application(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let conn = self.lock()?;
        fetch_application(&conn, id)
    }

    fn applications_for(&self, owner: AdminId) -> Result<Vec<Application>, RepositoryError> {
        let conn = self.lock()?;
        let sql =
            format!("SELECT {APPLICATION_COLUMNS} FROM applications WHERE owner_id = ?1 ORDER BY id");
        let mut stmt = conn.prepare(&sql)?;
        let applications = stmt
            .query_map([owner.0], Self::row_to_application)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(applications)
    }
}

impl CatalogRepository for SqliteStore {
    fn list_groups_with_items(&self) -> Result<Vec<GroupWithItems>, RepositoryError> {
        let conn = self.lock()?;

        let mut group_stmt =
            conn.prepare("SELECT id, name, weight_b FROM catalog_groups ORDER BY id")?;
        let mut groups = group_stmt
            .query_map([], |row| Self::row_to_group(row, 0))?
            .map(|group| {
                group.map(|group| GroupWithItems {
                    group,
                    items: Vec::new(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let sql = format!("SELECT {ITEM_COLUMNS} FROM catalog_items i ORDER BY i.group_id, i.id");
        let mut item_stmt = conn.prepare(&sql)?;
        let items = item_stmt
            .query_map([], |row| Self::row_to_item(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;

        for item in items {
            if let Some(entry) = groups
                .iter_mut()
                .find(|entry| entry.group.id == item.group_id)
            {
                entry.items.push(item);
            }
        }

        Ok(groups)
    }
}

impl ScoreRepository for SqliteStore {
    fn replace_answers(
        &self,
        application: ApplicationId,
        items: &[ItemId],
    ) -> Result<(), RepositoryError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        replace_answers_in(&tx, application, items, Utc::now())?;
        tx.commit()?;
        Ok(())
    }

    fn upsert_score(
        &self,
        application: ApplicationId,
        total_score: f64,
        status: RiskStatus,
    ) -> Result<ScoreUpsert, RepositoryError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let upsert = upsert_score_in(&tx, application, total_score, status, Utc::now())?;
        tx.commit()?;
        Ok(upsert)
    }

    fn record_submission(
        &self,
        application: ApplicationId,
        items: &[ItemId],
        total_score: f64,
        status: RiskStatus,
    ) -> Result<ScoreUpsert, RepositoryError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let now = Utc::now();
        replace_answers_in(&tx, application, items, now)?;
        let upsert = upsert_score_in(&tx, application, total_score, status, now)?;
        tx.commit()?;
        Ok(upsert)
    }

    fn score(&self, application: ApplicationId) -> Result<Option<Score>, RepositoryError> {
        let conn = self.lock()?;
        fetch_score(&conn, application)
    }

    fn scores_for(&self, owner: AdminId) -> Result<Vec<Score>, RepositoryError> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {SCORE_COLUMNS} FROM scores s
             JOIN applications a ON a.id = s.application_id
             WHERE a.owner_id = ?1
             ORDER BY s.application_id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let scores = stmt
            .query_map([owner.0], Self::row_to_score)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(scores)
    }

    fn answer_details(
        &self,
        application: ApplicationId,
    ) -> Result<Vec<AnswerDetail>, RepositoryError> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT a.id, a.application_id, a.item_id, {ITEM_COLUMNS}, g.id, g.name, g.weight_b
             FROM answers a
             JOIN catalog_items i ON i.id = a.item_id
             JOIN catalog_groups g ON g.id = i.group_id
             WHERE a.application_id = ?1
             ORDER BY a.id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let details = stmt
            .query_map([application.0], |row| {
                Ok(AnswerDetail {
                    id: row.get(0)?,
                    application_id: ApplicationId(row.get(1)?),
                    item_id: ItemId(row.get(2)?),
                    item: Self::row_to_item(row, 3)?,
                    group: Self::row_to_group(row, 10)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(details)
    }
}
