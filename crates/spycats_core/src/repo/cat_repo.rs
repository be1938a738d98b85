//! Cat repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `cats` table.
//!
//! # Invariants
//! - Identity is assigned by SQLite (`AUTOINCREMENT`), never by callers.
//! - Deleting a cat never touches `missions`; references become dangling.
//! - Listing is ordered by id, i.e. insertion order.

use crate::model::cat::{Cat, CatId, NewCat};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const CAT_SELECT_SQL: &str = "SELECT
    id,
    name,
    experience,
    breed,
    salary
FROM cats";

/// Repository interface for cat CRUD operations.
pub trait CatRepository {
    /// Inserts one cat and returns its assigned id.
    fn create_cat(&self, cat: &NewCat) -> RepoResult<CatId>;
    fn get_cat(&self, id: CatId) -> RepoResult<Option<Cat>>;
    fn list_cats(&self) -> RepoResult<Vec<Cat>>;
    /// Overwrites salary. Fails with `CatNotFound` when absent.
    fn update_salary(&self, id: CatId, salary: i64) -> RepoResult<()>;
    /// Removes one cat unconditionally. Fails with `CatNotFound` when absent.
    fn delete_cat(&self, id: CatId) -> RepoResult<()>;
}

/// SQLite-backed cat repository.
pub struct SqliteCatRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl CatRepository for SqliteCatRepository<'_> {
    fn create_cat(&self, cat: &NewCat) -> RepoResult<CatId> {
        self.conn.execute(
            "INSERT INTO cats (name, experience, breed, salary)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                cat.name.as_str(),
                cat.experience,
                cat.breed.as_str(),
                cat.salary,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_cat(&self, id: CatId) -> RepoResult<Option<Cat>> {
        let cat = self
            .conn
            .query_row(
                &format!("{CAT_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_cat_row,
            )
            .optional()?;
        Ok(cat)
    }

    fn list_cats(&self) -> RepoResult<Vec<Cat>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CAT_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut cats = Vec::new();
        while let Some(row) = rows.next()? {
            cats.push(parse_cat_row(row)?);
        }
        Ok(cats)
    }

    fn update_salary(&self, id: CatId, salary: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE cats SET salary = ?1 WHERE id = ?2;",
            params![salary, id],
        )?;

        if changed == 0 {
            return Err(RepoError::CatNotFound(id));
        }

        Ok(())
    }

    fn delete_cat(&self, id: CatId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM cats WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::CatNotFound(id));
        }

        Ok(())
    }
}

/// Returns whether a cat row exists. Usable on plain connections and
/// transactions alike.
pub(crate) fn cat_exists(conn: &Connection, id: CatId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM cats WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn parse_cat_row(row: &Row<'_>) -> rusqlite::Result<Cat> {
    Ok(Cat {
        id: row.get("id")?,
        name: row.get("name")?,
        experience: row.get("experience")?,
        breed: row.get("breed")?,
        salary: row.get("salary")?,
    })
}
