//! Mission/target repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist missions together with their owned targets.
//! - Own the lifecycle rules that must be checked and applied atomically:
//!   assignment conflicts, delete guards, notes freezing and completion
//!   propagation.
//!
//! # Invariants
//! - Every write path runs in one `IMMEDIATE` transaction; checks precede
//!   writes and a failed check rolls back by dropping the transaction.
//! - Deleting a mission deletes its targets in the same transaction.
//! - At most one uncompleted mission references a cat (also backed by the
//!   `uniq_missions_active_cat` partial index).
//! - Completion propagates target -> mission only, and only on update.

use crate::model::cat::CatId;
use crate::model::mission::{Mission, MissionId, NewMission, Target, TargetId, TargetUpdate};
use crate::repo::cat_repo::cat_exists;
use crate::repo::{bool_to_int, ensure_connection_ready, parse_bool, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

const MISSION_SELECT_SQL: &str = "SELECT
    id,
    cat_id,
    complete
FROM missions";

const TARGET_SELECT_SQL: &str = "SELECT
    id,
    mission_id,
    name,
    country,
    notes,
    complete
FROM targets";

/// Result of a committed target update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetUpdateOutcome {
    pub target_id: TargetId,
    /// Owning mission of the updated target.
    pub mission_id: MissionId,
    /// `true` when this update flipped the mission to complete.
    pub mission_completed: bool,
}

/// Repository interface for mission/target operations.
pub trait MissionRepository {
    /// Inserts one mission and all its targets; returns the mission id.
    fn create_mission(&mut self, mission: &NewMission) -> RepoResult<MissionId>;
    fn get_mission(&self, id: MissionId) -> RepoResult<Option<Mission>>;
    fn list_missions(&self) -> RepoResult<Vec<Mission>>;
    /// Deletes an unassigned mission and its targets.
    fn delete_mission(&mut self, id: MissionId) -> RepoResult<()>;
    /// Points `mission_id` at `cat_id` unless the cat is busy elsewhere.
    fn assign_cat(&mut self, mission_id: MissionId, cat_id: CatId) -> RepoResult<()>;
    fn get_target(&self, id: TargetId) -> RepoResult<Option<Target>>;
    /// Applies a partial target update and runs completion propagation.
    fn update_target(
        &mut self,
        id: TargetId,
        update: &TargetUpdate,
    ) -> RepoResult<TargetUpdateOutcome>;
}

/// SQLite-backed mission repository.
pub struct SqliteMissionRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteMissionRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl MissionRepository for SqliteMissionRepository<'_> {
    fn create_mission(&mut self, mission: &NewMission) -> RepoResult<MissionId> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if let Some(cat_id) = mission.cat_id {
            if !cat_exists(&tx, cat_id)? {
                return Err(RepoError::CatNotFound(cat_id));
            }
        }
        mission.validate()?;
        if let Some(cat_id) = mission.cat_id {
            if let Some(active_mission_id) = active_mission_for_cat(&tx, cat_id)? {
                return Err(RepoError::CatAlreadyAssigned {
                    cat_id,
                    active_mission_id,
                });
            }
        }

        tx.execute(
            "INSERT INTO missions (cat_id, complete) VALUES (?1, 0);",
            params![mission.cat_id],
        )?;
        let mission_id = tx.last_insert_rowid();

        for target in &mission.targets {
            tx.execute(
                "INSERT INTO targets (mission_id, name, country, notes, complete)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    mission_id,
                    target.name.as_str(),
                    target.country.as_str(),
                    target.notes.as_str(),
                    bool_to_int(target.complete),
                ],
            )?;
        }

        tx.commit()?;
        Ok(mission_id)
    }

    fn get_mission(&self, id: MissionId) -> RepoResult<Option<Mission>> {
        let row = self
            .conn
            .query_row(
                &format!("{MISSION_SELECT_SQL} WHERE id = ?1;"),
                [id],
                read_mission_columns,
            )
            .optional()?;

        match row {
            Some(columns) => Ok(Some(build_mission(self.conn, columns)?)),
            None => Ok(None),
        }
    }

    fn list_missions(&self) -> RepoResult<Vec<Mission>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MISSION_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut missions = Vec::new();
        while let Some(row) = rows.next()? {
            let columns = read_mission_columns(row)?;
            missions.push(build_mission(self.conn, columns)?);
        }
        Ok(missions)
    }

    fn delete_mission(&mut self, id: MissionId) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let cat_id = tx
            .query_row("SELECT cat_id FROM missions WHERE id = ?1;", [id], |row| {
                row.get::<_, Option<CatId>>(0)
            })
            .optional()?
            .ok_or(RepoError::MissionNotFound(id))?;

        if let Some(cat_id) = cat_id {
            return Err(RepoError::MissionAssigned {
                mission_id: id,
                cat_id,
            });
        }

        tx.execute("DELETE FROM targets WHERE mission_id = ?1;", [id])?;
        tx.execute("DELETE FROM missions WHERE id = ?1;", [id])?;
        tx.commit()?;
        Ok(())
    }

    fn assign_cat(&mut self, mission_id: MissionId, cat_id: CatId) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !mission_exists(&tx, mission_id)? {
            return Err(RepoError::MissionNotFound(mission_id));
        }
        if !cat_exists(&tx, cat_id)? {
            return Err(RepoError::CatNotFound(cat_id));
        }
        if let Some(active_mission_id) = active_mission_for_cat(&tx, cat_id)? {
            if active_mission_id != mission_id {
                return Err(RepoError::CatAlreadyAssigned {
                    cat_id,
                    active_mission_id,
                });
            }
        }

        tx.execute(
            "UPDATE missions SET cat_id = ?1 WHERE id = ?2;",
            params![cat_id, mission_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn get_target(&self, id: TargetId) -> RepoResult<Option<Target>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TARGET_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_target_row(row)?));
        }
        Ok(None)
    }

    fn update_target(
        &mut self,
        id: TargetId,
        update: &TargetUpdate,
    ) -> RepoResult<TargetUpdateOutcome> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let (mission_id, complete_raw) = tx
            .query_row(
                "SELECT mission_id, complete FROM targets WHERE id = ?1;",
                [id],
                |row| Ok((row.get::<_, MissionId>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?
            .ok_or(RepoError::TargetNotFound(id))?;
        let was_complete = parse_bool(complete_raw, "targets.complete")?;

        // Checked against the state before this update, so notes and
        // completion may be set together on an open target.
        if update.notes.is_some() && was_complete {
            return Err(RepoError::TargetFrozen(id));
        }

        if let Some(notes) = update.notes.as_deref() {
            tx.execute(
                "UPDATE targets SET notes = ?1 WHERE id = ?2;",
                params![notes, id],
            )?;
        }

        let mut mission_completed = false;
        if let Some(complete) = update.complete {
            tx.execute(
                "UPDATE targets SET complete = ?1 WHERE id = ?2;",
                params![bool_to_int(complete), id],
            )?;

            // One-directional: reopening a target leaves the mission as is.
            if complete {
                let open_targets: i64 = tx.query_row(
                    "SELECT COUNT(*) FROM targets WHERE mission_id = ?1 AND complete = 0;",
                    [mission_id],
                    |row| row.get(0),
                )?;
                if open_targets == 0 {
                    let changed = tx.execute(
                        "UPDATE missions SET complete = 1 WHERE id = ?1 AND complete = 0;",
                        [mission_id],
                    )?;
                    mission_completed = changed > 0;
                }
            }
        }

        tx.commit()?;
        Ok(TargetUpdateOutcome {
            target_id: id,
            mission_id,
            mission_completed,
        })
    }
}

/// Raw `missions` columns before targets are attached.
struct MissionColumns {
    id: MissionId,
    cat_id: Option<CatId>,
    complete: i64,
}

fn read_mission_columns(row: &Row<'_>) -> rusqlite::Result<MissionColumns> {
    Ok(MissionColumns {
        id: row.get("id")?,
        cat_id: row.get("cat_id")?,
        complete: row.get("complete")?,
    })
}

fn build_mission(conn: &Connection, columns: MissionColumns) -> RepoResult<Mission> {
    let targets = load_targets_for_mission(conn, columns.id)?;
    if targets.is_empty() {
        return Err(RepoError::InvalidData(format!(
            "mission {} has no targets",
            columns.id
        )));
    }
    Ok(Mission {
        id: columns.id,
        cat_id: columns.cat_id,
        complete: parse_bool(columns.complete, "missions.complete")?,
        targets,
    })
}

fn load_targets_for_mission(conn: &Connection, mission_id: MissionId) -> RepoResult<Vec<Target>> {
    let mut stmt = conn.prepare(&format!(
        "{TARGET_SELECT_SQL} WHERE mission_id = ?1 ORDER BY id ASC;"
    ))?;
    let mut rows = stmt.query([mission_id])?;
    let mut targets = Vec::new();
    while let Some(row) = rows.next()? {
        targets.push(parse_target_row(row)?);
    }
    Ok(targets)
}

fn parse_target_row(row: &Row<'_>) -> RepoResult<Target> {
    Ok(Target {
        id: row.get("id")?,
        mission_id: row.get("mission_id")?,
        name: row.get("name")?,
        country: row.get("country")?,
        notes: row.get("notes")?,
        complete: parse_bool(row.get("complete")?, "targets.complete")?,
    })
}

fn mission_exists(conn: &Connection, id: MissionId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM missions WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn active_mission_for_cat(conn: &Connection, cat_id: CatId) -> RepoResult<Option<MissionId>> {
    let mission_id = conn
        .query_row(
            "SELECT id FROM missions
             WHERE cat_id = ?1 AND complete = 0
             ORDER BY id ASC
             LIMIT 1;",
            [cat_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(mission_id)
}
