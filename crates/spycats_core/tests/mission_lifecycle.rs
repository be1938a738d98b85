use rusqlite::Connection;
use spycats_core::db::open_db_in_memory;
use spycats_core::{
    BreedValidator, CatId, CatRepository, CatService, MissionRepository, MissionService,
    MissionServiceError, NewCat, NewMission, NewTarget, SqliteCatRepository,
    SqliteMissionRepository, TargetUpdate,
};

fn seed_cat(conn: &Connection, name: &str) -> CatId {
    let repo = SqliteCatRepository::try_new(conn).unwrap();
    repo.create_cat(&NewCat::new(name, 3, "Siamese", 1500))
        .unwrap()
}

fn targets(count: usize) -> Vec<NewTarget> {
    (1..=count)
        .map(|idx| NewTarget::new(format!("T{idx}"), "FR"))
        .collect()
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn create_mission_persists_targets_and_starts_incomplete() {
    let mut conn = open_db_in_memory().unwrap();
    let cat_id = seed_cat(&conn, "Tom");
    let mut service = MissionService::new(SqliteMissionRepository::try_new(&mut conn).unwrap());

    let mission = service
        .create_mission(&NewMission::assigned(
            cat_id,
            vec![
                NewTarget::new("T1", "FR").with_notes("watch the bakery"),
                NewTarget::new("T2", "UA"),
            ],
        ))
        .unwrap();

    assert_eq!(mission.cat_id, Some(cat_id));
    assert!(!mission.complete);
    assert_eq!(mission.targets.len(), 2);
    assert_eq!(mission.targets[0].notes, "watch the bakery");
    assert_eq!(mission.targets[1].notes, "");
    assert!(mission.targets.iter().all(|t| t.mission_id == mission.id));
    assert_eq!(service.get_mission(mission.id).unwrap(), mission);
}

#[test]
fn create_mission_enforces_target_count_bounds() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut service =
            MissionService::new(SqliteMissionRepository::try_new(&mut conn).unwrap());

        for count in [0, 4] {
            let err = service
                .create_mission(&NewMission::unassigned(targets(count)))
                .unwrap_err();
            assert!(matches!(
                err,
                MissionServiceError::InvalidTargetCount { count: got } if got == count
            ));
            assert_eq!(err.code(), "invalid_target_count");
        }
        for count in 1..=3 {
            let mission = service
                .create_mission(&NewMission::unassigned(targets(count)))
                .unwrap();
            assert_eq!(mission.targets.len(), count);
        }
    }
    assert_eq!(count_rows(&conn, "missions"), 3);
    assert_eq!(count_rows(&conn, "targets"), 6);
}

#[test]
fn create_mission_with_unknown_cat_is_not_found_before_count_check() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = MissionService::new(SqliteMissionRepository::try_new(&mut conn).unwrap());

    let err = service
        .create_mission(&NewMission::assigned(99, Vec::new()))
        .unwrap_err();
    assert!(matches!(err, MissionServiceError::CatNotFound(99)));
    assert!(service.list_missions().unwrap().is_empty());
}

#[test]
fn create_mission_rejects_cat_with_active_mission() {
    let mut conn = open_db_in_memory().unwrap();
    let cat_id = seed_cat(&conn, "Tom");
    let mut service = MissionService::new(SqliteMissionRepository::try_new(&mut conn).unwrap());

    let active = service
        .create_mission(&NewMission::assigned(cat_id, targets(1)))
        .unwrap();
    let err = service
        .create_mission(&NewMission::assigned(cat_id, targets(1)))
        .unwrap_err();
    assert!(matches!(
        err,
        MissionServiceError::CatAlreadyAssigned { cat_id: c, active_mission_id: m }
            if c == cat_id && m == active.id
    ));
    assert_eq!(service.list_missions().unwrap().len(), 1);
}

#[test]
fn pre_completed_targets_do_not_complete_mission_until_an_update() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = MissionService::new(SqliteMissionRepository::try_new(&mut conn).unwrap());

    let mission = service
        .create_mission(&NewMission::unassigned(vec![
            NewTarget::new("T1", "FR").completed(),
            NewTarget::new("T2", "DE").completed(),
        ]))
        .unwrap();
    assert!(mission.all_targets_complete());
    assert!(!mission.complete);

    service
        .update_target(mission.targets[0].id, &TargetUpdate::complete(true))
        .unwrap();
    assert!(service.get_mission(mission.id).unwrap().complete);
}

#[test]
fn completing_every_target_completes_mission_and_reopening_does_not_revert() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = MissionService::new(SqliteMissionRepository::try_new(&mut conn).unwrap());
    let mission = service
        .create_mission(&NewMission::unassigned(targets(3)))
        .unwrap();
    let ids: Vec<_> = mission.targets.iter().map(|t| t.id).collect();

    service
        .update_target(ids[0], &TargetUpdate::complete(true))
        .unwrap();
    service
        .update_target(ids[1], &TargetUpdate::complete(true))
        .unwrap();
    assert!(!service.get_mission(mission.id).unwrap().complete);

    let last = service
        .update_target(ids[2], &TargetUpdate::complete(true))
        .unwrap();
    assert!(last.complete);
    assert!(service.get_mission(mission.id).unwrap().complete);

    let reopened = service
        .update_target(ids[1], &TargetUpdate::complete(false))
        .unwrap();
    assert!(!reopened.complete);
    assert!(service.get_mission(mission.id).unwrap().complete);
}

#[test]
fn notes_are_frozen_once_target_is_complete() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = MissionService::new(SqliteMissionRepository::try_new(&mut conn).unwrap());
    let mission = service
        .create_mission(&NewMission::unassigned(targets(2)))
        .unwrap();
    let target_id = mission.targets[0].id;

    let noted = service
        .update_target(target_id, &TargetUpdate::notes("seen at the harbour"))
        .unwrap();
    assert_eq!(noted.notes, "seen at the harbour");

    service
        .update_target(target_id, &TargetUpdate::complete(true))
        .unwrap();

    let err = service
        .update_target(target_id, &TargetUpdate::notes("late edit"))
        .unwrap_err();
    assert!(matches!(err, MissionServiceError::TargetFrozen(id) if id == target_id));
    assert_eq!(err.code(), "target_frozen");

    // The whole update is rejected, including the completion flag.
    let combined = TargetUpdate {
        notes: Some("late edit".to_string()),
        complete: Some(false),
    };
    service.update_target(target_id, &combined).unwrap_err();

    let stored = service.get_target(target_id).unwrap();
    assert_eq!(stored.notes, "seen at the harbour");
    assert!(stored.complete);
}

#[test]
fn notes_and_completion_may_be_set_together_on_open_target() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = MissionService::new(SqliteMissionRepository::try_new(&mut conn).unwrap());
    let mission = service
        .create_mission(&NewMission::unassigned(targets(1)))
        .unwrap();

    let update = TargetUpdate {
        notes: Some("final report".to_string()),
        complete: Some(true),
    };
    let target = service
        .update_target(mission.targets[0].id, &update)
        .unwrap();
    assert_eq!(target.notes, "final report");
    assert!(target.complete);
    assert!(service.get_mission(mission.id).unwrap().complete);
}

#[test]
fn empty_target_update_is_a_noop() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = MissionService::new(SqliteMissionRepository::try_new(&mut conn).unwrap());
    let mission = service
        .create_mission(&NewMission::unassigned(targets(1)))
        .unwrap();

    let target = service
        .update_target(mission.targets[0].id, &TargetUpdate::default())
        .unwrap();
    assert_eq!(target, mission.targets[0]);
}

#[test]
fn update_missing_target_is_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = MissionService::new(SqliteMissionRepository::try_new(&mut conn).unwrap());

    let err = service
        .update_target(12, &TargetUpdate::complete(true))
        .unwrap_err();
    assert!(matches!(err, MissionServiceError::TargetNotFound(12)));
    assert!(matches!(
        service.get_target(12).unwrap_err(),
        MissionServiceError::TargetNotFound(12)
    ));
}

#[test]
fn assign_cat_is_idempotent_and_rejects_busy_cat() {
    let mut conn = open_db_in_memory().unwrap();
    let cat_id = seed_cat(&conn, "Tom");
    let mut service = MissionService::new(SqliteMissionRepository::try_new(&mut conn).unwrap());
    let first = service
        .create_mission(&NewMission::unassigned(targets(1)))
        .unwrap();
    let second = service
        .create_mission(&NewMission::unassigned(targets(1)))
        .unwrap();

    let assigned = service.assign_cat(first.id, cat_id).unwrap();
    assert_eq!(assigned.cat_id, Some(cat_id));
    let again = service.assign_cat(first.id, cat_id).unwrap();
    assert_eq!(again, assigned);

    let err = service.assign_cat(second.id, cat_id).unwrap_err();
    assert!(matches!(
        err,
        MissionServiceError::CatAlreadyAssigned { active_mission_id, .. }
            if active_mission_id == first.id
    ));
    assert_eq!(service.get_mission(second.id).unwrap().cat_id, None);
}

#[test]
fn cat_is_free_for_new_assignment_after_mission_completes() {
    let mut conn = open_db_in_memory().unwrap();
    let cat_id = seed_cat(&conn, "Tom");
    let mut service = MissionService::new(SqliteMissionRepository::try_new(&mut conn).unwrap());
    let first = service
        .create_mission(&NewMission::assigned(cat_id, targets(1)))
        .unwrap();
    let second = service
        .create_mission(&NewMission::unassigned(targets(1)))
        .unwrap();

    service
        .update_target(first.targets[0].id, &TargetUpdate::complete(true))
        .unwrap();
    let reassigned = service.assign_cat(second.id, cat_id).unwrap();
    assert_eq!(reassigned.cat_id, Some(cat_id));

    // Completed missions keep their cat for history.
    let history = service.get_mission(first.id).unwrap();
    assert!(history.complete);
    assert_eq!(history.cat_id, Some(cat_id));
}

#[test]
fn assign_with_missing_mission_or_cat_is_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let cat_id = seed_cat(&conn, "Tom");
    let mut service = MissionService::new(SqliteMissionRepository::try_new(&mut conn).unwrap());
    let mission = service
        .create_mission(&NewMission::unassigned(targets(1)))
        .unwrap();

    assert!(matches!(
        service.assign_cat(999, cat_id).unwrap_err(),
        MissionServiceError::MissionNotFound(999)
    ));
    assert!(matches!(
        service.assign_cat(mission.id, 999).unwrap_err(),
        MissionServiceError::CatNotFound(999)
    ));
}

#[test]
fn delete_unassigned_mission_removes_its_targets() {
    let mut conn = open_db_in_memory().unwrap();
    let (kept, removed) = {
        let mut service =
            MissionService::new(SqliteMissionRepository::try_new(&mut conn).unwrap());
        let kept = service
            .create_mission(&NewMission::unassigned(targets(1)))
            .unwrap();
        let removed = service
            .create_mission(&NewMission::unassigned(targets(3)))
            .unwrap();
        service.delete_mission(removed.id).unwrap();
        assert!(matches!(
            service.get_mission(removed.id).unwrap_err(),
            MissionServiceError::MissionNotFound(_)
        ));
        (kept, removed)
    };

    let orphans: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM targets WHERE mission_id = ?1;",
            [removed.id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(orphans, 0);
    assert_eq!(count_rows(&conn, "targets"), kept.targets.len() as i64);
}

#[test]
fn delete_assigned_mission_fails_even_after_completion() {
    let mut conn = open_db_in_memory().unwrap();
    let breeds = BreedValidator::with_breeds(["Siamese"]);
    let cat = {
        let cats = CatService::new(SqliteCatRepository::try_new(&conn).unwrap(), &breeds);
        cats.create_cat(NewCat::new("Tom", 2, "Siamese", 1000))
            .unwrap()
    };

    let mut service = MissionService::new(SqliteMissionRepository::try_new(&mut conn).unwrap());
    let mission = service
        .create_mission(&NewMission::assigned(
            cat.id,
            vec![NewTarget::new("T1", "FR")],
        ))
        .unwrap();
    assert!(!mission.complete);

    service
        .update_target(mission.targets[0].id, &TargetUpdate::complete(true))
        .unwrap();
    let completed = service.get_mission(mission.id).unwrap();
    assert!(completed.complete);
    assert_eq!(completed.cat_id, Some(cat.id));

    let err = service.delete_mission(mission.id).unwrap_err();
    assert!(matches!(
        err,
        MissionServiceError::MissionAssigned { mission_id, cat_id }
            if mission_id == mission.id && cat_id == cat.id
    ));
    assert_eq!(err.code(), "mission_assigned");
    assert!(service.get_mission(mission.id).is_ok());
}

#[test]
fn delete_missing_mission_is_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = MissionService::new(SqliteMissionRepository::try_new(&mut conn).unwrap());
    assert!(matches!(
        service.delete_mission(5).unwrap_err(),
        MissionServiceError::MissionNotFound(5)
    ));
}

#[test]
fn deleting_cat_leaves_dangling_mission_reference() {
    let mut conn = open_db_in_memory().unwrap();
    let cat_id = seed_cat(&conn, "Tom");
    let mission_id = {
        let mut repo = SqliteMissionRepository::try_new(&mut conn).unwrap();
        repo.create_mission(&NewMission::assigned(cat_id, targets(1)))
            .unwrap()
    };

    SqliteCatRepository::try_new(&conn)
        .unwrap()
        .delete_cat(cat_id)
        .unwrap();

    let mut service = MissionService::new(SqliteMissionRepository::try_new(&mut conn).unwrap());
    let mission = service.get_mission(mission_id).unwrap();
    assert_eq!(mission.cat_id, Some(cat_id));
    assert!(matches!(
        service.delete_mission(mission_id).unwrap_err(),
        MissionServiceError::MissionAssigned { .. }
    ));
}

#[test]
fn list_missions_returns_each_mission_with_its_targets() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = MissionService::new(SqliteMissionRepository::try_new(&mut conn).unwrap());
    let first = service
        .create_mission(&NewMission::unassigned(targets(2)))
        .unwrap();
    let second = service
        .create_mission(&NewMission::unassigned(targets(1)))
        .unwrap();

    let listed = service.list_missions().unwrap();
    assert_eq!(listed, vec![first, second]);
}
