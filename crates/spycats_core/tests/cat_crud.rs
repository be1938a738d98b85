use spycats_core::db::open_db_in_memory;
use spycats_core::{
    BreedValidator, CatRepository, CatService, CatServiceError, NewCat, RepoError,
    SqliteCatRepository,
};

fn tom() -> NewCat {
    NewCat::new("Tom", 2, "Siamese", 1000)
}

#[test]
fn create_and_get_roundtrip_assigns_identity() {
    let conn = open_db_in_memory().unwrap();
    let breeds = BreedValidator::with_breeds(["Siamese", "Bengal"]);
    let service = CatService::new(SqliteCatRepository::try_new(&conn).unwrap(), &breeds);

    let created = service.create_cat(tom()).unwrap();
    assert!(created.id > 0);
    assert_eq!(created.name, "Tom");
    assert_eq!(created.experience, 2);
    assert_eq!(created.breed, "Siamese");
    assert_eq!(created.salary, 1000);

    let loaded = service.get_cat(created.id).unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn create_fails_not_ready_before_breeds_are_loaded() {
    let conn = open_db_in_memory().unwrap();
    let breeds = BreedValidator::new();
    let service = CatService::new(SqliteCatRepository::try_new(&conn).unwrap(), &breeds);

    let err = service.create_cat(tom()).unwrap_err();
    assert!(matches!(err, CatServiceError::NotReady));
    assert_eq!(err.code(), "not_ready");
    assert!(err.is_retryable());
    assert!(service.list_cats().unwrap().is_empty());

    breeds.reload(["Siamese"]);
    service.create_cat(tom()).unwrap();
}

#[test]
fn create_rejects_breed_outside_loaded_set() {
    let conn = open_db_in_memory().unwrap();
    let breeds = BreedValidator::with_breeds(["Bengal"]);
    let service = CatService::new(SqliteCatRepository::try_new(&conn).unwrap(), &breeds);

    let err = service.create_cat(tom()).unwrap_err();
    assert!(matches!(err, CatServiceError::InvalidBreed(ref breed) if breed == "Siamese"));
    assert!(!err.is_retryable());
    assert!(service.list_cats().unwrap().is_empty());
}

#[test]
fn list_returns_cats_in_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let breeds = BreedValidator::with_breeds(["Siamese", "Bengal"]);
    let service = CatService::new(SqliteCatRepository::try_new(&conn).unwrap(), &breeds);

    let first = service.create_cat(tom()).unwrap();
    let second = service
        .create_cat(NewCat::new("Felix", 5, "Bengal", 2500))
        .unwrap();

    let ids: Vec<_> = service.list_cats().unwrap().iter().map(|cat| cat.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[test]
fn update_salary_overwrites_only_salary() {
    let conn = open_db_in_memory().unwrap();
    let breeds = BreedValidator::with_breeds(["Siamese"]);
    let service = CatService::new(SqliteCatRepository::try_new(&conn).unwrap(), &breeds);
    let created = service.create_cat(tom()).unwrap();

    let updated = service.update_salary(created.id, 4200).unwrap();
    assert_eq!(updated.salary, 4200);
    assert_eq!(updated.name, created.name);
    assert_eq!(updated.breed, created.breed);
    assert_eq!(service.get_cat(created.id).unwrap().salary, 4200);
}

#[test]
fn missing_cat_operations_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let breeds = BreedValidator::with_breeds(["Siamese"]);
    let service = CatService::new(SqliteCatRepository::try_new(&conn).unwrap(), &breeds);

    assert!(matches!(
        service.get_cat(404).unwrap_err(),
        CatServiceError::CatNotFound(404)
    ));
    assert!(matches!(
        service.update_salary(404, 1).unwrap_err(),
        CatServiceError::CatNotFound(404)
    ));
    let err = service.delete_cat(404).unwrap_err();
    assert!(matches!(err, CatServiceError::CatNotFound(404)));
    assert_eq!(err.code(), "not_found");
}

#[test]
fn delete_removes_cat_and_second_delete_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCatRepository::try_new(&conn).unwrap();

    let id = repo.create_cat(&tom()).unwrap();
    repo.delete_cat(id).unwrap();

    assert!(repo.get_cat(id).unwrap().is_none());
    assert!(matches!(
        repo.delete_cat(id).unwrap_err(),
        RepoError::CatNotFound(missing) if missing == id
    ));
}

#[test]
fn ids_are_not_reused_after_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCatRepository::try_new(&conn).unwrap();

    let first = repo.create_cat(&tom()).unwrap();
    repo.delete_cat(first).unwrap();
    let second = repo.create_cat(&tom()).unwrap();
    assert!(second > first);
}
