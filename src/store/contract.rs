//! Behaviour every `TodoStore` implementation must share.
//!
//! Each function runs against a fresh store and panics on the first mismatch.

use super::{StoreError, TodoStore};
use crate::model::{NewTask, Priority};

pub async fn project_lifecycle(store: &dyn TodoStore) {
    assert!(store.get_project("homework").await.unwrap().is_none());

    let created = store.create_project("homework").await.unwrap();
    assert_eq!(created.name, "homework");
    assert!(!created.archived);

    let fetched = store.get_project("homework").await.unwrap().unwrap();
    assert_eq!(fetched.id, created.id);

    let err = store.create_project("homework").await.unwrap_err();
    assert!(matches!(err, StoreError::DuplicateProject(ref name) if name == "homework"));

    store.create_project("cleaning").await.unwrap();
    let names: Vec<String> = store
        .list_projects()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["homework", "cleaning"]);

    let mut project = fetched;
    project.archive();
    store.update_project(&project).await.unwrap();
    assert!(store.get_project("homework").await.unwrap().unwrap().archived);

    project.unarchive();
    project.unarchive();
    store.update_project(&project).await.unwrap();
    assert!(!store.get_project("homework").await.unwrap().unwrap().archived);

    store.delete_project("homework").await.unwrap();
    assert!(store.get_project("homework").await.unwrap().is_none());
    assert_eq!(store.list_projects().await.unwrap().len(), 1);
}

pub async fn project_rename(store: &dyn TodoStore) {
    let mut project = store.create_project("homework").await.unwrap();
    store
        .create_task(NewTask::new(project.id, "math"))
        .await
        .unwrap();

    project.name = "researchpaper".to_string();
    store.update_project(&project).await.unwrap();

    assert!(store.get_project("homework").await.unwrap().is_none());
    let renamed = store.get_project("researchpaper").await.unwrap().unwrap();
    assert_eq!(renamed.id, project.id);

    // Tasks follow the project id, not its name.
    let task = store.get_task("researchpaper", "math").await.unwrap();
    assert!(task.is_some());

    store.create_project("cleaning").await.unwrap();
    project.name = "cleaning".to_string();
    let err = store.update_project(&project).await.unwrap_err();
    assert!(err.is_duplicate());
}

pub async fn task_uniqueness_is_per_project(store: &dyn TodoStore) {
    let homework = store.create_project("homework").await.unwrap();
    let school = store.create_project("school").await.unwrap();

    let math = store
        .create_task(NewTask::new(homework.id, "math"))
        .await
        .unwrap();
    assert_eq!(math.project_id, homework.id);
    assert_eq!(math.priority, Priority::Low);
    assert!(!math.done);
    assert!(math.deadline.is_none());

    let err = store
        .create_task(NewTask::new(homework.id, "math"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::DuplicateTask { ref project, ref task } if project == "homework" && task == "math"
    ));

    store
        .create_task(NewTask::new(school.id, "math"))
        .await
        .unwrap();

    let err = store
        .create_task(NewTask::new(homework.id + school.id + 100, "math"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::ProjectNotFound(_)));

    let fetched = store.get_task("homework", "math").await.unwrap().unwrap();
    assert_eq!(fetched.id, math.id);
    assert!(store.get_task("homework", "biology").await.unwrap().is_none());
    assert!(store.get_task("nowhere", "math").await.unwrap().is_none());
}

pub async fn task_updates(store: &dyn TodoStore) {
    let homework = store.create_project("homework").await.unwrap();
    let mut new_task = NewTask::new(homework.id, "math");
    new_task.priority = Priority::High;
    let mut math = store.create_task(new_task).await.unwrap();
    store
        .create_task(NewTask::new(homework.id, "biology"))
        .await
        .unwrap();

    math.complete();
    store.update_task(&math).await.unwrap();
    math.complete();
    store.update_task(&math).await.unwrap();
    let stored = store.get_task("homework", "math").await.unwrap().unwrap();
    assert!(stored.done);
    assert_eq!(stored.priority, Priority::High);

    math.reopen();
    store.update_task(&math).await.unwrap();
    assert!(!store.get_task("homework", "math").await.unwrap().unwrap().done);

    math.name = "algebra".to_string();
    store.update_task(&math).await.unwrap();
    assert!(store.get_task("homework", "math").await.unwrap().is_none());
    assert!(store.get_task("homework", "algebra").await.unwrap().is_some());

    math.name = "biology".to_string();
    let err = store.update_task(&math).await.unwrap_err();
    assert!(err.is_duplicate());

    let tasks = store.list_project_tasks(&homework).await.unwrap();
    let names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["algebra", "biology"]);

    let algebra = store.get_task("homework", "algebra").await.unwrap().unwrap();
    store.delete_task(&algebra).await.unwrap();
    assert!(store.get_task("homework", "algebra").await.unwrap().is_none());
    assert_eq!(store.list_project_tasks(&homework).await.unwrap().len(), 1);

    let err = store.delete_task(&algebra).await.unwrap_err();
    assert!(err.is_not_found());
}

pub async fn delete_project_cascades(store: &dyn TodoStore) {
    let homework = store.create_project("homework").await.unwrap();
    store
        .create_task(NewTask::new(homework.id, "math"))
        .await
        .unwrap();

    store.delete_project("homework").await.unwrap();

    // A new project with the same name starts without the old tasks.
    let recreated = store.create_project("homework").await.unwrap();
    assert!(store.list_project_tasks(&recreated).await.unwrap().is_empty());
    assert!(store.get_task("homework", "math").await.unwrap().is_none());
}

pub async fn missing_records(store: &dyn TodoStore) {
    let err = store.delete_project("laundry").await.unwrap_err();
    assert!(matches!(err, StoreError::ProjectNotFound(ref name) if name == "laundry"));

    let mut ghost = store.create_project("ghost").await.unwrap();
    store.delete_project("ghost").await.unwrap();
    ghost.archive();
    let err = store.update_project(&ghost).await.unwrap_err();
    assert!(err.is_not_found());

    let homework = store.create_project("homework").await.unwrap();
    let math = store
        .create_task(NewTask::new(homework.id, "math"))
        .await
        .unwrap();
    store.delete_task(&math).await.unwrap();
    let err = store.update_task(&math).await.unwrap_err();
    assert!(err.is_not_found());

    assert!(store.list_project_tasks(&homework).await.unwrap().is_empty());
}
