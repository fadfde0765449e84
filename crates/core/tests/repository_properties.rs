//! Repository behaviour over both key-value adapters.

use std::collections::HashSet;
use std::sync::Arc;

use taskbox_core::category::{CategoryRepository, KvCategoryStore};
use taskbox_core::storage::{FileKeyValueStore, MemoryKeyValueStore, SharedStore};
use taskbox_core::task::{KvTaskStore, TaskRepository};
use tempfile::TempDir;

struct Fixture {
    tasks: Arc<KvTaskStore>,
    categories: KvCategoryStore,
    _temp: Option<TempDir>,
}

fn fixture(store: SharedStore, temp: Option<TempDir>) -> Fixture {
    let tasks = Arc::new(KvTaskStore::new(store.clone()));
    let categories = KvCategoryStore::new(store, tasks.clone());
    Fixture {
        tasks,
        categories,
        _temp: temp,
    }
}

fn fixtures() -> Vec<Fixture> {
    let temp = TempDir::new().unwrap();
    let file_store = Arc::new(FileKeyValueStore::new(temp.path().join("data")));

    vec![
        fixture(Arc::new(MemoryKeyValueStore::new()), None),
        fixture(file_store, Some(temp)),
    ]
}

#[tokio::test]
async fn test_add_task_yields_unique_ids() {
    for f in fixtures() {
        let mut ids = HashSet::new();
        for n in 0..10 {
            let task = f.tasks.add_task(&format!("Task {}", n), None).await.unwrap();
            assert!(ids.insert(task.id));
            assert_eq!(f.tasks.get_tasks().await.unwrap().len(), n + 1);
        }
    }
}

#[tokio::test]
async fn test_buy_milk_buy_eggs() {
    for f in fixtures() {
        f.tasks.add_task("Buy milk", None).await.unwrap();
        f.tasks.add_task("Buy eggs", Some("cat1")).await.unwrap();

        let in_cat1 = f.tasks.get_tasks_by_category("cat1").await.unwrap();
        assert_eq!(in_cat1.len(), 1);
        assert_eq!(in_cat1[0].title, "Buy eggs");
    }
}

#[tokio::test]
async fn test_delete_task_removes_only_that_id() {
    for f in fixtures() {
        let a = f.tasks.add_task("A", None).await.unwrap();
        let b = f.tasks.add_task("B", None).await.unwrap();

        assert!(f.tasks.delete_task(&a.id).await.unwrap());
        let remaining = f.tasks.get_tasks().await.unwrap();
        assert!(remaining.iter().all(|t| t.id != a.id));

        assert!(!f.tasks.delete_task("does-not-exist").await.unwrap());
        assert_eq!(f.tasks.get_tasks().await.unwrap(), vec![b]);
    }
}

#[tokio::test]
async fn test_completed_toggle_restores_record() {
    for f in fixtures() {
        let task = f.tasks.add_task("Toggle", Some("cat1")).await.unwrap();

        f.tasks.set_task_completed(&task.id, true).await.unwrap();
        f.tasks.set_task_completed(&task.id, false).await.unwrap();

        assert_eq!(f.tasks.get_tasks().await.unwrap(), vec![task]);
    }
}

#[tokio::test]
async fn test_category_cascade() {
    for f in fixtures() {
        let work = f.categories.add_category("Work", Some("#ff0000")).await.unwrap();
        let home = f.categories.add_category("Home", None).await.unwrap();
        f.tasks.add_task("Report", Some(work.id.as_str())).await.unwrap();
        let dishes = f.tasks.add_task("Dishes", Some(home.id.as_str())).await.unwrap();

        // Without cascade the reference dangles
        f.categories.delete_category(&home.id, false).await.unwrap();
        assert_eq!(
            f.tasks.get_tasks_by_category(&home.id).await.unwrap(),
            vec![dishes]
        );

        // With cascade no task references the category
        f.categories.delete_category(&work.id, true).await.unwrap();
        let tasks = f.tasks.get_tasks().await.unwrap();
        assert!(tasks.iter().all(|t| !t.is_in_category(&work.id)));
        assert!(f.categories.get_categories().await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_add_category_round_trip() {
    for f in fixtures() {
        f.categories.add_category("Work", Some("#ff0000")).await.unwrap();

        let categories = f.categories.get_categories().await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Work");
        assert_eq!(categories[0].color.as_deref(), Some("#ff0000"));
        assert!(!categories[0].id.is_empty());
    }
}

#[tokio::test]
async fn test_file_store_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("data");

    let created = {
        let store: SharedStore = Arc::new(FileKeyValueStore::new(&dir));
        let f = fixture(store, None);
        let category = f.categories.add_category("Work", None).await.unwrap();
        let task = f.tasks.add_task("Persistent task", Some(category.id.as_str())).await.unwrap();
        f.tasks.set_task_completed(&task.id, true).await.unwrap();
        task
    };

    let store: SharedStore = Arc::new(FileKeyValueStore::new(&dir));
    let f = fixture(store, None);
    let tasks = f.tasks.get_tasks().await.unwrap();

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, created.id);
    assert!(tasks[0].completed);
    assert_eq!(f.categories.get_categories().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_corrupt_file_reads_as_empty() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("data");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("tasks.json"), "[{\"id\": ").unwrap();

    let f = fixture(Arc::new(FileKeyValueStore::new(&dir)), None);

    assert!(f.tasks.get_tasks().await.unwrap().is_empty());
    f.tasks.add_task("Recovered", None).await.unwrap();
    assert_eq!(f.tasks.get_tasks().await.unwrap().len(), 1);
}
