use docweave::doc;
use docweave::filter::all;
use docweave::store::InMemoryStore;
use docweave::Weave;
use std::time::Duration;

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[test]
fn test_cleaner_disabled_by_default() {
    let weave = Weave::builder().open().unwrap();
    assert!(weave.cleaner().is_none());
    weave.close().unwrap();
}

#[test]
fn test_sweep_deletes_expired_documents() {
    let weave = Weave::builder()
        .store(InMemoryStore::new())
        .enable_default_cleaner()
        .open()
        .unwrap();
    weave.insert("sessions", doc! { token: "old", exp: (now() - 10) }).unwrap();
    weave.insert("sessions", doc! { token: "new", exp: (now() + 3600) }).unwrap();
    weave.insert("users", doc! { name: "ann" }).unwrap();

    let cleaner = weave.cleaner().unwrap();
    assert_eq!(cleaner.sweep().unwrap(), 1);

    let store = weave.store();
    assert_eq!(store.count("sessions", &all()).unwrap(), 1);
    assert_eq!(store.count("users", &all()).unwrap(), 1);
    weave.close().unwrap();
}

#[test]
fn test_scheduled_cleaner_removes_expired_documents() {
    let weave = Weave::builder()
        .enable_cleaner(Duration::from_millis(50))
        .open()
        .unwrap();
    weave.insert("password_resets", doc! { exp: (now() - 1) }).unwrap();
    weave.insert("password_resets", doc! { exp: (now() + 3600) }).unwrap();

    let store = weave.store();
    awaitility::at_most(Duration::from_secs(2)).until(|| {
        store.count("password_resets", &all()).unwrap_or(2) == 1
    });

    weave.close().unwrap();
    assert!(!weave.cleaner().unwrap().is_running());
}
