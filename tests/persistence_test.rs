mod helpers;

use helpers::{open_store, test_documents, test_embeddings};
use ragbase::config::StoreConfig;
use ragbase::store::VectorStore;
use ragbase::IngestError;
use tempfile::TempDir;

#[test]
fn creates_nested_persist_directory() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("data").join("vector_store");
    assert!(!dir.exists());

    let store = VectorStore::new("pdf_documents", &dir).unwrap();

    assert!(dir.is_dir());
    assert!(ragbase::db::db_path(&dir).exists());
    assert_eq!(store.persist_directory(), dir.as_path());
}

#[test]
fn opening_twice_with_existing_directory_succeeds() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("vector_store");

    let first = VectorStore::new("pdf_documents", &dir).unwrap();
    let first_id = first.collection().id;
    drop(first);

    let second = VectorStore::new("pdf_documents", &dir).unwrap();
    assert_eq!(second.collection().id, first_id);
}

#[test]
fn reopen_sees_previously_added_records() {
    let tmp = TempDir::new().unwrap();

    let mut store = open_store(&tmp);
    store
        .add_documents(&test_documents(3), &test_embeddings(3))
        .unwrap();
    drop(store);

    let mut reopened = open_store(&tmp);
    assert_eq!(reopened.count().unwrap(), 3);
    assert_eq!(reopened.collection().dimensions, Some(helpers::DIM));

    reopened
        .add_documents(&test_documents(2), &test_embeddings(2))
        .unwrap();
    drop(reopened);

    assert_eq!(open_store(&tmp).count().unwrap(), 5);
}

#[test]
fn open_from_config_uses_configured_description() {
    let tmp = TempDir::new().unwrap();
    let config = StoreConfig {
        collection_name: "papers".into(),
        persist_directory: tmp.path().join("vs").to_string_lossy().into_owned(),
        description: "research papers".into(),
    };

    let store = VectorStore::open(&config).unwrap();
    assert_eq!(store.collection().name, "papers");
    assert_eq!(store.collection().metadata["description"], "research papers");
}

#[test]
fn persist_directory_that_is_a_file_fails_with_store_init() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("not_a_dir");
    std::fs::write(&file, "occupied").unwrap();

    let err = VectorStore::new("pdf_documents", &file).err().expect("must fail");
    assert!(matches!(err, IngestError::StoreInit { .. }));
    assert!(err.to_string().contains("not_a_dir"));
}

#[test]
fn empty_collection_name_fails_with_store_init() {
    let tmp = TempDir::new().unwrap();
    let err = VectorStore::new("", tmp.path()).err().expect("must fail");
    assert!(matches!(err, IngestError::StoreInit { .. }));
}

#[test]
fn list_collections_reports_counts() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("vector_store");
    let mut a = VectorStore::new("alpha", &dir).unwrap();
    a.add_documents(&test_documents(2), &test_embeddings(2)).unwrap();
    drop(a);
    VectorStore::new("beta", &dir).unwrap();

    let conn = ragbase::db::open_database(&dir).unwrap();
    let infos = ragbase::store::collection::list_collections(&conn).unwrap();
    assert_eq!(infos.len(), 2);
    assert_eq!(infos[0].name, "alpha");
    assert_eq!(infos[0].count, 2);
    assert_eq!(infos[0].dimensions, Some(helpers::DIM));
    assert_eq!(infos[1].count, 0);
    assert_eq!(infos[1].dimensions, None);
}

#[test]
fn open_existing_does_not_create_unknown_collection() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("vector_store");
    let mut store = VectorStore::new("pdf_documents", &dir).unwrap();
    store
        .add_documents(&test_documents(1), &test_embeddings(1))
        .unwrap();
    drop(store);

    let config = |name: &str| StoreConfig {
        collection_name: name.into(),
        persist_directory: dir.to_string_lossy().into_owned(),
        description: "unused".into(),
    };

    let err = VectorStore::open_existing(&config("pdf_documnets"))
        .err()
        .expect("unknown collection must fail");
    assert!(matches!(err, IngestError::StoreInit { .. }));
    assert!(err.to_string().contains("no such collection 'pdf_documnets'"));

    let existing = VectorStore::open_existing(&config("pdf_documents")).unwrap();
    assert_eq!(existing.count().unwrap(), 1);
    drop(existing);

    let conn = ragbase::db::open_database(&dir).unwrap();
    let infos = ragbase::store::collection::list_collections(&conn).unwrap();
    let names: Vec<&str> = infos.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["pdf_documents"]);
}
