//! Backend behavior tests shared by the in-memory and filesystem stores.

use crate::{codes, ObjectStore};


/// Contract every backend must satisfy.
pub async fn exercise_contract(store: &dyn ObjectStore) {
    store.put_object("users/u1/index.json", "{}").await.unwrap();
    store.put_object("users/u1/sessions/a.json", "A").await.unwrap();
    store.put_object("users/u1/sessions/b.json", "B").await.unwrap();
    store.put_object("users/u2/sessions/c.json", "C").await.unwrap();

    assert_eq!(store.get_object("users/u1/sessions/a.json").await.unwrap(), "A");

    store.put_object("users/u1/sessions/a.json", "A2").await.unwrap();
    assert_eq!(store.get_object("users/u1/sessions/a.json").await.unwrap(), "A2");

    let listed = store.list_objects("users/u1/sessions/").await.unwrap();
    assert_eq!(listed, ["users/u1/sessions/a.json", "users/u1/sessions/b.json"]);

    assert!(store.list_objects("users/nobody/sessions/").await.unwrap().is_empty());

    store.delete_object("users/u1/sessions/a.json").await.unwrap();
    let missing = store.get_object("users/u1/sessions/a.json").await.unwrap_err();
    assert_eq!(missing.code, codes::OBJECT_NOT_FOUND);

    let missing = store.delete_object("users/u1/sessions/a.json").await.unwrap_err();
    assert!(missing.is_not_found());
}
