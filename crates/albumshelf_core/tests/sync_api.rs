use albumshelf_core::db::open_db_in_memory;
use albumshelf_core::{
    read_sync_document, read_sync_json, write_sync_json, LibraryService, LibraryServiceError,
    SqliteLibraryRepository, SyncApiError, SyncDocument, TreeNode, MAX_FOLDER_DEPTH,
};
use serde_json::{json, Value};

const CLIENT_DOCUMENT: &str = r#"{
  "folders": [
    {
      "id": "f-rock",
      "name": "Rock",
      "parentId": null,
      "isExpanded": false,
      "albums": [
        {
          "id": "a-1",
          "spotifyId": "sp-1",
          "name": "Nevermind",
          "artist": "Nirvana",
          "imageUrl": "https://img/nevermind.jpg",
          "releaseDate": "1991-09-24",
          "totalTracks": 12,
          "externalUrl": "https://open.spotify.com/album/sp-1"
        }
      ],
      "subfolders": [
        { "id": "f-punk", "name": "Punk", "parentId": "f-rock", "isExpanded": true, "albums": [], "subfolders": [] }
      ]
    },
    { "id": "f-jazz", "name": "Jazz", "parentId": null, "isExpanded": true, "albums": [], "subfolders": [] }
  ]
}"#;

#[test]
fn written_document_reads_back_in_wire_shape() {
    let conn = open_db_in_memory().unwrap();

    let response = write_sync_json(&conn, "u1", CLIENT_DOCUMENT);
    assert!(response.ok, "{}", response.message);
    assert!(response.message.is_empty());

    let body: Value = serde_json::from_str(&read_sync_json(&conn, "u1").unwrap()).unwrap();
    let rock = &body["folders"][0];
    assert_eq!(rock["id"], "f-rock");
    assert_eq!(rock["isExpanded"], false);
    assert!(rock["parentId"].is_null());
    assert_eq!(rock["subfolders"][0]["parentId"], "f-rock");
    assert_eq!(body["folders"][1]["id"], "f-jazz");

    let album = &rock["albums"][0];
    assert_eq!(
        album,
        &json!({
            "id": "a-1",
            "folderId": "f-rock",
            "userId": "u1",
            "spotifyId": "sp-1",
            "name": "Nevermind",
            "artist": "Nirvana",
            "imageUrl": "https://img/nevermind.jpg",
            "releaseDate": "1991-09-24",
            "totalTracks": 12,
            "externalUrl": "https://open.spotify.com/album/sp-1",
            "position": 0
        })
    );
}

#[test]
fn malformed_document_is_rejected_without_touching_store() {
    let conn = open_db_in_memory().unwrap();
    assert!(write_sync_json(&conn, "u1", CLIENT_DOCUMENT).ok);

    let response = write_sync_json(&conn, "u1", r#"{"folders": [{"name": "no id"}]}"#);

    assert!(!response.ok);
    assert!(response.message.starts_with("invalid sync document"));
    assert_eq!(read_sync_document(&conn, "u1").unwrap().folders.len(), 2);
}

#[test]
fn store_failure_reports_underlying_error() {
    let conn = open_db_in_memory().unwrap();
    let duplicated = r#"{"folders": [{"id": "same", "name": "A"}, {"id": "same", "name": "B"}]}"#;

    let response = write_sync_json(&conn, "u1", duplicated);

    assert!(!response.ok);
    assert!(response.message.starts_with("failed to save data: "));
    assert!(response.message.contains("UNIQUE constraint failed"));
}

#[test]
fn empty_document_clears_library() {
    let conn = open_db_in_memory().unwrap();
    assert!(write_sync_json(&conn, "u1", CLIENT_DOCUMENT).ok);

    assert!(write_sync_json(&conn, "u1", r#"{"folders": []}"#).ok);

    assert_eq!(read_sync_json(&conn, "u1").unwrap(), r#"{"folders":[]}"#);
}

#[test]
fn blank_user_is_reported() {
    let conn = open_db_in_memory().unwrap();

    let response = write_sync_json(&conn, " ", CLIENT_DOCUMENT);
    assert!(!response.ok);
    assert!(response.message.contains("user id must not be blank"));

    assert!(matches!(
        read_sync_document(&conn, ""),
        Err(SyncApiError::Sync(_))
    ));
}

#[test]
fn deepest_folder_chain_exports_and_imports_back() {
    let conn = open_db_in_memory().unwrap();
    let service = LibraryService::new(SqliteLibraryRepository::try_new(&conn).unwrap());
    let mut parent = service.create_folder("u1", None, "Level 1").unwrap();
    for level in 2..=MAX_FOLDER_DEPTH {
        parent = service
            .create_folder("u1", Some(parent.id.as_str()), format!("Level {level}"))
            .unwrap();
    }
    assert!(matches!(
        service.create_folder("u1", Some(parent.id.as_str()), "One too many"),
        Err(LibraryServiceError::FolderTooDeep { max_depth }) if max_depth == MAX_FOLDER_DEPTH
    ));

    let exported = read_sync_json(&conn, "u1").unwrap();
    let response = write_sync_json(&conn, "u1", &exported);

    assert!(response.ok, "{}", response.message);
    assert_eq!(read_sync_json(&conn, "u1").unwrap(), exported);
}

#[test]
fn document_nested_past_limit_is_invalid() {
    let conn = open_db_in_memory().unwrap();
    assert!(write_sync_json(&conn, "u1", CLIENT_DOCUMENT).ok);
    let mut node = TreeNode::new("bottom", "Bottom");
    for level in (1..=MAX_FOLDER_DEPTH).rev() {
        node = TreeNode::new(format!("level-{level}"), "Level").with_subfolder(node);
    }
    let body = serde_json::to_string(&SyncDocument { folders: vec![node] }).unwrap();

    let response = write_sync_json(&conn, "u1", &body);

    assert!(!response.ok);
    assert!(response.message.starts_with("invalid sync document: "));
    assert!(response.message.contains(&format!("at most {MAX_FOLDER_DEPTH}")));
    assert_eq!(read_sync_document(&conn, "u1").unwrap().folders.len(), 2);
}

#[test]
fn null_track_count_is_accepted() {
    let conn = open_db_in_memory().unwrap();
    let body = r#"{"folders": [{"id": "f", "name": "F", "albums": [
        {"id": "a", "name": "A", "artist": "B", "totalTracks": null}
    ]}]}"#;

    let response = write_sync_json(&conn, "u1", body);

    assert!(response.ok, "{}", response.message);
    let document = read_sync_document(&conn, "u1").unwrap();
    assert_eq!(document.folders[0].albums[0].total_tracks, 0);
}
