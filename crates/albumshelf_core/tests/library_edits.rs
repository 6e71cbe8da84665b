use albumshelf_core::db::open_db_in_memory;
use albumshelf_core::{
    Album, LibraryService, LibraryServiceError, SqliteLibraryRepository, SyncService,
};
use rusqlite::Connection;

fn service(conn: &Connection) -> LibraryService<SqliteLibraryRepository<'_>> {
    LibraryService::new(SqliteLibraryRepository::try_new(conn).unwrap())
}

fn album_ids(albums: &[Album]) -> Vec<&str> {
    albums.iter().map(|album| album.id.as_str()).collect()
}

#[test]
fn create_folder_appends_after_last_sibling() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let first = service.create_folder("u1", None, "  Rock  ").unwrap();
    let second = service.create_folder("u1", None, "Jazz").unwrap();
    let child = service
        .create_folder("u1", Some(first.id.as_str()), "Punk")
        .unwrap();

    assert_eq!(first.name, "Rock");
    assert!(first.is_expanded);
    assert_eq!(first.position, 0);
    assert_eq!(second.position, 1);
    assert_eq!(child.position, 0);
    assert_eq!(child.parent_id.as_deref(), Some(first.id.as_str()));
    assert_ne!(first.id, second.id);
}

#[test]
fn create_folder_rejects_blank_name_and_foreign_parent() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let theirs = service.create_folder("u2", None, "Theirs").unwrap();

    assert!(matches!(
        service.create_folder("u1", None, "   "),
        Err(LibraryServiceError::InvalidDisplayName)
    ));
    assert!(matches!(
        service.create_folder("u1", Some(theirs.id.as_str()), "Sneaky"),
        Err(LibraryServiceError::FolderNotFound(id)) if id == theirs.id
    ));
}

#[test]
fn rename_and_toggle_update_one_folder() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let folder = service.create_folder("u1", None, "Draft").unwrap();

    let renamed = service.rename_folder("u1", &folder.id, "Final").unwrap();
    assert_eq!(renamed.name, "Final");

    assert!(!service.toggle_folder_expanded("u1", &folder.id).unwrap());
    assert!(service.toggle_folder_expanded("u1", &folder.id).unwrap());

    assert!(matches!(
        service.rename_folder("u2", &folder.id, "Hijack"),
        Err(LibraryServiceError::FolderNotFound(_))
    ));
}

#[test]
fn delete_folder_cascades_to_subtree_and_albums() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let parent = service.create_folder("u1", None, "Parent").unwrap();
    let child = service
        .create_folder("u1", Some(parent.id.as_str()), "Child")
        .unwrap();
    service
        .add_album("u1", &child.id, Album::new("", "Nevermind", "Nirvana", ""))
        .unwrap();

    service.delete_folder("u1", &parent.id).unwrap();

    let tree = SyncService::new(SqliteLibraryRepository::try_new(&conn).unwrap())
        .load_tree("u1")
        .unwrap();
    assert!(tree.is_empty());
    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM albums;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 0);
}

#[test]
fn add_album_mints_id_and_takes_folder_ownership() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let folder = service.create_folder("u1", None, "Grunge").unwrap();

    let mut incoming = Album::new("", "Ten", "Pearl Jam", "cover.jpg");
    incoming.user_id = "u2".to_string();
    incoming.position = 7;
    let first = service.add_album("u1", &folder.id, incoming).unwrap();
    let second = service
        .add_album("u1", &folder.id, Album::new("fixed-id", "Dirt", "Alice in Chains", ""))
        .unwrap();

    assert!(!first.id.is_empty());
    assert_eq!(first.user_id, "u1");
    assert_eq!(first.folder_id, folder.id);
    assert_eq!(first.position, 0);
    assert_eq!(second.id, "fixed-id");
    assert_eq!(second.position, 1);

    let listed = service.list_albums("u1", &folder.id).unwrap();
    assert_eq!(album_ids(&listed), [first.id.as_str(), "fixed-id"]);
}

#[test]
fn remove_album_is_scoped_to_owner() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let folder = service.create_folder("u1", None, "Mine").unwrap();
    let album = service
        .add_album("u1", &folder.id, Album::new("a1", "Album", "Artist", ""))
        .unwrap();

    assert!(matches!(
        service.remove_album("u2", &album.id),
        Err(LibraryServiceError::AlbumNotFound(_))
    ));
    service.remove_album("u1", &album.id).unwrap();
    assert!(matches!(
        service.remove_album("u1", &album.id),
        Err(LibraryServiceError::AlbumNotFound(_))
    ));
}

#[test]
fn move_album_reorders_within_folder() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let folder = service.create_folder("u1", None, "Shelf").unwrap();
    for id in ["a", "b", "c"] {
        service
            .add_album("u1", &folder.id, Album::new(id, id, "Artist", ""))
            .unwrap();
    }

    service.move_album("u1", "c", &folder.id, Some(0)).unwrap();

    let listed = service.list_albums("u1", &folder.id).unwrap();
    assert_eq!(album_ids(&listed), ["c", "a", "b"]);
    let positions: Vec<i64> = listed.iter().map(|album| album.position).collect();
    assert_eq!(positions, [0, 1, 2]);
}

#[test]
fn move_album_across_folders_renumbers_both_sides() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let source = service.create_folder("u1", None, "Source").unwrap();
    let target = service.create_folder("u1", None, "Target").unwrap();
    for id in ["s1", "s2", "s3"] {
        service
            .add_album("u1", &source.id, Album::new(id, id, "Artist", ""))
            .unwrap();
    }
    service
        .add_album("u1", &target.id, Album::new("t1", "t1", "Artist", ""))
        .unwrap();

    service.move_album("u1", "s1", &target.id, Some(99)).unwrap();

    let source_albums = service.list_albums("u1", &source.id).unwrap();
    assert_eq!(album_ids(&source_albums), ["s2", "s3"]);
    assert_eq!(source_albums[0].position, 0);
    let target_albums = service.list_albums("u1", &target.id).unwrap();
    assert_eq!(album_ids(&target_albums), ["t1", "s1"]);
    assert_eq!(target_albums[1].position, 1);
}

#[test]
fn move_album_into_foreign_folder_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let mine = service.create_folder("u1", None, "Mine").unwrap();
    let theirs = service.create_folder("u2", None, "Theirs").unwrap();
    service
        .add_album("u1", &mine.id, Album::new("a1", "a1", "Artist", ""))
        .unwrap();

    assert!(matches!(
        service.move_album("u1", "a1", &theirs.id, None),
        Err(LibraryServiceError::FolderNotFound(id)) if id == theirs.id
    ));
}
