use bandcat_core::{
    CatalogError, CatalogRepository, CatalogService, ErrorKind, FileStoreOptions,
    JsonFileCatalogRepository, NewSong, SearchOptions, SongListQuery, SongPatch,
    SqliteCatalogRepository,
};
use tempfile::TempDir;

fn services() -> Vec<(TempDir, CatalogService<Box<dyn CatalogRepository>>)> {
    let file_dir = tempfile::tempdir().unwrap();
    let file_repo: Box<dyn CatalogRepository> =
        Box::new(JsonFileCatalogRepository::open(file_dir.path()).unwrap());

    let sqlite_dir = tempfile::tempdir().unwrap();
    let sqlite_repo: Box<dyn CatalogRepository> =
        Box::new(SqliteCatalogRepository::open(sqlite_dir.path().join("band.db")).unwrap());

    vec![
        (file_dir, CatalogService::new(file_repo)),
        (sqlite_dir, CatalogService::new(sqlite_repo)),
    ]
}

fn add_songs<R: CatalogRepository>(service: &CatalogService<R>, band: &str, count: usize) {
    for index in 0..count {
        service
            .create_song(&NewSong::new(format!("track {index:02}"), band))
            .unwrap();
    }
}

fn query(
    band: Option<&str>,
    title: Option<&str>,
    page_index: u32,
    page_size: u32,
) -> SongListQuery {
    SongListQuery {
        band: band.map(str::to_string),
        title: title.map(str::to_string),
        page_index,
        page_size,
    }
}

#[test]
fn seed_scenario_filters_by_band() {
    for (_dir, service) in services() {
        let page = service
            .list_songs(&query(Some("MyGO!!!!!"), None, 1, 10))
            .unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.songs.len(), 1);
        assert_eq!(page.songs[0].title, "迷星叫");
    }
}

#[test]
fn band_filter_takes_precedence_over_title() {
    for (_dir, service) in services() {
        add_songs(&service, "Morfonica", 2);

        let page = service
            .list_songs(&query(Some("MyGO!!!!!"), Some("x"), 1, 10))
            .unwrap();
        assert_eq!(page.total, 1);
        assert!(page.songs.iter().all(|song| song.band == "MyGO!!!!!"));
    }
}

#[test]
fn title_filter_applies_only_without_band() {
    for (_dir, service) in services() {
        let page = service
            .list_songs(&query(None, Some("黑色生日"), 1, 10))
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.songs[0].title, "黑色生日");
    }
}

#[test]
fn blank_filters_fall_back_to_all_songs() {
    for (_dir, service) in services() {
        let page = service
            .list_songs(&query(Some(""), Some("  "), 1, 10))
            .unwrap();
        assert_eq!(page.total, 2);
    }
}

#[test]
fn second_page_of_fifteen_filtered_songs_has_five() {
    for (_dir, service) in services() {
        add_songs(&service, "Morfonica", 15);
        add_songs(&service, "Ave Mujica", 3);

        let page = service
            .list_songs(&query(Some("Morfonica"), None, 2, 10))
            .unwrap();
        assert_eq!(page.songs.len(), 5);
        assert_eq!(page.total, 15);
        assert_eq!(page.page_index, 2);
        assert_eq!(page.page_size, 10);
        assert_eq!(page.songs[0].title, "track 10");
    }
}

#[test]
fn page_past_the_end_is_a_validation_error() {
    for (_dir, service) in services() {
        add_songs(&service, "Morfonica", 15);

        let err = service
            .list_songs(&query(Some("Morfonica"), None, 3, 10))
            .unwrap_err();
        assert!(matches!(err, CatalogError::PageOutOfRange { offset: 20, total: 15 }));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}

#[test]
fn get_bands_by_name_or_all() {
    for (_dir, service) in services() {
        assert_eq!(service.get_bands(None).unwrap().len(), 3);

        let named = service.get_bands(Some("Morfonica")).unwrap();
        assert_eq!(named.len(), 1);
        assert_eq!(named[0].name, "Morfonica");

        let err = service.get_bands(Some("Roselia")).unwrap_err();
        assert!(matches!(err, CatalogError::BandNotFound(_)));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}

#[test]
fn song_lifecycle_maps_errors_to_kinds() {
    for (_dir, service) in services() {
        let created = service
            .create_song(&NewSong::new("栞", "MyGO!!!!!"))
            .unwrap();
        assert_eq!(service.get_song(created.id).unwrap(), created);

        let err = service
            .update_song(
                created.id,
                &SongPatch {
                    band: Some("NonexistentBand".to_string()),
                    ..SongPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownBand(_)));

        service.delete_song(created.id).unwrap();
        let err = service.get_song(created.id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = service.delete_song(created.id).unwrap_err();
        assert!(matches!(err, CatalogError::SongNotFound(id) if id == created.id));
    }
}

#[test]
fn configured_threshold_narrows_title_listing() {
    let dir = tempfile::tempdir().unwrap();
    let repo = JsonFileCatalogRepository::open_with(
        dir.path(),
        FileStoreOptions {
            search: SearchOptions::with_min_score(0.5),
            ..FileStoreOptions::default()
        },
    )
    .unwrap();
    let service = CatalogService::new(repo);

    let page = service.list_songs(&query(None, Some("迷星"), 1, 10)).unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.songs[0].title, "迷星叫");
}

#[test]
fn malformed_storage_is_a_storage_error() {
    let dir = tempfile::tempdir().unwrap();
    let repo = JsonFileCatalogRepository::open(dir.path()).unwrap();
    std::fs::write(repo.song_file(), b"{not json").unwrap();
    let service = CatalogService::new(repo);

    let err = service.list_songs(&SongListQuery::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);
}
