//! Scenarios every backend must satisfy identically.

use bandcat_core::{
    CatalogRepository, JsonFileCatalogRepository, NewBand, NewSong, RepoError,
    SqliteCatalogRepository, SongPatch, SongValidationError,
};
use std::collections::HashSet;
use tempfile::TempDir;

fn backends() -> Vec<(TempDir, Box<dyn CatalogRepository>)> {
    let file_dir = tempfile::tempdir().unwrap();
    let file_repo = JsonFileCatalogRepository::open(file_dir.path()).unwrap();

    let sqlite_dir = tempfile::tempdir().unwrap();
    let sqlite_repo = SqliteCatalogRepository::open(sqlite_dir.path().join("band.db")).unwrap();

    vec![
        (file_dir, Box::new(file_repo) as Box<dyn CatalogRepository>),
        (sqlite_dir, Box::new(sqlite_repo)),
    ]
}

#[test]
fn seeded_bands_are_ordered_by_name() {
    for (_dir, repo) in backends() {
        let names = repo
            .get_all_bands()
            .unwrap()
            .into_iter()
            .map(|band| band.name)
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec!["Ave Mujica", "Morfonica", "MyGO!!!!!"],
            "backend {:?}",
            repo.storage_kind()
        );
    }
}

#[test]
fn band_lookup_by_name_is_exact() {
    for (_dir, repo) in backends() {
        let band = repo.get_band_by_name("Ave Mujica").unwrap().unwrap();
        assert_eq!(band.name, "Ave Mujica");
        assert!(band.id > 0);
        assert_eq!(repo.get_band_by_id(band.id).unwrap(), Some(band));

        assert!(repo.get_band_by_name("ave mujica").unwrap().is_none());
        assert!(repo.get_band_by_name("Ave").unwrap().is_none());
    }
}

#[test]
fn created_song_is_fetchable_with_unique_positive_id() {
    for (_dir, repo) in backends() {
        let mut ids = repo
            .get_all_songs()
            .unwrap()
            .into_iter()
            .map(|song| song.id)
            .collect::<HashSet<_>>();

        for title in ["春日影", "影色舞", "壱雫空"] {
            let created = repo
                .create_song(&NewSong::new(title, "MyGO!!!!!").with_author("Tomori"))
                .unwrap();
            assert!(created.id > 0);
            assert!(ids.insert(created.id), "duplicate id {}", created.id);
            assert_eq!(created.created_at, created.updated_at);

            let fetched = repo.get_song_by_id(created.id).unwrap().unwrap();
            assert_eq!(fetched, created);
        }
    }
}

#[test]
fn create_with_unknown_band_persists_nothing() {
    for (_dir, repo) in backends() {
        let before = repo.get_all_songs().unwrap().len();

        let err = repo
            .create_song(&NewSong::new("Ether", "NonexistentBand"))
            .unwrap_err();
        assert!(matches!(err, RepoError::UnknownBand(name) if name == "NonexistentBand"));
        assert_eq!(repo.get_all_songs().unwrap().len(), before);
    }
}

#[test]
fn create_with_empty_title_is_rejected() {
    for (_dir, repo) in backends() {
        let err = repo.create_song(&NewSong::new("", "MyGO!!!!!")).unwrap_err();
        assert!(matches!(
            err,
            RepoError::Validation(SongValidationError::EmptyTitle)
        ));
    }
}

#[test]
fn partial_update_changes_only_supplied_fields() {
    for (_dir, repo) in backends() {
        let created = repo
            .create_song(
                &NewSong::new("Symbol I", "Ave Mujica")
                    .with_author("Doloris")
                    .with_lyrics("first"),
            )
            .unwrap();

        let updated = repo
            .update_song(
                created.id,
                &SongPatch {
                    lyrics: Some("second".to_string()),
                    ..SongPatch::default()
                },
            )
            .unwrap();

        assert_eq!(updated.title, "Symbol I");
        assert_eq!(updated.author.as_deref(), Some("Doloris"));
        assert_eq!(updated.lyrics.as_deref(), Some("second"));
        assert_eq!(updated.band, "Ave Mujica");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
        assert_eq!(repo.get_song_by_id(created.id).unwrap(), Some(updated));
    }
}

#[test]
fn repeated_updates_keep_refreshing_updated_at() {
    for (_dir, repo) in backends() {
        let song = repo
            .create_song(&NewSong::new("Sophie", "Ave Mujica"))
            .unwrap();
        let first = repo.update_song(song.id, &SongPatch::default()).unwrap();
        let second = repo.update_song(song.id, &SongPatch::default()).unwrap();

        assert!(first.updated_at > song.updated_at);
        assert!(second.updated_at > first.updated_at);
        assert_eq!(second.title, "Sophie");
    }
}

#[test]
fn update_rejects_missing_song_and_unknown_band() {
    for (_dir, repo) in backends() {
        let err = repo
            .update_song(9_999, &SongPatch::default())
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(9_999)));

        let song = repo.get_all_songs().unwrap().remove(0);
        let err = repo
            .update_song(
                song.id,
                &SongPatch {
                    band: Some("Poppin'Party".to_string()),
                    title: Some("changed".to_string()),
                    ..SongPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, RepoError::UnknownBand(_)));
        assert_eq!(repo.get_song_by_id(song.id).unwrap(), Some(song));
    }
}

#[test]
fn update_can_move_song_to_another_existing_band() {
    for (_dir, repo) in backends() {
        let song = repo
            .create_song(&NewSong::new("Daylight", "Morfonica"))
            .unwrap();
        let moved = repo
            .update_song(
                song.id,
                &SongPatch {
                    band: Some("MyGO!!!!!".to_string()),
                    ..SongPatch::default()
                },
            )
            .unwrap();
        assert_eq!(moved.band, "MyGO!!!!!");
        assert!(repo
            .get_songs_by_band("MyGO!!!!!")
            .unwrap()
            .iter()
            .any(|s| s.id == song.id));
    }
}

#[test]
fn delete_then_fetch_is_not_found_and_second_delete_reports_not_found() {
    for (_dir, repo) in backends() {
        let song = repo
            .create_song(&NewSong::new("Killkiss", "Ave Mujica"))
            .unwrap();

        repo.delete_song(song.id).unwrap();
        assert!(repo.get_song_by_id(song.id).unwrap().is_none());

        let err = repo.delete_song(song.id).unwrap_err();
        assert!(matches!(err, RepoError::NotFound(id) if id == song.id));
    }
}

#[test]
fn songs_by_band_is_an_exact_match() {
    for (_dir, repo) in backends() {
        let songs = repo.get_songs_by_band("MyGO!!!!!").unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].title, "迷星叫");

        assert!(repo.get_songs_by_band("MyGO").unwrap().is_empty());
    }
}

#[test]
fn title_search_ranks_all_songs_best_match_first() {
    for (_dir, repo) in backends() {
        repo.create_song(&NewSong::new("迷路日々", "MyGO!!!!!"))
            .unwrap();

        let ranked = repo.search_songs_by_title("迷星叫").unwrap();
        assert_eq!(ranked.len(), 3, "no threshold means every song is returned");
        assert_eq!(ranked[0].title, "迷星叫");
        assert_eq!(ranked[1].title, "迷路日々");
        assert_eq!(ranked[2].title, "黑色生日");
    }
}

#[test]
fn title_search_ties_keep_id_order_on_every_backend() {
    let mut orders = Vec::new();
    for (_dir, repo) in backends() {
        repo.create_song(&NewSong::new("ETHER", "MyGO!!!!!")).unwrap();
        repo.create_song(&NewSong::new("Ether", "MyGO!!!!!")).unwrap();

        let titles = repo
            .search_songs_by_title("Ether")
            .unwrap()
            .into_iter()
            .map(|song| song.title)
            .collect::<Vec<_>>();
        let kind = repo.storage_kind();
        assert_eq!(titles[0], "ETHER", "backend {kind:?}");
        assert_eq!(titles[1], "Ether", "backend {kind:?}");
        orders.push(titles);
    }
    assert_eq!(orders[0], orders[1]);
}

#[test]
fn filter_values_are_treated_as_data() {
    for (_dir, repo) in backends() {
        let hostile = "MyGO!!!!!' OR '1'='1";
        assert!(repo.get_songs_by_band(hostile).unwrap().is_empty());
        assert!(repo.get_band_by_name(hostile).unwrap().is_none());
        assert_eq!(repo.get_all_songs().unwrap().len(), 2);
    }
}

#[test]
fn create_band_rejects_duplicates() {
    for (_dir, repo) in backends() {
        let band = repo
            .create_band(&NewBand::new("Roselia", "Gothic rock"))
            .unwrap();
        assert!(band.id > 3);
        assert!(repo.get_band_by_name("Roselia").unwrap().is_some());

        let err = repo.create_band(&NewBand::new("Roselia", "")).unwrap_err();
        assert!(matches!(err, RepoError::DuplicateBand(_)));
    }
}
