use serial_test::serial;

mod helpers;
use helpers as h;

use koinos_reference::{Depth, Library, RangeSet, ReferenceManager, ReferenceSettings, TagCloudEntry};

fn previous(m: &ReferenceManager, query: &str) -> Option<String> {
    let r = h::reference(m, query);
    m.previous_chapter_reference(&r)
        .unwrap()
        .map(|p| m.handle(&p).unwrap())
}

fn next(m: &ReferenceManager, query: &str) -> Option<String> {
    let r = h::reference(m, query);
    m.next_chapter_reference(&r)
        .unwrap()
        .map(|n| m.handle(&n).unwrap())
}

#[test]
fn test_chapter_reference() {
    h::test_setup();
    let m = h::big_small_manager();

    let chapter = m.chapter_reference(&h::reference(&m, "big+2.5-9;4.1")).unwrap();
    assert_eq!(m.handle(&chapter).unwrap(), "big+2");

    let chapter = m.chapter_reference(&h::reference(&m, "big")).unwrap();
    assert_eq!(m.title(&chapter).unwrap(), "Big Book 1");
}

#[test]
fn test_previous_and_next_chapter() {
    h::test_setup();
    let m = h::big_small_manager();

    assert_eq!(previous(&m, "big+10").as_deref(), Some("big+9"));
    assert_eq!(previous(&m, "big+10.5").as_deref(), Some("big+9"));
    assert_eq!(next(&m, "big+10").as_deref(), Some("big+11"));

    assert_eq!(previous(&m, "small").as_deref(), Some("big+21"));
    assert_eq!(next(&m, "big+21").as_deref(), Some("small"));

    // wraps around within the library
    assert_eq!(previous(&m, "big+1").as_deref(), Some("small"));
    assert_eq!(next(&m, "small+7").as_deref(), Some("big+1"));
}

#[test]
fn test_navigation_without_wrapping() {
    h::test_setup();
    let settings = ReferenceSettings {
        wrap_navigation: false,
        ..Default::default()
    };
    let m = h::big_small_manager_with(settings);

    assert_eq!(previous(&m, "big+1"), None);
    assert_eq!(next(&m, "small"), None);
    assert_eq!(previous(&m, "small").as_deref(), Some("big+21"));
}

#[test]
fn test_navigation_stays_in_the_library() {
    h::test_setup();
    let m = h::nt_manager();

    assert_eq!(next(&m, "matt+28").as_deref(), Some("rom+1"));
    assert_eq!(previous(&m, "rom+1").as_deref(), Some("matt+28"));
    assert_eq!(next(&m, "phm").as_deref(), Some("2jn"));
    assert_eq!(next(&m, "rev+22").as_deref(), Some("matt+1"));

    // Canticum is alone in its library
    assert_eq!(next(&m, "cant+8").as_deref(), Some("cant+1"));
    assert_eq!(previous(&m, "cant+1").as_deref(), Some("cant+8"));
}

#[test]
fn test_chapter_handle_grid() {
    h::test_setup();
    let m = h::big_small_manager();
    let r = h::reference(&m, "big+2.5");

    let grid = m.chapter_handle_grid(&r, None).unwrap();
    let row_lengths: Vec<usize> = grid.iter().map(Vec::len).collect();
    assert_eq!(row_lengths, vec![10, 10, 1]);
    assert_eq!(grid[0][0], "big+1");
    assert_eq!(grid[1][9], "big+20");
    assert_eq!(grid[2][0], "big+21");

    let grid = m.chapter_handle_grid(&r, Some(7)).unwrap();
    assert_eq!(grid.len(), 3);
    assert!(grid.iter().all(|row| row.len() == 7));

    let grid = m.chapter_handle_grid(&h::reference(&m, "small+3"), None).unwrap();
    assert_eq!(grid, vec![vec!["small".to_string()]]);

    assert!(m.chapter_handle_grid(&RangeSet::new(), None).is_err());
}

#[test]
fn test_tag_cloud_weights() {
    h::test_setup();
    let m = h::nt_manager();
    let cloud = m.tag_cloud_for_navigation(5).unwrap();

    assert_eq!(cloud.keys().collect::<Vec<_>>(), vec!["lxx", "nt"]);

    // Matthew has the most chapters, 28, so each step is 5.6 chapters
    let nt: Vec<(&str, u32)> = cloud["nt"]
        .iter()
        .map(|e| (e.handle.as_str(), e.weight))
        .collect();
    assert_eq!(
        nt,
        vec![
            ("matt+1", 5),
            ("rom+1", 3),
            ("1cor+1", 3),
            ("gal+1", 2),
            ("phm", 1),
            ("2jn", 1),
            ("3jn", 1),
            ("rev+1", 4),
        ]
    );
    assert_eq!(cloud["nt"][2].title, "1 Cor");

    assert_eq!(
        cloud["lxx"],
        vec![TagCloudEntry {
            handle: "cant+1".to_string(),
            title: "Cant".to_string(),
            weight: 5,
        }]
    );

    let value = serde_json::to_value(&cloud["lxx"][0]).unwrap();
    assert_eq!(value["weight"], 5);
}

#[test]
fn test_tag_cloud_ignores_long_books_for_scale() {
    h::test_setup();
    let library = Library::new([
        h::descriptor(1, "ot", "Genesis", "Gen", "gen", Depth::ChapterVerse, &[], 50),
        h::descriptor(8, "ot", "Ruth", "Ruth", "ruth", Depth::ChapterVerse, &[], 4),
        h::descriptor(19, "ot", "Psalms", "Ps", "ps", Depth::ChapterVerse, &[], 150),
    ])
    .unwrap();
    let m = ReferenceManager::new(library);

    let weights: Vec<u32> = m.tag_cloud_for_navigation(5).unwrap()["ot"]
        .iter()
        .map(|e| e.weight)
        .collect();
    assert_eq!(weights, vec![5, 1, 5]);

    let weights: Vec<u32> = m.tag_cloud_for_navigation(10).unwrap()["ot"]
        .iter()
        .map(|e| e.weight)
        .collect();
    assert_eq!(weights, vec![10, 1, 10]);
}

#[test]
#[serial]
fn test_grid_width_from_env() {
    h::test_setup();
    unsafe { std::env::set_var("KOINOS_CHAPTER_GRID_WIDTH", "5"); }
    let settings = ReferenceSettings::from_env().unwrap();
    unsafe { std::env::remove_var("KOINOS_CHAPTER_GRID_WIDTH"); }

    let m = h::big_small_manager_with(settings);
    let grid = m.chapter_handle_grid(&h::reference(&m, "big+2"), None).unwrap();
    assert_eq!(grid.len(), 5);
}
