use std::fs;
use std::path::Path;
use std::sync::mpsc::channel;

use anyhow::Result;
use chrono::Local;
use click_labeler::collector::capture::ScreenSource;
use click_labeler::collector::keys::KeyInput;
use click_labeler::collector::messages::InputEvent;
use click_labeler::collector::{
    BoxSize, CaptureOutcome, ClassMap, DatasetLayout, Dispatcher, Orchestrator, ScaleFactor,
    Session,
};
use image::{Rgba, RgbaImage};
use tempfile::tempdir;

/// Physical 1440x900 frame, as a 2x display of 720x450 would report.
struct FakeScreen;

impl ScreenSource for FakeScreen {
    fn capture_primary(&mut self) -> Result<RgbaImage> {
        Ok(RgbaImage::from_pixel(1440, 900, Rgba([20, 40, 60, 255])))
    }
}

fn dispatcher(root: &Path, classes: ClassMap) -> Dispatcher<FakeScreen> {
    let layout = DatasetLayout::new(root);
    layout.ensure_dirs(&classes).unwrap();
    Dispatcher::new(
        classes,
        Session::new(BoxSize::new(40, 40)),
        Orchestrator::new(layout.clone(), ScaleFactor::default(), FakeScreen),
        layout.config_path(),
    )
}

fn key(ch: char) -> InputEvent {
    InputEvent::Key(KeyInput::Char(ch))
}

fn click(x: f64, y: f64) -> InputEvent {
    InputEvent::Click {
        x,
        y,
        at: Local::now(),
    }
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

#[test]
fn armed_click_writes_image_label_log_and_preview() {
    let dir = tempdir().unwrap();
    let mut dispatcher = dispatcher(dir.path(), ClassMap::new([('1', "boss_button")]));

    assert!(dispatcher.handle(key('1')).is_continue());
    assert!(dispatcher.handle(click(100.0, 200.0)).is_continue());

    let image = dir.path().join("images/boss_button/boss_button_000.png");
    let label = dir.path().join("labels/boss_button/boss_button_000.txt");
    assert!(image.is_file());
    assert_eq!(fs::read_to_string(&label).unwrap(), "1 200 400 720 450\n");
    assert_eq!(
        fs::read_to_string(dir.path().join("log/click_log.txt")).unwrap(),
        "1 200 400 720 450\n"
    );
    assert!(dir
        .path()
        .join("previews/boss_button_normal_preview_000.png")
        .is_file());

    let stored = image::open(&image).unwrap();
    assert_eq!((stored.width(), stored.height()), (720, 450));

    match dispatcher.last_outcome() {
        Some(CaptureOutcome::Committed {
            index, image_count, ..
        }) => {
            assert_eq!(*index, 0);
            assert_eq!(*image_count, 1);
        }
        other => panic!("expected committed capture, got {other:?}"),
    }
}

#[test]
fn consecutive_captures_allocate_dense_indices() {
    let dir = tempdir().unwrap();
    let mut dispatcher = dispatcher(dir.path(), ClassMap::default());
    assert!(dispatcher.handle(key('4')).is_continue());
    for i in 0..4 {
        assert!(dispatcher.handle(click(10.0 * f64::from(i), 10.0)).is_continue());
    }

    assert_eq!(
        files_in(&dir.path().join("labels/lvs")),
        ["lvs_000.txt", "lvs_001.txt", "lvs_002.txt", "lvs_003.txt"]
    );
    assert_eq!(
        files_in(&dir.path().join("images/lvs")),
        ["lvs_000.png", "lvs_001.png", "lvs_002.png", "lvs_003.png"]
    );
    let log = fs::read_to_string(dir.path().join("log/click_log.txt")).unwrap();
    assert_eq!(log.lines().count(), 4);
}

#[test]
fn deleted_index_is_not_reused() {
    let dir = tempdir().unwrap();
    let mut dispatcher = dispatcher(dir.path(), ClassMap::default());
    assert!(dispatcher.handle(key('2')).is_continue());
    for _ in 0..5 {
        assert!(dispatcher.handle(click(5.0, 5.0)).is_continue());
    }
    fs::remove_file(dir.path().join("labels/next_level/next_level_002.txt")).unwrap();
    fs::remove_file(dir.path().join("images/next_level/next_level_002.png")).unwrap();

    assert!(dispatcher.handle(click(5.0, 5.0)).is_continue());
    assert!(dir
        .path()
        .join("labels/next_level/next_level_005.txt")
        .is_file());
    assert!(!dir
        .path()
        .join("labels/next_level/next_level_002.txt")
        .exists());
}

#[test]
fn test_mode_clicks_only_produce_previews() {
    let dir = tempdir().unwrap();
    let previews = dir.path().join("previews");
    fs::create_dir_all(&previews).unwrap();
    fs::write(previews.join("stages_preview_000.png"), b"").unwrap();
    fs::write(previews.join("stages_preview_001.png"), b"").unwrap();

    let mut dispatcher = dispatcher(dir.path(), ClassMap::default());
    assert!(dispatcher.handle(key('5')).is_continue());
    assert!(dispatcher.handle(key('t')).is_continue());
    assert!(dispatcher.handle(click(30.0, 30.0)).is_continue());
    assert!(dispatcher.handle(click(60.0, 60.0)).is_continue());
    assert!(dispatcher.handle(key('t')).is_continue());

    assert!(files_in(&dir.path().join("labels/stages")).is_empty());
    assert!(files_in(&dir.path().join("images/stages")).is_empty());
    assert!(!dir.path().join("log/click_log.txt").exists());
    assert_eq!(
        files_in(&previews),
        [
            "stages_preview_000.png",
            "stages_preview_001.png",
            "stages_preview_002.png",
            "stages_preview_003.png"
        ]
    );
    assert!(dir.path().join("config.json").is_file());
}

#[test]
fn paused_session_ignores_clicks() {
    let dir = tempdir().unwrap();
    let mut dispatcher = dispatcher(dir.path(), ClassMap::default());
    assert!(dispatcher.handle(key('3')).is_continue());
    assert!(dispatcher.handle(key('p')).is_continue());
    assert!(dispatcher.handle(click(1.0, 1.0)).is_continue());
    assert!(files_in(&dir.path().join("labels/next_stage")).is_empty());

    assert!(dispatcher.handle(key('p')).is_continue());
    assert!(dispatcher.handle(click(1.0, 1.0)).is_continue());
    assert_eq!(
        files_in(&dir.path().join("labels/next_stage")),
        ["next_stage_000.txt"]
    );
}

#[test]
fn quit_after_click_leaves_complete_pair() {
    let dir = tempdir().unwrap();
    let dispatcher = dispatcher(dir.path(), ClassMap::default());
    let (tx, rx) = channel();
    tx.send(key('1')).unwrap();
    tx.send(click(50.0, 50.0)).unwrap();
    tx.send(key('q')).unwrap();
    tx.send(click(60.0, 60.0)).unwrap();

    dispatcher.spawn(rx).unwrap().join().unwrap();

    assert_eq!(
        files_in(&dir.path().join("labels/boss_button")),
        ["boss_button_000.txt"]
    );
    assert_eq!(
        files_in(&dir.path().join("images/boss_button")),
        ["boss_button_000.png"]
    );
}
