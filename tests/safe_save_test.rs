use equipcard::common::fs::SafeSaver;
use equipcard::ExportError;
use std::path::Path;

fn write_marker(path: &Path) -> Result<(), ExportError> {
    std::fs::write(path, b"document bytes").map_err(ExportError::from)
}

#[test]
fn happy_path_saves_to_the_requested_name() {
    let dir = tempfile::tempdir().expect("tempdir");
    let saver = SafeSaver::new(dir.path().join("exports"));

    let desired = dir.path().join("out/report.ods");
    let saved = saver.save(&desired, write_marker).expect("save");
    assert_eq!(saved, desired);
    assert!(saved.is_file());
}

#[test]
fn blocked_target_falls_back_to_an_incremented_sibling() {
    let dir = tempfile::tempdir().expect("tempdir");
    let saver = SafeSaver::new(dir.path().join("exports"));

    // A directory squatting on the target path makes the create fail the same
    // way a lock does.
    let desired = dir.path().join("report.ods");
    std::fs::create_dir_all(&desired).expect("squat");

    let saved = saver.save(&desired, write_marker).expect("save");
    assert_eq!(saved, dir.path().join("report(1).ods"));
    assert!(saved.is_file());
}

#[test]
fn occupied_suffixes_are_skipped() {
    let dir = tempfile::tempdir().expect("tempdir");
    let saver = SafeSaver::new(dir.path().join("exports"));

    let desired = dir.path().join("report.ods");
    std::fs::create_dir_all(&desired).expect("squat");
    std::fs::write(dir.path().join("report(1).ods"), b"taken").expect("occupy");

    let saved = saver.save(&desired, write_marker).expect("save");
    assert_eq!(saved, dir.path().join("report(2).ods"));
}

#[test]
fn unwritable_directory_falls_back_to_the_export_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let export_dir = dir.path().join("exports");
    let saver = SafeSaver::new(export_dir.clone());

    // The desired parent cannot be created because a file sits on its path, so
    // every sibling attempt fails too and the timestamped fallback kicks in.
    std::fs::write(dir.path().join("blocker"), b"file").expect("blocker");
    let desired = dir.path().join("blocker/deep/report.ods");

    let saved = saver.save(&desired, write_marker).expect("save");
    assert!(saved.starts_with(&export_dir));
    assert!(saved.is_file());
    let name = saved.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("report_"), "timestamped name, got {name}");
    assert!(name.ends_with(".ods"));
}
