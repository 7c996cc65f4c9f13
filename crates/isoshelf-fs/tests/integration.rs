use std::fs;

use isoshelf_fs::{PathLocks, StagedFile, is_staging_name, remove_file, sweep_staging};
use tempfile::tempdir;

fn listing(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_final_name_appears_only_after_commit() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("kali-linux-2024.1-live-amd64.iso");

    let staged = StagedFile::create_in(dir.path()).unwrap();
    fs::write(staged.path(), b"partial bytes").unwrap();

    let names = listing(dir.path());
    assert_eq!(names.len(), 1);
    assert!(is_staging_name(&names[0]));
    assert!(!dest.exists());

    staged.commit(&dest).unwrap();
    assert_eq!(listing(dir.path()), vec!["kali-linux-2024.1-live-amd64.iso"]);
}

#[test]
fn test_abandoned_stage_leaves_directory_unchanged() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("kali-linux-2023.4-live-amd64.iso"), b"old").unwrap();
    let before = listing(dir.path());

    {
        let staged = StagedFile::create_in(dir.path()).unwrap();
        fs::write(staged.path(), b"never verified").unwrap();
    }

    assert_eq!(listing(dir.path()), before);
}

#[test]
fn test_sweep_after_simulated_crash() {
    let dir = tempdir().unwrap();
    // A killed process leaves its staging file behind with no lock on it.
    let leftover = dir.path().join(".isoshelf-Xk2f9a.part");
    fs::write(&leftover, b"half an image").unwrap();
    let live = StagedFile::create_in(dir.path()).unwrap();

    let removed = sweep_staging(dir.path()).unwrap();
    assert_eq!(removed, vec![leftover.clone()]);
    assert!(!leftover.exists());
    assert!(live.path().exists());
    remove_file(&leftover).unwrap();
}

#[test]
fn test_locks_are_per_path() {
    let locks = PathLocks::new();
    let a = locks.try_lock("/library/a.iso").unwrap();
    assert_eq!(a.path(), std::path::Path::new("/library/a.iso"));
    assert!(locks.clone().try_lock("/library/a.iso").is_none());
    assert!(locks.try_lock("/library/b.iso").is_some());
}
