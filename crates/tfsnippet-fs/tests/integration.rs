use std::io::Write;
use std::path::PathBuf;

use tempfile::tempdir;
use tfsnippet_fs::{
    DOWNLOADING_SUFFIX, EXTRACTING_SUFFIX, Result, StageState, StagedDir, StagedFile,
    discard_sentinel, iter_files, remove_dir_all_if_exists, sentinel_path,
};

#[test]
fn test_interrupted_download_is_redone() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("payload.zip");

    // A crash leaves the sentinel behind without the promoted file.
    std::fs::write(sentinel_path(&dest, DOWNLOADING_SUFFIX), b"trunc").unwrap();
    assert_eq!(StageState::probe(&dest, DOWNLOADING_SUFFIX), StageState::Staging);

    assert!(discard_sentinel(&dest, DOWNLOADING_SUFFIX).unwrap());
    let mut staged = StagedFile::create(&dest, DOWNLOADING_SUFFIX).unwrap();
    staged.write_all(b"complete payload").unwrap();
    staged.commit().unwrap();

    assert_eq!(StageState::probe(&dest, DOWNLOADING_SUFFIX), StageState::Complete);
    assert_eq!(std::fs::read(&dest).unwrap(), b"complete payload");
    assert!(!sentinel_path(&dest, DOWNLOADING_SUFFIX).exists());
}

#[test]
fn test_failed_extraction_leaves_nothing() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("payload");

    let outcome: std::result::Result<(), &str> = (|| {
        let staged = StagedDir::create(&dest, EXTRACTING_SUFFIX).map_err(|_| "create")?;
        std::fs::write(staged.path().join("half.txt"), "half").map_err(|_| "write")?;
        Err("archive ended early")
    })();

    assert!(outcome.is_err());
    assert_eq!(StageState::probe(&dest, EXTRACTING_SUFFIX), StageState::Absent);
}

#[test]
fn test_staged_tree_then_walk_then_purge() {
    let dir = tempdir().unwrap();
    let cache = dir.path().join("sub-dir");
    let dest = cache.join("payload");

    let staged = StagedDir::create(&dest, EXTRACTING_SUFFIX).unwrap();
    for name in ["a/1.txt", "b/2.txt", "c.txt"] {
        let path = staged.path().join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, name).unwrap();
    }
    staged.commit().unwrap();

    let mut files: Vec<PathBuf> = iter_files(&dest).collect::<Result<_>>().unwrap();
    files.sort();
    assert_eq!(
        files,
        vec![
            PathBuf::from("a/1.txt"),
            PathBuf::from("b/2.txt"),
            PathBuf::from("c.txt")
        ]
    );

    assert!(remove_dir_all_if_exists(&cache).unwrap());
    assert!(!cache.exists());
    assert!(!remove_dir_all_if_exists(&cache).unwrap());
}
