use std::{fs, thread::sleep, time::Duration};

use serial_test::serial;
use tempfile::tempdir;

#[test]
#[serial]
fn writes_log_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log.txt");

    sketch_calc::logging::init(true, Some(path.clone()));
    tracing::info!("surface ready");

    sleep(Duration::from_millis(100));

    assert!(path.exists(), "log file was not created");
    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("surface ready"));

    // Later initialisation attempts leave the installed subscriber alone.
    let other = dir.path().join("other.txt");
    sketch_calc::logging::init(false, None);
    assert!(!other.exists(), "log file should not be created");
}
