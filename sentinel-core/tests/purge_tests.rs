use std::fs;

use sentinel_core::{purge_crash_logs, LocalFs};
use tempfile::TempDir;

#[test]
fn purge_empties_crash_dir_but_keeps_it() {
    let server = TempDir::new().expect("server dir");
    let crash_dir = server.path().join("crash-reports");
    fs::create_dir_all(&crash_dir).expect("mkdir");
    for n in 1..=3 {
        fs::write(crash_dir.join(format!("crash-{n}.txt")), b"stack").expect("write");
    }

    let removed = purge_crash_logs(&LocalFs, &crash_dir).expect("purge");

    assert_eq!(removed, 3);
    assert!(crash_dir.is_dir());
    assert_eq!(fs::read_dir(&crash_dir).expect("read").count(), 0);
}

#[test]
fn purge_of_missing_dir_succeeds() {
    let server = TempDir::new().expect("server dir");
    let removed =
        purge_crash_logs(&LocalFs, &server.path().join("crash-reports")).expect("purge");
    assert_eq!(removed, 0);
}

#[test]
fn purge_does_not_touch_siblings() {
    let server = TempDir::new().expect("server dir");
    let crash_dir = server.path().join("crash-reports");
    fs::create_dir_all(&crash_dir).expect("mkdir");
    fs::write(crash_dir.join("crash-1.txt"), b"stack").expect("write");
    fs::write(server.path().join("server.properties"), b"motd=hi").expect("write");

    purge_crash_logs(&LocalFs, &crash_dir).expect("purge");

    assert!(server.path().join("server.properties").is_file());
}
