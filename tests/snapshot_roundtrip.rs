//! Snapshot file round-trips through the public API.

use approx::assert_abs_diff_eq;
use gyro_inject::snapshot::{self, Snapshot};
use gyro_inject::{Error, Vector3};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_known_vector_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snap.xml");

    snapshot::write(&path, Vector3::new(1.0, 2.5, -3.25), 16384).unwrap();
    let snap = snapshot::read(&path).unwrap();

    assert_eq!(
        snap,
        Snapshot::new(Vector3::new(1.0, 2.5, -3.25), 16384)
    );
}

#[test]
fn test_round_trip_within_write_precision() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gyro_settings.xml");

    let samples = [
        (0.0, -0.0, 0.0, 0u16),
        (0.1234567, -9.8765432, 3.1415926535, 1),
        (1e-7, -4.9999995e-7, 123456.789, 65535),
        (-5.0, 1.9177, -0.4255, 16384),
        (1e9, -1e9, 42.000000499, 8080),
    ];

    for &(x, y, z, port) in &samples {
        snapshot::write(&path, Vector3::new(x, y, z), port).unwrap();
        let snap = snapshot::read(&path).unwrap();
        assert_abs_diff_eq!(snap.vector.x, x, epsilon = 1e-6);
        assert_abs_diff_eq!(snap.vector.y, y, epsilon = 1e-6);
        assert_abs_diff_eq!(snap.vector.z, z, epsilon = 1e-6);
        assert_eq!(snap.socket_port, port);
    }
}

#[test]
fn test_reads_document_from_other_writer() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gyro_settings.xml");
    fs::write(
        &path,
        r#"<?xml version='1.0' encoding='utf-8' standalone='yes' ?>
<map>
    <int name="socket_port" value="12345" />
    <float name="x" value="0.1" />
    <float name="y" value="-2.0E-4" />
    <float name="z" value="7" />
</map>
"#,
    )
    .unwrap();

    let snap = snapshot::read(&path).unwrap();
    assert_eq!(snap.vector, Vector3::new(0.1, -2.0e-4, 7.0));
    assert_eq!(snap.socket_port, 12345);
}

#[test]
fn test_failures_are_typed() {
    let dir = TempDir::new().unwrap();

    let missing = dir.path().join("missing.xml");
    assert!(matches!(
        snapshot::read(&missing),
        Err(Error::Storage { .. })
    ));

    let truncated = dir.path().join("truncated.xml");
    fs::write(&truncated, "<?xml version='1.0' ?>\n<map>\n    <float name=\"x\"").unwrap();
    let err = snapshot::read(&truncated).unwrap_err();
    assert!(matches!(err, Error::Parse { .. }));
    assert!(err.to_string().contains("truncated.xml"));

    let no_dir = dir.path().join("no").join("such").join("dir.xml");
    assert!(matches!(
        snapshot::write(&no_dir, Vector3::default(), 1),
        Err(Error::Storage { .. })
    ));
}
