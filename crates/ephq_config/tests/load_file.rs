use std::io::Write;

use ephq_config::{ConfigError, EphqConfig};
use ephq_core::{DataSource, GeoLocation};

#[test]
fn load_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "ephe_path = \"/opt/ephe\"\n[observer]\nlongitude_deg = 2.35\nlatitude_deg = 48.85"
    )
    .unwrap();

    let c = EphqConfig::load(file.path()).unwrap();
    assert_eq!(c.data_source(), DataSource::Bundled("/opt/ephe".into()));
    assert_eq!(c.observer(), Some(GeoLocation::new(2.35, 48.85, 0.0)));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = EphqConfig::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn malformed_file_is_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[observer\nlatitude_deg = ").unwrap();
    let err = EphqConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}
