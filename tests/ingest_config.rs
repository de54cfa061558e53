// tests/ingest_config.rs
use startup_directory::ingest::config::{
    DirectoryConfig, ENV_CONFIG_PATH, ENV_DATA_DIR, ENV_PAGE_SIZE,
};
use std::path::PathBuf;
use std::{env, fs};

#[test]
fn parse_toml_and_json_paths() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("directory.toml");
    fs::write(
        &p_toml,
        r#"
data_dir = "lib"
sources = ["list2.csv", " list1.csv ", ""]
"#,
    )
    .unwrap();
    let v = DirectoryConfig::load_from(&p_toml).unwrap();
    assert_eq!(v.data_dir, PathBuf::from("lib"));
    assert_eq!(v.sources, vec!["list2.csv".to_string(), "list1.csv".to_string()]);
    assert_eq!(v.page_size, 10);

    let p_json = dir.path().join("directory.json");
    fs::write(&p_json, r#"{"page_size": 25}"#).unwrap();
    let vj = DirectoryConfig::load_from(&p_json).unwrap();
    assert_eq!(vj.page_size, 25);
    assert_eq!(vj.sources.len(), 4);
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the repo's own config/ is not picked up.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();

    env::remove_var(ENV_CONFIG_PATH);
    env::remove_var(ENV_DATA_DIR);
    env::remove_var(ENV_PAGE_SIZE);

    // 1) Nothing on disk -> defaults
    let v = DirectoryConfig::load_default().unwrap();
    assert_eq!(v, DirectoryConfig::default());

    // 2) Fallback TOML in ./config/
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(cfg_dir.join("directory.toml"), r#"sources = ["only.csv"]"#).unwrap();
    let vt = DirectoryConfig::load_default().unwrap();
    assert_eq!(vt.sources, vec!["only.csv".to_string()]);

    // 3) Env path wins over fallbacks
    let p_json = tmp.path().join("custom.json");
    fs::write(&p_json, r#"{"sources": ["x.csv"], "page_size": 5}"#).unwrap();
    env::set_var(ENV_CONFIG_PATH, p_json.display().to_string());
    let ve = DirectoryConfig::load_default().unwrap();
    assert_eq!(ve.sources, vec!["x.csv".to_string()]);
    assert_eq!(ve.page_size, 5);

    // 4) Env overrides on top; a zero page size is ignored
    env::set_var(ENV_DATA_DIR, "/srv/csv");
    env::set_var(ENV_PAGE_SIZE, "0");
    let vo = DirectoryConfig::load_default().unwrap();
    assert_eq!(vo.data_dir, PathBuf::from("/srv/csv"));
    assert_eq!(vo.page_size, 5);
    env::set_var(ENV_PAGE_SIZE, "12");
    assert_eq!(DirectoryConfig::load_default().unwrap().page_size, 12);

    // 5) Env path to a missing file is an error
    env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml"));
    assert!(DirectoryConfig::load_default().is_err());

    env::remove_var(ENV_CONFIG_PATH);
    env::remove_var(ENV_DATA_DIR);
    env::remove_var(ENV_PAGE_SIZE);
    env::set_current_dir(&old).unwrap();
}
