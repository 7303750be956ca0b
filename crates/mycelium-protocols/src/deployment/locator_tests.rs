use super::*;

#[test]
fn test_file_name() {
    assert_eq!(Locator::new("/opt/kernel/deploy/a.toml").file_name(), "a.toml");
    assert_eq!(Locator::new("a.toml").file_name(), "a.toml");
    assert_eq!(Locator::new("file:///opt/lib/").file_name(), "lib");
}

#[test]
fn test_sort_by_final_segment() {
    let mut locators = vec![
        Locator::new("/z/a.toml"),
        Locator::new("/a/c.toml"),
        Locator::new("/m/b.toml"),
    ];
    locators.sort();

    let names: Vec<_> = locators.iter().map(|l| l.file_name()).collect();
    assert_eq!(names, vec!["a.toml", "b.toml", "c.toml"]);
}

#[test]
fn test_sort_ties_broken_by_full_string() {
    let mut locators = vec![Locator::new("/system/a.toml"), Locator::new("/deploy/a.toml")];
    locators.sort();
    assert_eq!(locators[0].as_str(), "/deploy/a.toml");
}

#[test]
fn test_has_suffix() {
    let locator = Locator::new("deploy/datasource.toml");
    assert!(locator.has_suffix(".toml"));
    assert!(!locator.has_suffix(".xml"));
}

#[test]
fn test_to_path() {
    assert_eq!(
        Locator::new("file:///opt/unit.toml").to_path(),
        Some(PathBuf::from("/opt/unit.toml"))
    );
    assert_eq!(
        Locator::new("deploy/unit.toml").to_path(),
        Some(PathBuf::from("deploy/unit.toml"))
    );
    assert_eq!(Locator::new("http://host/unit.toml").to_path(), None);
}

#[test]
fn test_from_path_roundtrip() {
    let locator = Locator::from_path(Path::new("/tmp/x/y.toml"));
    assert_eq!(locator.to_string(), "/tmp/x/y.toml");
    assert_eq!(locator.to_path(), Some(PathBuf::from("/tmp/x/y.toml")));
}
