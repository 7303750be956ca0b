use super::*;

#[test]
fn test_parse_full_descriptor() {
    let descriptor = UnitDescriptor::parse(
        r#"
        [[bean]]
        name = "TransactionManager"

        [[bean]]
        name = "DataSource"
        depends = ["TransactionManager"]
        capabilities = ["Pool"]
        phased = true

        [bean.properties]
        url = "jdbc:h2:mem:test"
        max_size = 20
        "#,
    )
    .unwrap();

    assert_eq!(descriptor.beans.len(), 2);
    let ds = &descriptor.beans[1];
    assert_eq!(ds.depends, vec!["TransactionManager"]);
    assert_eq!(ds.capabilities, vec!["Pool"]);
    assert!(ds.phased);
    assert_eq!(
        ds.properties.get("max_size").and_then(|v| v.as_integer()),
        Some(20)
    );
    assert!(!descriptor.beans[0].phased);
}

#[test]
fn test_empty_descriptor() {
    let descriptor = UnitDescriptor::parse("").unwrap();
    assert!(descriptor.beans.is_empty());
}

#[test]
fn test_missing_name_is_parse_error() {
    let result = UnitDescriptor::parse("[[bean]]\nphased = true\n");
    assert!(matches!(result, Err(DescriptorError::Parse(_))));
}

#[test]
fn test_empty_name_rejected() {
    let result = UnitDescriptor::parse("[[bean]]\nname = \" \"\n");
    assert!(matches!(result, Err(DescriptorError::EmptyName { index: 0 })));
}

#[test]
fn test_duplicate_bean_rejected() {
    let result = UnitDescriptor::parse(
        r#"
        [[bean]]
        name = "A"
        [[bean]]
        name = "A"
        "#,
    );
    assert!(matches!(result, Err(DescriptorError::DuplicateBean(name)) if name == "A"));
}

#[test]
fn test_self_dependency_rejected() {
    let result = UnitDescriptor::parse("[[bean]]\nname = \"A\"\ndepends = [\"A\"]\n");
    assert!(matches!(result, Err(DescriptorError::SelfDependency(_))));
}
