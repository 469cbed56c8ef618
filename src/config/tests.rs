use super::*;
use figment::Jail;

fn load_in_jail(custom: Option<&Path>, overrides: &ConfigOverrides) -> figment::error::Result<ExtractConfig> {
    ExtractConfig::load(custom, overrides).map_err(|e| figment::Error::from(format!("{e:#}")))
}

#[test]
fn test_config_loads_defaults() {
    Jail::expect_with(|_jail| {
        let config = load_in_jail(None, &ConfigOverrides::default())?;

        assert_eq!(config.selector, "NDIMS");
        assert_eq!(
            config.roots,
            [
                PathBuf::from("src"),
                PathBuf::from("include"),
                PathBuf::from("initial_conditions/src"),
                PathBuf::from("initial_conditions/include"),
            ]
        );
        assert_eq!(config.include, ["*.c", "*.h"]);
        assert!(!config.use_gitignore);
        assert!(!config.follow_symlinks);
        assert_eq!(config.parallel, ParallelConfig::default());
        Ok(())
    });
}

#[test]
fn test_project_config_overrides_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "ndims-extract.toml",
            r#"
            selector = "DIM"
            roots = ["lib"]

            [parallel]
            mode = "sequential"
            "#,
        )?;

        let config = load_in_jail(None, &ConfigOverrides::default())?;
        assert_eq!(config.selector, "DIM");
        assert_eq!(config.roots, [PathBuf::from("lib")]);
        assert_eq!(config.include, ["*.c", "*.h"]);
        assert_eq!(config.parallel.mode, ExecutionMode::Sequential);
        assert_eq!(config.parallel.thread_percentage, 75);
        Ok(())
    });
}

#[test]
fn test_custom_config_by_extension() {
    Jail::expect_with(|jail| {
        jail.create_file("custom.json", r#"{ "include": ["*.cu"] }"#)?;
        jail.create_file("custom.yaml", "selector: NDIM\n")?;

        let json = load_in_jail(Some(Path::new("custom.json")), &ConfigOverrides::default())?;
        assert_eq!(json.include, ["*.cu"]);

        let yaml = load_in_jail(Some(Path::new("custom.yaml")), &ConfigOverrides::default())?;
        assert_eq!(yaml.selector, "NDIM");
        Ok(())
    });
}

#[test]
fn test_missing_custom_config_is_an_error() {
    Jail::expect_with(|_jail| {
        let result = ExtractConfig::load(Some(Path::new("nope.toml")), &ConfigOverrides::default());
        assert!(result.is_err());
        Ok(())
    });
}

#[test]
fn test_environment_and_cli_precedence() {
    Jail::expect_with(|jail| {
        jail.create_file("ndims-extract.toml", r#"selector = "FROM_FILE""#)?;
        jail.set_env("NDIMS_EXTRACT_SELECTOR", "FROM_ENV");
        jail.set_env("NDIMS_EXTRACT_PARALLEL__MAX_THREADS", "3");

        let config = load_in_jail(None, &ConfigOverrides::default())?;
        assert_eq!(config.selector, "FROM_ENV");
        assert_eq!(config.parallel.max_threads, 3);

        let overrides = ConfigOverrides {
            selector: Some("FROM_CLI".to_string()),
            roots: vec![PathBuf::from("only")],
            include: Vec::new(),
        };
        let config = load_in_jail(None, &overrides)?;
        assert_eq!(config.selector, "FROM_CLI");
        assert_eq!(config.roots, [PathBuf::from("only")]);
        assert_eq!(config.include, ["*.c", "*.h"]);
        Ok(())
    });
}

#[test]
fn test_validation_rejects_bad_values() {
    let base = ExtractConfig {
        selector: "NDIMS".to_string(),
        roots: vec![PathBuf::from("src")],
        include: vec!["*.c".to_string()],
        use_gitignore: false,
        follow_symlinks: false,
        parallel: ParallelConfig::default(),
    };
    assert!(base.validate().is_ok());

    let bad_selector = ExtractConfig { selector: "2D".to_string(), ..base.clone() };
    assert!(bad_selector.validate().is_err());

    let empty_selector = ExtractConfig { selector: String::new(), ..base.clone() };
    assert!(empty_selector.validate().is_err());

    let no_roots = ExtractConfig { roots: Vec::new(), ..base.clone() };
    assert!(no_roots.validate().is_err());

    let no_include = ExtractConfig { include: Vec::new(), ..base.clone() };
    assert!(no_include.validate().is_err());

    let mut bad_threads = base.clone();
    bad_threads.parallel.thread_percentage = 0;
    assert!(bad_threads.validate().is_err());
}
