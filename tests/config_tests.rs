use skelflow::config::{RuntimeConfig, DEFAULT_CHANNEL_CAPACITY};
use skelflow::nodes::{Collect, IterSource};
use skelflow::{NodeSpec, Pipeline};

#[test]
fn test_document_with_pipeline_config() {
    let document = serde_json::json!({
        "pipeline_config": {
            "channel_capacity": 3,
            "thread_name_prefix": "parity"
        },
        "nodes": []
    });

    let config = RuntimeConfig::from_json(&document).unwrap();
    assert_eq!(config.channel_capacity, 3);
    assert_eq!(config.thread_name_prefix, "parity");
}

#[test]
fn test_missing_fields_keep_defaults() {
    let config = RuntimeConfig::from_json_str("{}").unwrap();
    assert_eq!(config, RuntimeConfig::default());
    assert_eq!(config.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
}

#[test]
fn test_invalid_document_is_rejected() {
    assert!(RuntimeConfig::from_json_str("not json").is_err());
    assert!(RuntimeConfig::from_json_str(r#"{"channel_capacity": "large"}"#).is_err());
}

#[test]
fn test_topology_keeps_its_config() {
    let config = RuntimeConfig::from_json_str(r#"{"channel_capacity": 1}"#).unwrap();
    let (collect, items) = Collect::shared();

    let mut topology = Pipeline::new()
        .add_stage(NodeSpec::siso("numbers", IterSource::new(|| 0..25u8)))
        .add_stage(NodeSpec::siso("collect", collect))
        .build(&config)
        .unwrap();

    assert_eq!(topology.config(), &config);
    topology.run_and_wait_end().unwrap();
    assert_eq!(items.lock().unwrap().len(), 25);
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    std::io::Write::write_all(
        &mut file,
        br#"{"pipeline_config": {"channel_capacity": 8}}"#,
    )
    .unwrap();

    let config = RuntimeConfig::from_file(file.path()).unwrap();
    assert_eq!(config.channel_capacity, 8);

    let missing = RuntimeConfig::from_file(file.path().with_extension("missing"));
    assert!(matches!(missing, Err(skelflow::errors::ConfigError::Io(_))));
}

#[test]
fn test_nul_bytes_in_thread_names_do_not_abort_the_run() {
    let config = RuntimeConfig::from_json_str(r#"{"thread_name_prefix": "sk\u0000elflow"}"#).unwrap();
    let (collect, items) = Collect::shared();

    let mut topology = Pipeline::new()
        .add_stage(NodeSpec::siso("num\0bers", IterSource::new(|| 0..3u8)))
        .add_stage(NodeSpec::siso("collect", collect))
        .build(&config)
        .unwrap();

    let report = topology.run_and_wait_end().unwrap();
    assert!(report.all_terminated());
    assert_eq!(*items.lock().unwrap(), vec![0, 1, 2]);
}
