mod common;

use common::{monthly_csv, write_csv, TempTestDir};
use macropanel::train::{RMSE_ARIMA, RMSE_LINEAR_REGRESSION};
use macropanel::io::read_panel;
use macropanel::{differ, pipeline, Error, PipelineConfig, RunStatus};

fn write_fixture(dir: &TempTestDir) -> PipelineConfig {
    let raw = dir.join("raw");
    std::fs::create_dir_all(&raw).unwrap();
    write_csv(&raw, "inflation_data.csv", &monthly_csv(2018, 36, |i| {
        2.0 + 0.3 * i as f64 + ((i * 5) % 7) as f64 * 0.1
    }));
    write_csv(&raw, "interest_rate.csv", &monthly_csv(2018, 36, |i| {
        40.0 - 0.5 * i as f64 + ((i * 3) % 5) as f64 * 0.2
    }));
    // Spanish month abbreviations, comma separated, point decimals
    let mut ipmp = String::from("Período,IPMP (dic-01=100)\n");
    let months = ["ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic"];
    for year in 18..21 {
        for (m, token) in months.iter().enumerate() {
            ipmp.push_str(&format!("{}-{},{}\n", token, year, 100.0 + (year * 12 + m) as f64));
        }
    }
    write_csv(&raw, "IPMP.csv", &ipmp);

    let yaml = format!(
        r#"
data:
  raw_dir: {raw}
  processed_path: {processed}
training:
  target: Inflation
  test_size: 0.2
  seasonal: false
  m: 12
arima:
  max_p: 1
  max_d: 1
  max_q: 1
tracking:
  root: {runs}
  experiment_name: pipeline
datasets:
  - label: Inflation
    path: inflation_data.csv
    date_column: Fecha
    value_column: Valor
    date_format: "%d/%m/%Y"
  - label: Interest Rate
    path: interest_rate.csv
    date_column: Fecha
    value_column: Valor
  - label: General IPMP
    path: IPMP.csv
    date_column: Período
    value_column: IPMP (dic-01=100)
    separator: ","
    date_format: "%b-%y"
"#,
        raw = raw.display(),
        processed = dir.join("processed/combined.csv").display(),
        runs = dir.join("mlruns").display(),
    );
    PipelineConfig::from_yaml_str(&yaml).unwrap()
}

#[test]
fn test_end_to_end_run_is_recorded() {
    let dir = TempTestDir::new("pipeline_e2e").unwrap();
    let config = write_fixture(&dir);

    let combined = config
        .combiner()
        .unwrap()
        .build_and_persist(&config.data.processed_path)
        .unwrap();
    assert_eq!(combined.panel.nrows(), 36);
    assert_eq!(
        combined.panel.column_names(),
        &["Inflation", "Interest Rate", "General IPMP"]
    );
    assert_eq!(combined.reports[2].1.locale.as_deref(), Some("es"));

    let stationary = differ(&combined.panel).unwrap();
    let mut recorder = config.recorder();
    let run = config.trainer().unwrap().train(&stationary, &mut recorder).unwrap();

    let record = recorder.load_run(run.run_id()).unwrap();
    assert_eq!(record.status(), RunStatus::Finished);
    assert!(record.ended_at().is_some());

    for name in [RMSE_ARIMA, RMSE_LINEAR_REGRESSION] {
        let logged = recorder.load_metric(run.run_id(), name).unwrap();
        assert_eq!(logged, run.metric(name).unwrap());
    }

    let model = recorder.load_model(run.artifact_uri()).unwrap();
    assert_eq!(model.name(), run.selected_model());

    let artifacts = recorder.artifact_dir(run.artifact_uri()).unwrap();
    assert!(artifacts.join("signature.json").exists());
    assert!(artifacts.starts_with(dir.join("mlruns/pipeline")));
}

#[test]
fn test_train_persists_the_panel_it_trained_on() {
    let dir = TempTestDir::new("pipeline_train_persists").unwrap();
    let config = write_fixture(&dir);
    assert!(!config.data.processed_path.exists());

    let (combined, run) = pipeline::train(&config).unwrap();
    assert_eq!(combined.path, config.data.processed_path);
    assert!(combined.path.exists());
    assert_eq!(read_panel(&combined.path).unwrap(), combined.panel);

    let recorder = config.recorder();
    assert_eq!(recorder.load_run(run.run_id()).unwrap().status(), RunStatus::Finished);

    // a second invocation keeps the first file and writes a sibling
    let (features_panel, stationary) = pipeline::features(&config).unwrap();
    assert_ne!(features_panel.path, combined.path);
    assert!(features_panel.path.exists());
    assert_eq!(stationary.nrows(), combined.panel.nrows() - 1);
}

#[test]
fn test_failed_run_is_marked_failed_on_disk() {
    let dir = TempTestDir::new("pipeline_failed").unwrap();
    let config = write_fixture(&dir);

    let (panel, _) = config.combiner().unwrap().build().unwrap();
    // two months leave one differenced row, too few for any candidate
    let short = panel.slice_rows(0..2).unwrap();
    let stationary = differ(&short).unwrap();
    let mut recorder = config.recorder();

    let err = config.trainer().unwrap().train(&stationary, &mut recorder).unwrap_err();
    assert!(matches!(err, Error::NoViableModel { .. }));

    let runs: Vec<_> = std::fs::read_dir(recorder.experiment_dir())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(runs.len(), 1);
    assert_eq!(recorder.load_run(&runs[0]).unwrap().status(), RunStatus::Failed);
}

#[test]
fn test_config_file_round_trip() {
    let dir = TempTestDir::new("pipeline_config").unwrap();
    let path = write_csv(
        dir.path(),
        "dev.yaml",
        "training:\n  target: Inflation\n  test_size: 0.2\n  seasonal: true\n  m: 12\n",
    );
    let config = PipelineConfig::load(&path).unwrap();
    assert!(config.training.seasonal);
    assert_eq!(config.training.seasonal_period(), 12);

    assert!(matches!(
        PipelineConfig::load(dir.join("missing.yaml")),
        Err(Error::Config(_))
    ));
}
