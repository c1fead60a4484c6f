use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;
use transit_implied::transit_ecm::data::{PanelKind, Route, RouteTable};
use transit_implied::transit_ecm::synthetic::cointegrated_routes;
use transit_implied::transit_ecm::{AlignMode, ResidualMode};
use transit_implied::{run_pipeline, PipelineConfig, RouteSources};

/// Line 1 missing every seventh week, Line 3 missing every eleventh
fn gappy_sources(n: usize, seed: u64) -> RouteSources {
    let full = cointegrated_routes(n, seed).unwrap();
    let thin = |table: &RouteTable, every: usize| {
        let kept: Vec<_> = table
            .observations()
            .unwrap()
            .into_iter()
            .enumerate()
            .filter(|(i, _)| i % every != every - 1)
            .map(|(_, obs)| obs)
            .collect();
        RouteTable::from_observations(table.route(), &kept).unwrap()
    };
    RouteSources::new(thin(&full.line1, 7), thin(&full.line3, 11), full.line13)
}

#[test]
fn test_anchor_run_from_json_config() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"{{
            "align_mode": "anchor",
            "residual_mode": "sampled",
            "seed": 17,
            "forecast": {{ "n_test": 20 }}
        }}"#
    )
    .unwrap();

    let config = PipelineConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.align_mode, AlignMode::Anchor);
    assert_eq!(config.residual_mode, ResidualMode::Sampled);
    assert_eq!(config.forecast.n_test, 20);

    let sources = gappy_sources(154, 4);
    let first = run_pipeline(&sources, &config).unwrap();
    let second = run_pipeline(&sources, &config).unwrap();

    assert_eq!(first.imputed_rows, 22);
    assert_eq!(first.panel.len(), 140);
    assert_eq!(first.panel.kind(), PanelKind::Anchored);
    assert_eq!(first.panel.trend().first(), Some(&1));
    assert_eq!(first.panel.trend().last(), Some(&153));
    assert_eq!(first.key_metrics.n_observations, 140);
    assert_eq!(first.evaluation.records.len(), 17 * 4);
    assert_eq!(first.key_metrics, second.key_metrics);
}

#[test]
fn test_report_serializes() {
    let sources = cointegrated_routes(80, 8).unwrap();
    let report = run_pipeline(&sources, &PipelineConfig::default()).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert!(json["key_metrics"]["horizons"].is_array());
    assert_eq!(json["evaluation"]["records"].as_array().unwrap().len(), 92);
    assert_eq!(json["evaluation"]["metrics"][1]["model"], "Random Walk");
}

#[test]
fn test_missing_anchor_route_fails() {
    let full = cointegrated_routes(60, 2).unwrap();
    let sources = RouteSources::new(full.line1, full.line3, RouteTable::empty(Route::Line13).unwrap());
    let config = PipelineConfig {
        align_mode: AlignMode::Anchor,
        ..PipelineConfig::default()
    };

    assert!(run_pipeline(&sources, &config).is_err());
}
