use approx::assert_relative_eq;
use chrono::NaiveDate;
use transit_ecm::forecast::ForecastRecord;
use transit_ecm::metrics::{best_by_horizon, forecast_accuracy, horizon_metrics};
use transit_ecm::ModelKind;

fn record(horizon: usize, actual: f64, ecm: f64, random_walk: f64, arima: f64) -> ForecastRecord {
    let origin = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    ForecastRecord {
        origin,
        date: origin + chrono::Duration::weeks(horizon as i64),
        horizon,
        actual,
        ecm,
        random_walk,
        arima,
    }
}

#[test]
fn test_regression_metrics() {
    let actual = vec![10.0, 20.0, 30.0, 40.0, 50.0];
    let predicted = vec![12.0, 18.0, 33.0, 37.0, 52.0];

    let accuracy = forecast_accuracy(&predicted, &actual).unwrap();
    assert_relative_eq!(accuracy.mae, 2.4);
    assert_relative_eq!(accuracy.mse, 6.0);
    assert_relative_eq!(accuracy.rmse, 6.0f64.sqrt());
    assert!(accuracy.mape.unwrap() > 0.0 && accuracy.mape.unwrap() < 15.0);

    assert!(forecast_accuracy(&[1.0], &[1.0, 2.0]).is_err());
    assert!(forecast_accuracy(&[], &[]).is_err());
}

#[test]
fn test_horizon_metrics_per_model() {
    let records = vec![
        record(1, 10.0, 10.5, 11.0, 9.0),
        record(1, 12.0, 11.5, 11.0, 13.0),
        record(2, 10.0, 12.0, 10.0, 10.5),
    ];

    let metrics = horizon_metrics(&records).unwrap();
    assert_eq!(metrics.len(), 6);

    let models: Vec<(usize, ModelKind)> = metrics.iter().map(|m| (m.horizon, m.model)).collect();
    assert_eq!(
        models,
        vec![
            (1, ModelKind::Ecm),
            (1, ModelKind::RandomWalk),
            (1, ModelKind::Arima),
            (2, ModelKind::Ecm),
            (2, ModelKind::RandomWalk),
            (2, ModelKind::Arima),
        ]
    );
    assert_relative_eq!(metrics[0].rmse, 0.5);
    assert_relative_eq!(metrics[1].rmse, 1.0);
    assert_relative_eq!(metrics[2].mae, 1.0);
    assert_eq!(metrics[0].count, 2);
    assert_eq!(metrics[3].count, 1);

    let best = best_by_horizon(&metrics);
    assert_eq!(best.len(), 2);
    assert_eq!(best[0].model, ModelKind::Ecm);
    assert_eq!(best[1].model, ModelKind::RandomWalk);
    assert_relative_eq!(best[1].rmse, 0.0);
}
