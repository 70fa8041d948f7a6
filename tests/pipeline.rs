use approx::assert_relative_eq;
use business_insights::error::{AnalyticsError, DataIssue};
use business_insights::insights::POSITIVE_STAFFING;
use business_insights::{
    loader, metrics, output, run_pipeline, FeatureFilter, PipelineConfig, Table,
};
use chrono::{Days, NaiveDate};

const HEADER: &str = "date,revenue,net_profit,cogs,operating_expense,marketing_cost,investment_cost,total_customers,orders,region,product_name,customer_id,employee_count,units_sold,new_customers_acquired";
const MESSY_HEADER: &str = " Date,Revenue,Net Profit,COGS,Operating Expense,Marketing Cost,Investment Cost,Total Customers,Orders,Region,Product Name,Customer ID,Employee Count,Units Sold,New Customers Acquired ";

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// One row per week from 2023-09-27 through 2023-12-13.
fn weekly_body() -> String {
    let start = d(2023, 9, 27);
    (0..12u64)
        .map(|k| {
            let date = start.checked_add_days(Days::new(7 * k)).unwrap();
            let region = if k % 2 == 0 { "North" } else { "South" };
            let product = if k % 3 == 0 { "Gadget" } else { "Widget" };
            format!(
                "{},{},{},300,100,50,500,40,10,{},{},C{},{},20,5\n",
                date,
                1000 + 10 * k,
                200 + 5 * k,
                region,
                product,
                k,
                10 + k
            )
        })
        .collect()
}

fn raw(header: &str, body: &str) -> Table {
    loader::read_csv_from(format!("{}\n{}", header, body).as_bytes()).unwrap()
}

#[test]
fn header_spelling_does_not_change_results() {
    let body = weekly_body();
    let config = PipelineConfig::default();
    let clean = run_pipeline(&raw(HEADER, &body), &config).unwrap();
    let messy = run_pipeline(&raw(MESSY_HEADER, &body), &config).unwrap();
    assert_eq!(clean.clean, messy.clean);
    assert_eq!(clean.features, messy.features);
    assert_eq!(clean.insights, messy.insights);
    assert_eq!(clean.forecasts[0].0, messy.forecasts[0].0);
}

#[test]
fn full_run_produces_insights_and_forecasts() {
    let out = run_pipeline(&raw(HEADER, &weekly_body()), &PipelineConfig::default()).unwrap();
    assert_eq!(out.report.total_rows, 12);
    assert_eq!(out.report.filtered_rows, 12);

    let insights = &out.insights;
    assert!(insights.cost_warning.is_none());
    assert_eq!(
        insights.top_month,
        "Top-performing month: November 2023 with revenue of 5,350.00"
    );
    assert_eq!(
        insights.loss_month,
        "Lowest-performing month: September 2023 with revenue of 1,000.00"
    );
    assert_eq!(
        insights.best_region,
        "Top performing region: South with total revenue of 6,360.00"
    );
    assert_eq!(insights.best_product, "Best-selling product: Widget with 160 units sold");
    assert_eq!(insights.avg_cac, "Average customer acquisition cost: 10.00");
    assert_eq!(insights.employee_profit, POSITIVE_STAFFING);

    assert_relative_eq!(out.kpis.total_revenue, 12_660.0);
    assert_eq!(out.forecasts.len(), 2);
    assert_eq!(out.forecasts[0].0.metric, "revenue");
    assert_eq!(out.forecasts[1].0.metric, "net_profit");
}

#[test]
fn forecast_spans_history_plus_horizon() {
    let out = run_pipeline(&raw(HEADER, &weekly_body()), &PipelineConfig::default()).unwrap();
    let (table, model) = &out.forecasts[0];
    assert_eq!(model.history().len(), 12);
    assert_eq!(table.len(), 12 + 26);
    assert_eq!(table.rows[0].date, d(2023, 10, 1));
    assert_eq!(table.rows[12].date, d(2023, 12, 24));
    assert_eq!(table.rows[37].date, d(2024, 6, 16));
    for row in &table.rows {
        assert!(row.yhat.is_finite());
        assert!(row.yhat_lower <= row.yhat && row.yhat <= row.yhat_upper);
    }
    assert!(table.future_dip(model.cutoff()).is_some());
}

#[test]
fn missing_cogs_is_schema_error() {
    let header = HEADER.replace(",cogs", "");
    let body = "2024-01-05,100,10,20,5,50,12,3,North,Widget,C1,4,2,1\n";
    let err = run_pipeline(&raw(&header, body), &PipelineConfig::default()).unwrap_err();
    assert!(err.is_input_error());
    match err {
        AnalyticsError::Schema { missing, .. } => assert_eq!(missing, vec!["cogs".to_string()]),
        other => panic!("expected schema error, got {:?}", other),
    }
}

#[test]
fn lone_invalid_date_is_data_error() {
    let body = "2024-13-45,100,10,40,20,5,50,12,3,North,Widget,C1,4,2,1\n";
    let err = run_pipeline(&raw(HEADER, body), &PipelineConfig::default()).unwrap_err();
    assert!(matches!(err, AnalyticsError::Data(DataIssue::EmptyAfterCleaning { .. })));
    assert!(err.is_input_error());
}

#[test]
fn single_week_cannot_be_forecast() {
    let body = "2023-12-04,100,10,40,20,5,50,12,3,North,Widget,C1,4,2,1\n\
                2023-12-05,120,12,40,20,5,50,12,3,South,Gadget,C2,5,3,1\n";
    let err = run_pipeline(&raw(HEADER, body), &PipelineConfig::default()).unwrap_err();
    assert!(matches!(err, AnalyticsError::Forecast(_)));
    assert!(!err.is_input_error());
}

#[test]
fn derived_metrics_on_two_rows() {
    let body = "2024-01-05,100,-10,40,30,5,50,12,3,North,Widget,C1,4,2,1\n\
                2024-01-06,200,20,200,30,5,50,12,3,North,Widget,C2,4,2,1\n";
    let clean = loader::validate(&raw(HEADER, body)).unwrap();
    let features = metrics::extract(&clean);
    let margin = features.profit_margin.as_ref().unwrap();
    assert_relative_eq!(margin[0], -10.0);
    assert_relative_eq!(margin[1], 10.0);
    assert_eq!(features.revenue_growth.as_ref().unwrap()[0], None);
    assert_relative_eq!(features.revenue_growth.as_ref().unwrap()[1].unwrap(), 100.0);
    assert_relative_eq!(features.profit_growth.as_ref().unwrap()[1].unwrap(), -300.0);
    let bep = features.bep.as_ref().unwrap();
    assert_relative_eq!(bep[0], 0.5);
    assert_eq!(bep[1], 0.0);
}

#[test]
fn high_cost_rows_raise_a_warning() {
    let body = "2024-01-05,100,10,60,20,5,50,12,3,North,Widget,C1,4,2,1\n\
                2024-01-06,100,10,10,10,5,50,12,3,North,Widget,C2,5,2,1\n";
    let clean = loader::validate(&raw(HEADER, body)).unwrap();
    let set = business_insights::generate_insights(&metrics::extract(&clean)).unwrap();
    assert_eq!(
        set.cost_warning.as_deref(),
        Some("High cost-to-revenue ratio in 1 records. Review cost control strategies.")
    );
}

#[test]
fn filtered_features_feed_insights() {
    let clean = loader::validate(&raw(HEADER, &weekly_body())).unwrap();
    let features = metrics::extract(&clean)
        .filter(&FeatureFilter {
            date_range: Some((d(2023, 12, 1), d(2023, 12, 31))),
            revenue_range: None,
        })
        .unwrap();
    assert_eq!(features.len(), 2);
    let set = business_insights::generate_insights(&features).unwrap();
    assert_eq!(
        set.top_month,
        "Top-performing month: December 2023 with revenue of 2,210.00"
    );
}

#[test]
fn cleaned_csv_round_trips() {
    let clean = loader::validate(&raw(MESSY_HEADER, &weekly_body())).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("processed").join("cleaned_data.csv");
    output::write_table_csv(&path, &clean).unwrap();
    let again = loader::validate(&loader::read_csv(&path).unwrap()).unwrap();
    assert_eq!(again.columns(), clean.columns());
    assert_eq!(again, clean);
}
