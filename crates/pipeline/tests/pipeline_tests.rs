// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use arrow_array::{Array, Date32Array, Float64Array, Int32Array, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema};
use chrono::NaiveDate;
use datafusion::arrow::compute::cast;
use pipeline::schema::{self, DESTINATION_TABLE, REVENUE_TABLE, SPEND_TABLE};
use pipeline::{PipelineConfig, PipelineError, pivot, run, transform};
use std::sync::Arc;
use tempfile::{TempDir, tempdir};
use warehouse::{DataFrame, Session, WarehouseError, WriteMode};

/// One output row: (YEAR, MONTH, per-column values in schema order after MONTH)
type Row = (i32, i32, Vec<Option<f64>>);

fn days_since_epoch(date: &str) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch");
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("valid test date");
    day.signed_duration_since(epoch).num_days() as i32
}

fn spend_batch(rows: &[(&str, &str, f64)]) -> Result<RecordBatch> {
    Ok(RecordBatch::try_new(
        schema::spend_schema(),
        vec![
            Arc::new(Date32Array::from(
                rows.iter().map(|(d, _, _)| days_since_epoch(d)).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                rows.iter().map(|(_, c, _)| *c).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                rows.iter().map(|(_, _, v)| *v).collect::<Vec<_>>(),
            )),
        ],
    )?)
}

fn revenue_batch(rows: &[(i32, i32, f64)]) -> Result<RecordBatch> {
    Ok(RecordBatch::try_new(
        schema::revenue_schema(),
        vec![
            Arc::new(Int32Array::from(rows.iter().map(|r| r.0).collect::<Vec<_>>())),
            Arc::new(Int32Array::from(rows.iter().map(|r| r.1).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.2).collect::<Vec<_>>())),
        ],
    )?)
}

/// Warehouse seeded with the given spend and revenue rows
async fn seeded_warehouse(
    spend: &[(&str, &str, f64)],
    revenue: &[(i32, i32, f64)],
) -> Result<(TempDir, Session)> {
    let tmp = tempdir()?;
    let session = Session::open(tmp.path().join("warehouse")).await?;

    let frame = session.create_dataframe(schema::spend_schema(), vec![spend_batch(spend)?])?;
    session.write(frame).mode(WriteMode::Overwrite).save_as_table(SPEND_TABLE).await?;

    let frame = session.create_dataframe(schema::revenue_schema(), vec![revenue_batch(revenue)?])?;
    session.write(frame).mode(WriteMode::Overwrite).save_as_table(REVENUE_TABLE).await?;

    Ok((tmp, session))
}

fn column_names(frame: &DataFrame) -> Vec<String> {
    frame.schema().fields().iter().map(|f| f.name().clone()).collect()
}

/// Collect a (YEAR, MONTH, Float64...) frame into rows sorted by (YEAR, MONTH)
async fn collect_rows(frame: DataFrame) -> Result<Vec<Row>> {
    let batches = frame.collect().await?;
    let mut rows = Vec::new();
    for batch in &batches {
        let years = batch.column(0).as_any().downcast_ref::<Int32Array>().expect("YEAR is Int32");
        let months = batch.column(1).as_any().downcast_ref::<Int32Array>().expect("MONTH is Int32");
        let values: Vec<&Float64Array> = (2..batch.num_columns())
            .map(|i| batch.column(i).as_any().downcast_ref::<Float64Array>().expect("Float64 value"))
            .collect();
        for row in 0..batch.num_rows() {
            let cells = values
                .iter()
                .map(|col| if col.is_null(row) { None } else { Some(col.value(row)) })
                .collect();
            rows.push((years.value(row), months.value(row), cells));
        }
    }
    rows.sort_by_key(|(year, month, _)| (*year, *month));
    Ok(rows)
}

#[tokio::test]
async fn test_worked_example() -> Result<()> {
    let (_tmp, session) = seeded_warehouse(
        &[("2022-01-05", "search_engine", 100.0), ("2022-01-20", "social_media", 50.0)],
        &[(2022, 1, 1000.0)],
    )
    .await?;

    let output = run(&session, &PipelineConfig::default()).await?;

    let saved = session.table(DESTINATION_TABLE).await?;
    assert_eq!(
        column_names(&saved),
        vec!["YEAR", "MONTH", "SEARCH_ENGINE", "SOCIAL_MEDIA", "VIDEO", "EMAIL", "REVENUE"]
    );
    assert_eq!(
        collect_rows(saved).await?,
        vec![(2022, 1, vec![Some(100.0), Some(50.0), None, None, Some(1000.0)])]
    );

    // The returned lazy frame evaluates to the same rows
    assert_eq!(
        collect_rows(output.result).await?,
        vec![(2022, 1, vec![Some(100.0), Some(50.0), None, None, Some(1000.0)])]
    );

    let write = output.report.write.expect("pipeline writes");
    assert_eq!(write.rows, 1);
    assert_eq!(write.table.as_str(), DESTINATION_TABLE);

    Ok(())
}

#[tokio::test]
async fn test_spend_per_month_has_one_row_per_month() -> Result<()> {
    let (_tmp, session) = seeded_warehouse(
        &[
            ("2022-01-01", "search_engine", 10.0),
            ("2022-01-02", "search_engine", 15.0),
            ("2022-01-03", "video", 7.5),
            ("2022-01-31", "email", 1.0),
            ("2022-02-01", "social_media", 3.0),
            ("2022-02-14", "social_media", 4.0),
            ("2023-01-10", "video", 2.0),
        ],
        &[(2022, 1, 1.0)],
    )
    .await?;

    let frames = pipeline::build(&session, &PipelineConfig::default()).await?;
    assert_eq!(
        column_names(&frames.spend_per_month),
        vec!["YEAR", "MONTH", "SEARCH_ENGINE", "SOCIAL_MEDIA", "VIDEO", "EMAIL"]
    );
    assert_eq!(
        collect_rows(frames.spend_per_month.clone()).await?,
        vec![
            (2022, 1, vec![Some(25.0), None, Some(7.5), Some(1.0)]),
            (2022, 2, vec![None, Some(7.0), None, None]),
            (2023, 1, vec![None, None, Some(2.0), None]),
        ]
    );

    Ok(())
}

#[tokio::test]
async fn test_spend_per_channel_totals() -> Result<()> {
    let (_tmp, session) = seeded_warehouse(
        &[
            ("2022-03-01", "video", 1.0),
            ("2022-03-02", "video", 2.0),
            ("2022-03-02", "email", 5.0),
        ],
        &[(2022, 3, 1.0)],
    )
    .await?;

    let spend = session.table(SPEND_TABLE).await?;
    let per_channel = transform::spend_per_channel(spend)?;
    assert_eq!(column_names(&per_channel), vec!["YEAR", "MONTH", "CHANNEL", "TOTAL_COST"]);

    let batches = per_channel.collect().await?;
    let mut rows = Vec::new();
    for batch in &batches {
        // Delta scans may surface strings as views; normalize to Utf8
        let channels = cast(batch.column(2), &DataType::Utf8)?;
        let channels = channels.as_any().downcast_ref::<StringArray>().expect("CHANNEL is a string");
        let costs = batch.column(3).as_any().downcast_ref::<Float64Array>().expect("TOTAL_COST");
        for i in 0..batch.num_rows() {
            rows.push((channels.value(i).to_string(), costs.value(i)));
        }
    }
    rows.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(rows, vec![("email".to_string(), 5.0), ("video".to_string(), 3.0)]);

    Ok(())
}

#[tokio::test]
async fn test_join_keeps_only_months_in_both_inputs() -> Result<()> {
    let (_tmp, session) = seeded_warehouse(
        &[
            ("2022-01-15", "email", 1.0),
            ("2022-02-15", "email", 2.0),
            ("2022-03-15", "email", 3.0),
        ],
        &[(2022, 2, 20.0), (2022, 3, 30.0), (2022, 4, 40.0)],
    )
    .await?;

    run(&session, &PipelineConfig::default()).await?;
    let rows = collect_rows(session.table(DESTINATION_TABLE).await?).await?;

    let months: Vec<(i32, i32)> = rows.iter().map(|(y, m, _)| (*y, *m)).collect();
    assert_eq!(months, vec![(2022, 2), (2022, 3)]);
    assert_eq!(rows[0].2, vec![None, None, None, Some(2.0), Some(20.0)]);

    Ok(())
}

#[tokio::test]
async fn test_revenue_is_summed_per_month() -> Result<()> {
    let (_tmp, session) = seeded_warehouse(
        &[("2021-12-01", "video", 1.0)],
        &[(2021, 12, 100.0), (2021, 12, 50.0), (2022, 1, 10.0)],
    )
    .await?;

    let revenue = transform::revenue_per_month(session.table(REVENUE_TABLE).await?)?;
    assert_eq!(column_names(&revenue), vec!["YEAR", "MONTH", "REVENUE"]);
    assert_eq!(
        collect_rows(revenue).await?,
        vec![(2021, 12, vec![Some(150.0)]), (2022, 1, vec![Some(10.0)])]
    );

    Ok(())
}

#[tokio::test]
async fn test_rerun_is_idempotent() -> Result<()> {
    let (_tmp, session) = seeded_warehouse(
        &[
            ("2022-01-05", "search_engine", 100.0),
            ("2022-02-05", "video", 30.0),
        ],
        &[(2022, 1, 1000.0), (2022, 2, 900.0)],
    )
    .await?;

    let config = PipelineConfig::default();
    let first = run(&session, &config).await?;
    let after_first = collect_rows(session.table(DESTINATION_TABLE).await?).await?;

    let second = run(&session, &config).await?;
    let after_second = collect_rows(session.table(DESTINATION_TABLE).await?).await?;

    assert_eq!(after_first, after_second);
    assert_eq!(after_second.len(), 2);

    let first_version = first.report.write.expect("write").version;
    let second_version = second.report.write.expect("write").version;
    assert_eq!(second_version, first_version + 1);

    Ok(())
}

#[tokio::test]
async fn test_unlisted_channels_are_ignored() -> Result<()> {
    let (_tmp, session) = seeded_warehouse(
        &[("2022-01-05", "video", 5.0), ("2022-01-06", "radio", 500.0)],
        &[(2022, 1, 1.0)],
    )
    .await?;

    let frames = pipeline::build(&session, &PipelineConfig::default()).await?;
    assert!(!column_names(&frames.spend_per_month).iter().any(|c| c == "RADIO"));
    assert_eq!(
        collect_rows(frames.spend_per_month.clone()).await?,
        vec![(2022, 1, vec![None, None, Some(5.0), None])]
    );

    Ok(())
}

#[tokio::test]
async fn test_custom_channels_and_destination() -> Result<()> {
    let (_tmp, session) = seeded_warehouse(
        &[("2022-01-05", "video", 5.0), ("2022-01-06", "email", 6.0)],
        &[(2022, 1, 1.0)],
    )
    .await?;

    let config = PipelineConfig::from_yaml_str(
        "channels: [email, video]\ndestination_table: monthly_summary\nexplain: false\n",
    )?;
    let output = run(&session, &config).await?;
    assert!(output.report.plan.is_none());

    let saved = session.table("MONTHLY_SUMMARY").await?;
    assert_eq!(column_names(&saved), vec!["YEAR", "MONTH", "EMAIL", "VIDEO", "REVENUE"]);
    assert_eq!(
        collect_rows(saved).await?,
        vec![(2022, 1, vec![Some(6.0), Some(5.0), Some(1.0)])]
    );
    assert!(!session.table_exists(DESTINATION_TABLE)?);

    Ok(())
}

#[tokio::test]
async fn test_report_lists_stages_and_plan() -> Result<()> {
    let (_tmp, session) = seeded_warehouse(
        &[("2022-01-05", "search_engine", 100.0)],
        &[(2022, 1, 1000.0)],
    )
    .await?;

    let output = run(&session, &PipelineConfig::default()).await?;
    let titles: Vec<&str> = output.report.stages.iter().map(|s| s.title).collect();
    assert_eq!(
        titles,
        vec![
            pipeline::run::SPEND_PER_CHANNEL_TITLE,
            pipeline::run::SPEND_PER_MONTH_TITLE,
            pipeline::run::REVENUE_PER_MONTH_TITLE,
            pipeline::run::SPEND_AND_REVENUE_TITLE,
        ]
    );
    assert!(output.report.stages[1].preview.contains("SEARCH_ENGINE"));

    let plan = output.report.plan.as_deref().expect("explain is on by default");
    assert!(plan.contains("logical_plan"));

    let rendered = output.report.to_string();
    assert!(rendered.contains("Total Spend Across All Channels"));
    assert!(rendered.contains("Query plan"));
    assert!(rendered.contains("Wrote 1 rows to SPEND_AND_REVENUE_PER_MONTH"));

    Ok(())
}

#[tokio::test]
async fn test_missing_source_table() -> Result<()> {
    let tmp = tempdir()?;
    let session = Session::open(tmp.path()).await?;

    let err = run(&session, &PipelineConfig::default()).await.err().expect("no tables");
    assert!(matches!(
        err,
        PipelineError::Warehouse(WarehouseError::TableNotFound { ref name }) if name == "CAMPAIGN_SPEND"
    ));

    Ok(())
}

#[tokio::test]
async fn test_schema_mismatch_names_missing_columns() -> Result<()> {
    let (_tmp, session) = seeded_warehouse(&[("2022-01-05", "video", 5.0)], &[(2022, 1, 1.0)]).await?;

    // Replace revenue with a table lacking REVENUE
    let wrong = session.table(SPEND_TABLE).await?;
    session.write(wrong).mode(WriteMode::Overwrite).save_as_table(REVENUE_TABLE).await?;

    let err = pipeline::build(&session, &PipelineConfig::default()).await.err().expect("mismatch");
    match err {
        PipelineError::SchemaMismatch {
            table,
            missing,
            mismatched,
        } => {
            assert_eq!(table, REVENUE_TABLE);
            assert_eq!(missing, vec!["YEAR", "MONTH", "REVENUE"]);
            assert!(mismatched.is_empty());
        }
        other => panic!("unexpected error: {other}"),
    }

    Ok(())
}

#[tokio::test]
async fn test_schema_mismatch_names_mistyped_columns() -> Result<()> {
    let (_tmp, session) = seeded_warehouse(&[("2022-01-05", "video", 5.0)], &[(2022, 1, 1.0)]).await?;

    // Dates stored as text
    let text_dates = Arc::new(Schema::new(vec![
        Field::new("DATE", DataType::Utf8, false),
        Field::new("CHANNEL", DataType::Utf8, false),
        Field::new("TOTAL_COST", DataType::Float64, true),
    ]));
    let batch = RecordBatch::try_new(
        text_dates.clone(),
        vec![
            Arc::new(StringArray::from(vec!["2022-01-05"])),
            Arc::new(StringArray::from(vec!["video"])),
            Arc::new(Float64Array::from(vec![5.0])),
        ],
    )?;
    let frame = session.create_dataframe(text_dates, vec![batch])?;
    session.write(frame).mode(WriteMode::Overwrite).save_as_table(SPEND_TABLE).await?;

    let err = pipeline::build(&session, &PipelineConfig::default()).await.err().expect("mismatch");
    match err {
        PipelineError::SchemaMismatch {
            table,
            missing,
            mismatched,
        } => {
            assert_eq!(table, SPEND_TABLE);
            assert!(missing.is_empty());
            assert_eq!(mismatched.len(), 1);
            assert!(mismatched[0].starts_with("DATE (expected Date32"), "{mismatched:?}");
        }
        other => panic!("unexpected error: {other}"),
    }

    Ok(())
}

#[tokio::test]
async fn test_pivot_argument_errors() -> Result<()> {
    let (_tmp, session) = seeded_warehouse(&[("2022-01-05", "video", 5.0)], &[(2022, 1, 1.0)]).await?;
    let per_channel = transform::spend_per_channel(session.table(SPEND_TABLE).await?)?;

    let empty = pivot::pivot(per_channel.clone(), &["YEAR", "MONTH"], "CHANNEL", &[], "TOTAL_COST");
    assert!(matches!(empty, Err(PipelineError::InvalidPivot(_))));

    let dup = vec!["video".to_string(), "video".to_string()];
    let duplicated = pivot::pivot(per_channel.clone(), &["YEAR", "MONTH"], "CHANNEL", &dup, "TOTAL_COST");
    assert!(matches!(duplicated, Err(PipelineError::InvalidPivot(_))));

    let clash = vec!["YEAR".to_string()];
    let collides = pivot::pivot(per_channel, &["YEAR", "MONTH"], "CHANNEL", &clash, "TOTAL_COST");
    assert!(matches!(collides, Err(PipelineError::InvalidPivot(_))));

    Ok(())
}

#[tokio::test]
async fn test_empty_sources_write_empty_destination() -> Result<()> {
    let (_tmp, session) = seeded_warehouse(&[], &[]).await?;

    let output = run(&session, &PipelineConfig::default()).await?;
    assert_eq!(output.report.write.expect("write").rows, 0);

    let saved = session.table(DESTINATION_TABLE).await?;
    assert_eq!(column_names(&saved).len(), 7);
    assert!(collect_rows(saved).await?.is_empty());

    Ok(())
}
