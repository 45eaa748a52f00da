//! Integration tests for the chunked, retrying ingestion reader.

use std::fs;
use std::path::PathBuf;
use timeseries_inventory::config::{ConfigDocument, OnExhausted, resolve_data_ingestion};
use timeseries_inventory::ingestion::{DataBatch, IngestionReader};
use timeseries_inventory::testing::*;
use timeseries_inventory::{Error, NotFound};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn read_all<S: timeseries_inventory::RowSource>(
    reader: &IngestionReader<S>,
) -> timeseries_inventory::Result<Vec<DataBatch>> {
    reader.stream().collect()
}

fn lens(batches: &[DataBatch]) -> Vec<usize> {
    batches.iter().map(DataBatch::len).collect()
}

/// Three files `a.csv`, `b.csv`, `c.csv` with 30 rows each, plus the order the reader
/// will visit them in.
fn three_files(dir: &TempDirPath) -> anyhow::Result<Vec<PathBuf>> {
    for name in ["a.csv", "b.csv", "c.csv"] {
        write_rows_csv(dir.file_path(name), 30)?;
    }
    let config = ingestion_config(dir.path(), "*.csv", 10, 20, 1);
    Ok(IngestionReader::new(&config)?.files().to_vec())
}

#[test]
fn test_chunks_follow_chunksize() -> anyhow::Result<()> {
    init_tracing();
    let dir = TempDirPath::new()?;
    write_rows_csv(dir.file_path("sales.csv"), 250)?;

    let config = ingestion_config(dir.path(), "*.csv", 10, 100, 1);
    let reader = IngestionReader::new(&config)?;
    let batches = read_all(&reader)?;

    assert_eq!(lens(&batches), [100, 100, 50]);
    assert_eq!(batches.iter().map(DataBatch::index).collect::<Vec<_>>(), [0, 1, 2]);
    assert_eq!(collect_ids(&batches), (0..250).collect::<Vec<_>>());
    for b in &batches {
        assert_eq!(b.headers().iter().collect::<Vec<_>>(), ["id", "value"]);
        assert_eq!(b.source(), dir.file_path("sales.csv"));
    }
    Ok(())
}

#[test]
fn test_exact_multiple_has_no_empty_batch() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    write_rows_csv(dir.file_path("sales.csv"), 200)?;
    let reader = IngestionReader::new(&ingestion_config(dir.path(), "*.csv", 10, 100, 1))?;
    assert_eq!(lens(&read_all(&reader)?), [100, 100]);
    Ok(())
}

#[test]
fn test_header_only_file_yields_nothing() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    write_rows_csv(dir.file_path("empty.csv"), 0)?;
    write_rows_csv(dir.file_path("full.csv"), 5)?;
    let reader = IngestionReader::new(&ingestion_config(dir.path(), "*.csv", 10, 100, 1))?;
    let batches = read_all(&reader)?;
    assert_eq!(lens(&batches), [5]);
    assert_eq!(batches[0].source(), dir.file_path("full.csv"));
    Ok(())
}

#[test]
fn test_max_files_limits_the_file_set() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    for name in ["a.csv", "b.csv", "c.csv"] {
        write_rows_csv(dir.file_path(name), 10)?;
    }

    let config = ingestion_config(dir.path(), "*.csv", 2, 100, 1);
    let counting: CountingSource = CountingSource::default();
    let reader = IngestionReader::with_source(&config, &counting)?;
    assert_eq!(reader.files().len(), 2);

    let batches = read_all(&reader)?;
    assert_eq!(batches.len(), 2);
    assert_eq!(counting.opened(), reader.files());
    for b in &batches {
        assert!(reader.files().iter().any(|f| f == b.source()));
    }
    let skipped: Vec<_> = ["a.csv", "b.csv", "c.csv"]
        .into_iter()
        .map(|n| dir.file_path(n))
        .filter(|p| !reader.files().contains(p))
        .collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(counting.open_count(&skipped[0]), 0);
    Ok(())
}

#[test]
fn test_files_are_read_in_matched_order() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    let order = three_files(&dir)?;
    let reader = IngestionReader::new(&ingestion_config(dir.path(), "*.csv", 10, 20, 1))?;
    let batches = read_all(&reader)?;

    let sources: Vec<PathBuf> = batches.iter().map(|b| b.source().to_path_buf()).collect();
    let mut expected = Vec::new();
    for f in &order {
        expected.push(f.clone());
        expected.push(f.clone());
    }
    assert_eq!(sources, expected);
    assert_eq!(lens(&batches), [20, 10, 20, 10, 20, 10]);
    Ok(())
}

#[test]
fn test_pattern_only_matches_regular_files() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    write_rows_csv(dir.file_path("sales_1.csv"), 3)?;
    write_rows_csv(dir.file_path("other.csv"), 3)?;
    fs::write(dir.file_path("sales_notes.txt"), "not data")?;
    dir.create_dir("sales_dir.csv")?;

    let reader = IngestionReader::new(&ingestion_config(dir.path(), "sales_*.csv", 10, 100, 1))?;
    assert_eq!(reader.files(), [dir.file_path("sales_1.csv")]);
    Ok(())
}

#[test]
fn test_transient_open_failures_are_retried() -> anyhow::Result<()> {
    init_tracing();
    let dir = TempDirPath::new()?;
    write_rows_csv(dir.file_path("sales.csv"), 250)?;

    let config = ingestion_config(dir.path(), "*.csv", 10, 100, 3);
    let flaky = FlakySource::csv().failing_opens(2);
    let reader = IngestionReader::with_source(&config, &flaky)?;
    let batches = read_all(&reader)?;

    assert_eq!(flaky.opens(&dir.file_path("sales.csv")), 3);
    assert_eq!(lens(&batches), [100, 100, 50]);
    assert_eq!(collect_ids(&batches), (0..250).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn test_mid_file_failure_resumes_without_duplicates() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    write_rows_csv(dir.file_path("sales.csv"), 250)?;

    let config = ingestion_config(dir.path(), "*.csv", 10, 100, 2);
    let flaky = FlakySource::csv().failing_after_rows(150);
    let reader = IngestionReader::with_source(&config, &flaky)?;
    let batches = read_all(&reader)?;

    assert_eq!(flaky.total_opens(), 2);
    assert_eq!(lens(&batches), [100, 100, 50]);
    assert_eq!(batches.iter().map(DataBatch::index).collect::<Vec<_>>(), [0, 1, 2]);
    assert_eq!(collect_ids(&batches), (0..250).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn test_exhausted_retries_abort_the_stream() -> anyhow::Result<()> {
    init_tracing();
    let dir = TempDirPath::new()?;
    let order = three_files(&dir)?;

    let config = ingestion_config(dir.path(), "*.csv", 10, 20, 2);
    let flaky = FlakySource::csv().always_failing();
    let reader = IngestionReader::with_source(&config, &flaky)?;

    let mut stream = reader.stream();
    match stream.next() {
        Some(Err(Error::IngestionRead { file, attempts, .. })) => {
            assert_eq!(file, order[0]);
            assert_eq!(attempts, 2);
        }
        other => panic!("expected IngestionRead, got {other:?}"),
    }
    assert!(stream.is_aborted());
    assert!(stream.next().is_none());
    assert!(stream.next().is_none());

    assert_eq!(flaky.opens(&order[0]), 2);
    assert_eq!(flaky.opens(&order[1]), 0);
    assert_eq!(flaky.opens(&order[2]), 0);
    Ok(())
}

#[test]
fn test_abort_after_earlier_files_were_delivered() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    let order = three_files(&dir)?;
    let failing = order[1].file_name().and_then(|n| n.to_str()).unwrap_or_default();

    let config = ingestion_config(dir.path(), "*.csv", 10, 20, 2);
    let flaky = FlakySource::csv().always_failing().only_file(failing);
    let reader = IngestionReader::with_source(&config, &flaky)?;
    let items: Vec<_> = reader.stream().collect();

    assert_eq!(items.len(), 3);
    for item in &items[..2] {
        let batch = item.as_ref().map_err(|e| anyhow::anyhow!("{e}"))?;
        assert_eq!(batch.source(), order[0]);
    }
    let err = items[2].as_ref().unwrap_err();
    assert!(matches!(err, Error::IngestionRead { file, .. } if file == &order[1]));
    assert!(err.to_string().contains(failing));
    assert_eq!(flaky.opens(&order[2]), 0);
    Ok(())
}

#[test]
fn test_skip_policy_continues_with_next_file() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    let order = three_files(&dir)?;
    let failing = order[1].file_name().and_then(|n| n.to_str()).unwrap_or_default();

    let mut config = ingestion_config(dir.path(), "*.csv", 10, 20, 2);
    config.retry.on_exhausted = Some(OnExhausted::Skip);
    let flaky = FlakySource::csv().always_failing().only_file(failing);
    let reader = IngestionReader::with_source(&config, &flaky)?;

    let mut stream = reader.stream();
    let batches = stream.by_ref().collect::<Result<Vec<_>, _>>()?;
    assert!(!stream.is_aborted());

    let sources: Vec<&std::path::Path> = batches.iter().map(DataBatch::source).collect();
    assert_eq!(sources, [&order[0], &order[0], &order[2], &order[2]]);
    assert_eq!(flaky.opens(&order[1]), 2);
    Ok(())
}

#[test]
fn test_skip_policy_keeps_rows_delivered_before_failure() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    write_rows_csv(dir.file_path("sales.csv"), 50)?;

    let mut config = ingestion_config(dir.path(), "*.csv", 10, 20, 1);
    config.retry.on_exhausted = Some(OnExhausted::Skip);
    let flaky = FlakySource::csv().failing_after_rows(30);
    let reader = IngestionReader::with_source(&config, &flaky)?;
    let batches = read_all(&reader)?;

    assert_eq!(lens(&batches), [20]);
    assert_eq!(collect_ids(&batches), (0..20).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn test_missing_source_directory() {
    let dir = TempDirPath::new().unwrap();
    let missing = dir.file_path("nope");
    let err = IngestionReader::new(&ingestion_config(&missing, "*.csv", 10, 100, 1)).unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, Error::NotFound(NotFound::SourceDirectory(p)) if p == missing));
}

#[test]
fn test_no_matching_files() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    write_rows_csv(dir.file_path("sales.csv"), 3)?;
    let err = IngestionReader::new(&ingestion_config(dir.path(), "*.parquet", 10, 100, 1)).unwrap_err();
    match err {
        Error::NotFound(NotFound::NoMatchingFiles { directory, pattern }) => {
            assert_eq!(directory, dir.path());
            assert_eq!(pattern, "*.parquet");
        }
        other => panic!("expected NoMatchingFiles, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_out_of_range_record_is_rejected_before_reading() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    write_rows_csv(dir.file_path("sales.csv"), 250)?;
    let cases = [
        (ingestion_config(dir.path(), "*.csv", 10, 0, 1), "data_ingestion.input.chunksize"),
        (ingestion_config(dir.path(), "*.csv", 0, 100, 1), "data_ingestion.input.max_files"),
        (ingestion_config(dir.path(), "*.csv", 10, 100, 0), "data_ingestion.retry.attempts"),
    ];
    for (config, path) in cases {
        let source: CountingSource = CountingSource::default();
        let err = IngestionReader::with_source(&config, &source).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }), "{path}: {err:?}");
        assert_eq!(err.config_path().map(ToString::to_string).as_deref(), Some(path));
        assert!(source.opened().is_empty());
    }
    Ok(())
}

#[test]
fn test_oversized_delay_from_document_is_rejected() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    write_rows_csv(dir.file_path("sales.csv"), 10)?;
    let yaml = sample_config_yaml(dir.path()).replace("delay_seconds: 0", "delay_seconds: 1.0e20");
    let doc = ConfigDocument::from_yaml_str(&yaml)?;
    let err = resolve_data_ingestion(&doc).unwrap_err();
    assert!(matches!(err, Error::InvalidValue { .. }));

    let mut config = ingestion_config(dir.path(), "*.csv", 10, 100, 2);
    config.retry.delay_seconds = 1.0e20;
    let source = FlakySource::csv().failing_opens(1);
    let err = IngestionReader::with_source(&config, &source).unwrap_err();
    assert_eq!(
        err.config_path().map(ToString::to_string).as_deref(),
        Some("data_ingestion.retry.delay_seconds")
    );
    assert_eq!(source.total_opens(), 0);
    Ok(())
}

#[test]
fn test_invalid_pattern() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    let err = IngestionReader::new(&ingestion_config(dir.path(), "[", 10, 100, 1)).unwrap_err();
    assert!(matches!(err, Error::InvalidValue { .. }));
    assert_eq!(
        err.config_path().map(ToString::to_string).as_deref(),
        Some("data_ingestion.input.file_pattern")
    );
    Ok(())
}

#[test]
fn test_each_stream_is_a_fresh_pass() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    write_rows_csv(dir.file_path("sales.csv"), 120)?;

    let counting: CountingSource = CountingSource::default();
    let reader = IngestionReader::with_source(&ingestion_config(dir.path(), "*.csv", 10, 100, 1), &counting)?;

    let first = read_all(&reader)?;
    // Abandon a pass part-way; the next one starts over.
    let partial = reader.stream().next().transpose()?;
    let second = read_all(&reader)?;

    assert_eq!(first, second);
    assert_eq!(partial.as_ref(), first.first());
    assert_eq!(counting.open_count(&dir.file_path("sales.csv")), 3);
    Ok(())
}

#[test]
fn test_headerless_and_custom_delimiter() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    fs::write(dir.file_path("raw.csv"), "1;a\n2;b\n3;c\n")?;

    let mut config = ingestion_config(dir.path(), "*.csv", 10, 2, 1);
    config.input.has_headers = Some(false);
    config.input.delimiter = Some(b';');
    let batches = read_all(&IngestionReader::new(&config)?)?;

    assert_eq!(lens(&batches), [2, 1]);
    assert!(batches[0].headers().is_empty());
    assert_eq!(batches[0].rows()[1].get(1), Some("b"));
    assert_eq!(batches[1].rows()[0].get(0), Some("3"));
    Ok(())
}

#[cfg(feature = "compression-gzip")]
#[test]
fn test_gzip_source() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    write_rows_csv_gz(dir.file_path("sales.csv.gz"), 250)?;

    let reader = IngestionReader::new(&ingestion_config(dir.path(), "*.csv.gz", 10, 100, 1))?;
    let batches = read_all(&reader)?;
    assert_eq!(lens(&batches), [100, 100, 50]);
    assert_eq!(collect_ids(&batches), (0..250).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn test_reader_from_configuration_document() -> anyhow::Result<()> {
    let data = TempDirPath::new()?;
    write_rows_csv(data.file_path("sales_2024.csv"), 150)?;

    let doc = ConfigDocument::load(write_config(data.path(), &sample_config_yaml(data.path()))?)?;
    let reader = IngestionReader::new(&resolve_data_ingestion(&doc)?)?;
    assert_eq!(lens(&read_all(&reader)?), [100, 50]);
    Ok(())
}

#[test]
fn test_malformed_rows_exhaust_retries() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    fs::write(dir.file_path("bad.csv"), "id,value\n1,2\n3\n")?;

    let reader = IngestionReader::new(&ingestion_config(dir.path(), "*.csv", 10, 100, 2))?;
    let err = read_all(&reader).unwrap_err();
    assert!(matches!(err, Error::IngestionRead { attempts: 2, .. }));
    assert!(format!("{:?}", err).contains("bad.csv"));
    Ok(())
}

#[test]
fn test_row_count_matches_streamed_rows() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    write_rows_csv(dir.file_path("sales.csv"), 333)?;

    let reader = IngestionReader::new(&ingestion_config(dir.path(), "*.csv", 10, 100, 1))?;
    let streamed: usize = lens(&read_all(&reader)?).iter().sum();
    let counted = timeseries_inventory::io::csv::count_csv_rows(dir.file_path("sales.csv"), true)?;
    assert_eq!(counted, streamed as u64);
    Ok(())
}
