use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use cscc_core::{Discounting, Scenario};
use cscc_data::{
    CsvSource, Field, NumericColumns, RowFilter, RowParser, ScenarioFilter, filter_stream,
    load_scenario_rows, scenario_path,
};
use proptest::prelude::*;

const HEADER: &str = "run,dmgfuncpar,climate,SSP,RCP,N,ISO3,prtp,eta,dr,16.7%,50%,83.3%";

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

#[test]
fn scenario_file_on_disk_streams_through_filter() {
    let dir = unique_temp_dir("cscc_data_stream");
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    let scenario = Scenario::default();
    let path = scenario_path(&dir, &scenario);
    fs::write(
        &path,
        format!(
            "{HEADER}\n\
             bhm_sr,bootstrap,uncertain,SSP2,rcp60,1000,WLD,2,1p5,NA,177.1,417.4,805.4\n\
             bhm_sr,bootstrap,uncertain,SSP2,rcp60,1000,USA,2,1p5,NA,10.4,48.1,106.6\n\
             bhm_sr,bootstrap,uncertain,SSP2,rcp60,1000,USA,1p5,1p5,NA,20.1,80.2,160.7\n\
             bhm_sr,estimates,expected,SSP2,rcp60,1000,IND,2,1p5,NA,49.4,85.4,146.5\n"
        ),
    )
    .expect("failed to write scenario file");

    let filter = ScenarioFilter::for_scenario_file(Discounting::Fixed, "2", None)
        .expect("filter should build");
    let batch = load_scenario_rows(CsvSource::Path(path.clone()), &filter, "2")
        .expect("scenario should load");

    let codes: Vec<&str> = batch.rows.iter().map(|r| r.country_code.as_str()).collect();
    assert_eq!(codes, vec!["WLD", "USA"]);
    assert_eq!(batch.rows[1].median, 48.1);
    assert!(batch.summary.complete);
    assert_eq!(batch.summary.rows_read, 4);

    let growth = ScenarioFilter::for_scenario_file(Discounting::GrowthAdjusted, "2", None)
        .expect("filter should build");
    let batch = load_scenario_rows(CsvSource::Path(path), &growth, "2").expect("should load");
    assert_eq!(batch.rows.len(), 1);
    assert_eq!(batch.rows[0].median, 80.2);

    let _ = fs::remove_dir_all(dir);
}

proptest! {
    #[test]
    fn filter_preserves_source_order(keep in prop::collection::vec(any::<bool>(), 0..40)) {
        let mut body = String::from("id,keep\n");
        for (i, k) in keep.iter().enumerate() {
            body.push_str(&format!("{i},{}\n", if *k { "y" } else { "n" }));
        }
        let stream = RowParser::new(CsvSource::Inline(body))
            .numeric_columns(NumericColumns::named(["id"]))
            .rows()
            .unwrap();
        let predicate = |r: &cscc_data::Record| r.text_eq("keep", "y");
        let ids: Vec<f64> = filter_stream(stream, &predicate)
            .map(|r| r.unwrap().number("id").unwrap())
            .collect();

        let expected: Vec<f64> = keep
            .iter()
            .enumerate()
            .filter(|(_, k)| **k)
            .map(|(i, _)| i as f64)
            .collect();
        prop_assert_eq!(ids, expected);
        prop_assert!(predicate.accept(&cscc_data::Record::new(
            1,
            vec!["keep".to_string()].into(),
            vec![Field::Text("y".to_string())],
        )));
    }

    #[test]
    fn finite_numbers_are_coerced(v in -1.0e12_f64..1.0e12_f64) {
        prop_assert_eq!(Field::coerce(&v.to_string(), true), Field::Number(v));
    }
}
