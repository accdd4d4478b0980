use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use cscc_app::{
    AppError, LoadStage, LoaderConfig, LoaderMessage, LoaderState, ScenarioDataLoader,
    ScenarioRequest, SplitOptions, load_country_range, load_manifest, load_metrics,
    load_metrics_with_progress, split_dataset,
};
use cscc_core::{CountryCode, DamageModel, Discounting, Rcp, Scenario, Ssp};
use cscc_metrics::{AggregateSpec, ReferenceMatch, WorldMedian};

const SCENARIO_HEADER: &str = "run,dmgfuncpar,climate,SSP,RCP,N,ISO3,prtp,eta,dr,16.7%,50%,83.3%";

const REFERENCE: &str = "Country Name,Country Code,2017 GDP,2017 Population,2014 Emissions,Emissions Share\n\
                         United States,USA,1.9e13,3.25e8,5.2e6,0.145\n\
                         Germany,DEU,3.6e12,8.2e7,7.2e5,0.02\n\
                         France,FRA,2.5e12,6.7e7,3.0e5,0.01\n";

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn code(s: &str) -> CountryCode {
    CountryCode::parse(s).unwrap()
}

fn write_fixture(dir: &Path) -> LoaderConfig {
    fs::create_dir_all(dir).expect("failed to create temp dir");
    let data_dir = dir.join("filtered");
    fs::create_dir_all(&data_dir).expect("failed to create data dir");

    fs::write(
        data_dir.join("rcp_rcp60_dmg_bhm_sr_ssp_SSP2.csv"),
        format!(
            "{SCENARIO_HEADER}\n\
             bhm_sr,bootstrap,uncertain,SSP2,rcp60,1000,WLD,2,1p5,NA,177.1,400,805.4\n\
             bhm_sr,bootstrap,uncertain,SSP2,rcp60,1000,USA,2,1p5,NA,10.4,48,106.6\n\
             bhm_sr,bootstrap,uncertain,SSP2,rcp60,1000,DEU,2,1p5,NA,2.1,8,20.3\n\
             bhm_sr,bootstrap,uncertain,SSP2,rcp60,1000,FRA,2,1p5,NA,1.1,4,9.9\n\
             bhm_sr,bootstrap,uncertain,SSP2,rcp60,1000,ATA,2,1p5,NA,0,0.1,0.2\n\
             bhm_sr,bootstrap,uncertain,SSP2,rcp60,1000,USA,1p5,1p5,NA,20.1,80.2,160.7\n"
        ),
    )
    .expect("failed to write scenario file");

    let reference_file = dir.join("reference.csv");
    fs::write(&reference_file, REFERENCE).expect("failed to write reference file");

    LoaderConfig {
        data_dir,
        reference_file,
        dataset_file: dir.join("cscc_v1.csv"),
        allow_list: Some(vec![code("USA"), code("DEU"), code("ATA")]),
        aggregate: Some(AggregateSpec {
            code: code("EUU"),
            label: "European Union".to_string(),
            members: vec![code("DEU"), code("FRA"), code("ITA")],
        }),
        fetch_timeout_ms: Some(10_000),
        ..LoaderConfig::default()
    }
}

#[test]
fn synchronous_load_reports_every_stage() {
    let dir = unique_temp_dir("cscc_app_sync");
    let config = write_fixture(&dir);

    let mut stages = Vec::new();
    let mut cb = |event: cscc_app::LoadProgressEvent| stages.push((event.stage, event.rows_read));
    let loaded = load_metrics_with_progress(&config, &ScenarioRequest::default(), Some(&mut cb))
        .expect("scenario should load");

    // Each parsing stage reports its own row count once it has finished.
    assert_eq!(
        stages,
        vec![
            (LoadStage::ResolvingPaths, None),
            (LoadStage::ParsingScenario, None),
            (LoadStage::ParsingScenario, Some(6)),
            (LoadStage::ParsingReference, None),
            (LoadStage::ParsingReference, Some(3)),
            (LoadStage::Joining, None),
            (LoadStage::Aggregating, None),
            (LoadStage::Completed, None),
        ]
    );

    let set = &loaded.metrics;
    let codes: Vec<&str> = set.metrics.iter().map(|m| m.country_code.as_str()).collect();
    assert_eq!(codes, vec!["USA", "DEU", "ATA"]);
    assert_eq!(set.world_median, WorldMedian::Found(400.0));
    assert_eq!(set.get(code("USA")).unwrap().share_of_global_cost, 12.0);
    assert_eq!(set.get(code("ATA")).unwrap().reference, ReferenceMatch::Missing);

    let eu = set.aggregate.as_ref().expect("aggregate should be available");
    assert_eq!(eu.total_cost, 12.0);
    assert_eq!(eu.members_found, vec![code("DEU"), code("FRA")]);
    assert_eq!(eu.members_missing, vec![code("ITA")]);
    assert_eq!(eu.share_of_global_cost, 3.0);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn country_request_stays_within_allow_list() {
    let dir = unique_temp_dir("cscc_app_country");
    let config = write_fixture(&dir);

    let request = ScenarioRequest::default().with_country(code("DEU"));
    let loaded = load_metrics(&config, &request).expect("scenario should load");
    assert_eq!(loaded.metrics.metrics.len(), 1);
    assert_eq!(loaded.metrics.metrics[0].label, "Germany");
    assert_eq!(loaded.metrics.world_median, WorldMedian::Found(400.0));
    assert!(loaded.metrics.aggregate.is_some());

    // FRA has data but is outside the configured allow-list.
    let request = ScenarioRequest::default().with_country(code("FRA"));
    let loaded = load_metrics(&config, &request).expect("scenario should load");
    assert!(loaded.metrics.metrics.is_empty());
    assert!(loaded.metrics.aggregate.is_some());

    let open = LoaderConfig {
        allow_list: None,
        ..config
    };
    let loaded = load_metrics(&open, &request).expect("scenario should load");
    let codes: Vec<&str> = loaded.metrics.metrics.iter().map(|m| m.country_code.as_str()).collect();
    assert_eq!(codes, vec!["FRA"]);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn published_codes_are_subset_of_allow_list_for_any_request() {
    let dir = unique_temp_dir("cscc_app_subset");
    let config = LoaderConfig {
        allow_list: Some(vec![code("USA")]),
        ..write_fixture(&dir)
    };

    for country in [None, Some("USA"), Some("ATA"), Some("DEU"), Some("WLD")] {
        let mut request = ScenarioRequest::default();
        if let Some(country) = country {
            request = request.with_country(code(country));
        }
        let loaded = load_metrics(&config, &request).expect("scenario should load");
        assert!(
            loaded
                .metrics
                .metrics
                .iter()
                .all(|m| m.country_code == code("USA")),
            "request {country:?} published outside the allow-list"
        );
    }

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn growth_adjusted_selects_other_prtp() {
    let dir = unique_temp_dir("cscc_app_growth");
    let config = write_fixture(&dir);

    let request = ScenarioRequest::new(Scenario {
        discounting: Discounting::GrowthAdjusted,
        ..Scenario::default()
    });
    let loaded = load_metrics(&config, &request).expect("scenario should load");
    assert_eq!(loaded.metrics.metrics.len(), 1);
    assert_eq!(loaded.metrics.metrics[0].median, 80.2);
    assert_eq!(loaded.metrics.world_median, WorldMedian::Fallback);
    assert!(loaded.metrics.aggregate.is_none());
    assert!(loaded.metrics.aggregate_unavailable.is_some());

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn background_loader_publishes_ready_state() {
    let dir = unique_temp_dir("cscc_app_worker");
    let config = write_fixture(&dir);

    let (loader, messages) = ScenarioDataLoader::with_notifications(config);
    assert!(matches!(loader.state(), LoaderState::Idle));

    let ticket = loader.request(ScenarioRequest::default());
    assert_eq!(loader.current_generation(), ticket.generation);
    let state = loader.wait(ticket);
    assert!(!state.is_loading());
    match &state {
        LoaderState::Ready { generation, loaded } => {
            assert_eq!(*generation, ticket.generation);
            assert_eq!(loaded.metrics.metrics.len(), 3);
        }
        other => panic!("unexpected state: {other:?}"),
    }
    assert_eq!(
        messages.recv_timeout(Duration::from_secs(10)).unwrap(),
        LoaderMessage::Ready {
            generation: ticket.generation
        }
    );

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn newest_request_wins() {
    let dir = unique_temp_dir("cscc_app_generations");
    let config = write_fixture(&dir);
    let loader = ScenarioDataLoader::new(config);

    let first = loader.request(ScenarioRequest::default());
    let second = loader.request(ScenarioRequest::new(Scenario {
        discounting: Discounting::GrowthAdjusted,
        ..Scenario::default()
    }));
    assert!(second.generation > first.generation);

    let state = loader
        .wait_timeout(second, Duration::from_secs(10))
        .expect("fetch should settle");
    assert_eq!(state.generation(), Some(second.generation));
    let metrics = state.metrics().expect("second fetch should be ready");
    assert_eq!(metrics.metrics[0].median, 80.2);

    // The older ticket is already settled by supersession.
    let older = loader
        .wait_timeout(first, Duration::from_secs(1))
        .expect("older ticket should not block");
    assert_eq!(older.generation(), Some(second.generation));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn missing_scenario_file_fails_instead_of_hanging() {
    let dir = unique_temp_dir("cscc_app_missing");
    let config = write_fixture(&dir);
    let loader = ScenarioDataLoader::new(config);

    let ticket = loader.request(ScenarioRequest::new(Scenario {
        ssp: Ssp::Ssp5,
        rcp: Rcp::Rcp85,
        damage_model: DamageModel::Djo,
        discounting: Discounting::Fixed,
    }));
    let state = loader
        .wait_timeout(ticket, Duration::from_secs(10))
        .expect("fetch should settle");
    match state {
        LoaderState::Failed { error, .. } => assert!(matches!(*error, AppError::Data(_))),
        other => panic!("unexpected state: {other:?}"),
    }

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn split_then_load_country_range() {
    let dir = unique_temp_dir("cscc_app_split");
    let config = write_fixture(&dir);

    fs::write(
        &config.dataset_file,
        format!(
            "{SCENARIO_HEADER}\n\
             bhm_sr,bootstrap,uncertain,SSP2,rcp60,1000,USA,2,1p5,NA,10,48,110\n\
             bhm_lr,bootstrap,uncertain,SSP2,rcp60,1000,USA,2,1p5,NA,-50,300,5000\n\
             bhm_sr,bootstrap,uncertain,SSP1,rcp45,1000,USA,2,2,NA,1,2,3\n\
             bhm_sr,bootstrap,uncertain,SSP2,rcp60,1000,DEU,2,1p5,NA,2,8,20\n"
        ),
    )
    .expect("failed to write dataset");

    let dest = dir.join("split");
    let manifest = split_dataset(&SplitOptions::new(&config.dataset_file, &dest))
        .expect("split should succeed");
    assert_eq!(manifest.rows_read, 4);
    assert_eq!(manifest.scenario_files.len(), 75);
    let sr = manifest
        .scenario_files
        .iter()
        .find(|f| f.file_name == "rcp_rcp60_dmg_bhm_sr_ssp_SSP2.csv")
        .unwrap();
    assert_eq!(sr.rows, 2);
    let countries: Vec<(&str, usize)> = manifest
        .country_files
        .iter()
        .map(|f| (f.file_name.as_str(), f.rows))
        .collect();
    assert_eq!(countries, vec![("iso3_DEU.csv", 1), ("iso3_USA.csv", 3)]);
    assert!(dest.join("iso3_USA.csv").exists());
    assert_eq!(load_manifest(&dest).unwrap(), manifest);

    let range = load_country_range(&config, code("USA"), None).expect("range should load");
    assert_eq!(range.rows.len(), 2);
    let extent = range.extent.expect("extent should exist");
    assert_eq!((extent.min, extent.max), (-50.0, 5000.0));
    assert_eq!(range.inferred_clamp, 2000.0);
    assert_eq!(range.axis_max, 2000.0);
    assert_eq!(range.grid.band(Ssp::Ssp2, Rcp::Rcp60, DamageModel::BhmLr).median, 300.0);

    let _ = fs::remove_dir_all(dir);
}
