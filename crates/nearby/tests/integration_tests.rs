//! Integration tests for nearby query processing
//!
//! These tests run against the public API only: a dataset source, an analyzer
//! and a configuration go in, `QueryResult`s come out.

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use nearby::{
    AnalysisError, DataSource, DatasetSource, LexiconAnalyzer, PhraseAnalysis, QueryConfigBuilder,
    QueryOrchestrator, QueryResult, RawDataset, RawPoi, StaticSource, TestDataConfig,
    TextAnalyzer, data::write_test_dataset,
};

fn setup_test_env() {
    let _ = nearby::init_logging(tracing::Level::WARN);
}

/// Analyzer that counts calls and can be switched off or slowed down.
struct ScriptedAnalyzer {
    ready: bool,
    delay: Option<Duration>,
    fail: bool,
    calls: AtomicUsize,
}

impl ScriptedAnalyzer {
    fn ready() -> Self {
        Self {
            ready: true,
            delay: None,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    fn not_ready() -> Self {
        Self {
            ready: false,
            ..Self::ready()
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::ready()
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::ready()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextAnalyzer for ScriptedAnalyzer {
    fn is_ready(&self) -> bool {
        self.ready
    }

    async fn extract_phrase(&self, segment: &str) -> Result<PhraseAnalysis, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(AnalysisError::Failed("model unavailable".to_string()));
        }
        LexiconAnalyzer::new().extract_phrase(segment).await
    }
}

/// Source that counts fetches.
struct CountingSource {
    inner: StaticSource,
    fetches: AtomicUsize,
}

#[async_trait]
impl DatasetSource for CountingSource {
    fn name(&self) -> String {
        "counting".to_string()
    }

    async fn fetch(&self) -> nearby::data::Result<RawDataset> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.inner.fetch().await
    }
}

fn park_and_restaurant(threshold_miles: f64) -> QueryOrchestrator {
    QueryOrchestrator::builder()
        .data_source(DataSource::Test(TestDataConfig::minimal()))
        .config(QueryConfigBuilder::new().threshold_miles(threshold_miles).build())
        .build()
}

#[tokio::test]
async fn test_parks_with_nearby_restaurants() {
    setup_test_env();

    let orchestrator = park_and_restaurant(1.5);
    let result = orchestrator
        .process_query("parks with nearby restaurants")
        .await;

    let QueryResult::Grouped {
        groups,
        target_type,
        nearby_type,
        threshold_miles,
    } = result
    else {
        panic!("Expected grouped results, got {result:?}");
    };
    assert_eq!(target_type, "park");
    assert_eq!(nearby_type, "restaurant");
    assert_eq!(threshold_miles, 1.5);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].target.name, "A");
    assert_eq!(groups[0].nearby.len(), 1);
    assert_eq!(groups[0].nearby[0].poi.name, "B");
    assert!((groups[0].nearby[0].distance_miles - 0.69).abs() < 0.01);
}

#[tokio::test]
async fn test_no_groups_within_smaller_threshold() {
    setup_test_env();

    let orchestrator = park_and_restaurant(0.5);
    let result = orchestrator
        .process_query("parks with nearby restaurants")
        .await;

    let QueryResult::Suggestions { message, .. } = result else {
        panic!("Expected suggestions, got {result:?}");
    };
    assert!(message.contains("park"), "{message}");
    assert!(message.contains("restaurant"), "{message}");
    assert!(message.contains("0.5 miles"), "{message}");
}

#[tokio::test]
async fn test_other_relations_resolve() {
    setup_test_env();

    let orchestrator = park_and_restaurant(1.5);
    for query in [
        "parks near restaurants",
        "parks close to restaurants",
        "parks around restaurants",
        "parks that have nearby restaurants",
        "Parks having nearby restaurants?",
    ] {
        let result = orchestrator.process_query(query).await;
        assert_eq!(result.kind(), "grouped", "{query}: {result:?}");
    }
}

#[tokio::test]
async fn test_type_list_regardless_of_dataset() {
    setup_test_env();

    for source in [
        DataSource::Embedded,
        DataSource::Test(TestDataConfig::minimal()),
        DataSource::Test(TestDataConfig::sample()),
    ] {
        let orchestrator = QueryOrchestrator::builder().data_source(source).build();
        let expected = {
            orchestrator.warm_up().await.unwrap();
            orchestrator.repository().supported_types()
        };
        let result = orchestrator.process_query("what types are supported?").await;
        assert_eq!(result, QueryResult::TypesList { types: expected });
    }
}

#[tokio::test]
async fn test_empty_query_skips_extraction() {
    setup_test_env();

    let analyzer = Arc::new(ScriptedAnalyzer::ready());
    let orchestrator = QueryOrchestrator::builder()
        .data_source(DataSource::Test(TestDataConfig::minimal()))
        .analyzer(analyzer.clone())
        .build();

    let result = orchestrator.process_query("").await;
    assert_eq!(result, QueryResult::generic_guidance());
    assert_eq!(analyzer.calls(), 0);
}

#[tokio::test]
async fn test_not_ready_analyzer_reports_initializing() {
    setup_test_env();

    let analyzer = Arc::new(ScriptedAnalyzer::not_ready());
    let orchestrator = QueryOrchestrator::builder()
        .data_source(DataSource::Test(TestDataConfig::minimal()))
        .analyzer(analyzer.clone())
        .build();

    let result = orchestrator.process_query("parks").await;
    assert!(result.is_error());
    assert!(result.message().unwrap().contains("initializing"));
    assert_eq!(analyzer.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_slow_extraction_times_out() {
    setup_test_env();

    let orchestrator = QueryOrchestrator::builder()
        .data_source(DataSource::Test(TestDataConfig::minimal()))
        .analyzer(Arc::new(ScriptedAnalyzer::slow(Duration::from_secs(10))))
        .build();

    let result = orchestrator.process_query("parks").await;
    assert_eq!(result, QueryResult::timed_out(Duration::from_millis(3000)));
}

#[tokio::test]
async fn test_extraction_failure_becomes_suggestions() {
    setup_test_env();

    let orchestrator = QueryOrchestrator::builder()
        .data_source(DataSource::Test(TestDataConfig::minimal()))
        .analyzer(Arc::new(ScriptedAnalyzer::failing()))
        .build();

    let result = orchestrator.process_query("parks").await;
    let QueryResult::Suggestions { examples, .. } = result else {
        panic!("Expected suggestions, got {result:?}");
    };
    assert!(examples.contains(&"Show me parks".to_string()));
    assert!(examples.contains(&"Parks with nearby restaurants".to_string()));
}

#[tokio::test]
async fn test_unrecognized_query_suggests_types() {
    setup_test_env();

    let orchestrator = QueryOrchestrator::builder().build();
    let result = orchestrator.process_query("somewhere fun").await;
    let QueryResult::Suggestions { message, examples } = result else {
        panic!("Expected suggestions, got {result:?}");
    };
    assert!(message.contains("parks, restaurants, cafes"), "{message}");
    assert_eq!(examples[0], "Show me parks");
}

#[tokio::test]
async fn test_malformed_dataset_is_reported() {
    setup_test_env();

    let mut raw = nearby::data::create_test_dataset(&TestDataConfig::minimal());
    raw.pois.push(RawPoi {
        location: Some(nearby::data::RawLocation {
            latitude: Some(123.0),
            longitude: Some(0.0),
        }),
        ..RawPoi::new("bad", "Bad", "park", (0.0, 0.0), "Nowhere")
    });
    let orchestrator = QueryOrchestrator::builder()
        .source(Arc::new(StaticSource::new(raw)))
        .build();

    let result = orchestrator.process_query("parks").await;
    assert!(result.is_error());
    assert!(result.message().unwrap().contains("malformed"), "{result}");
    assert!(!orchestrator.repository().is_loaded());
}

#[tokio::test]
async fn test_missing_dataset_file_is_retryable() {
    setup_test_env();

    let orchestrator = QueryOrchestrator::builder()
        .data_source(DataSource::File("/definitely/not/here/pois.json".into()))
        .build();

    let result = orchestrator.process_query("parks").await;
    assert!(result.is_error());
    assert!(result.message().unwrap().contains("try again"), "{result}");
}

#[tokio::test]
async fn test_dataset_from_json_file() {
    setup_test_env();

    let file = write_test_dataset(&TestDataConfig::sample()).unwrap();
    let orchestrator = QueryOrchestrator::builder()
        .data_source(DataSource::File(file.path().to_path_buf()))
        .build();

    let QueryResult::Success { pois } = orchestrator.process_query("libraries").await else {
        panic!("Expected libraries");
    };
    assert_eq!(pois.len(), 5);
}

#[tokio::test]
async fn test_concurrent_queries_share_one_load() {
    setup_test_env();

    let source = Arc::new(CountingSource {
        inner: StaticSource::new(nearby::data::create_test_dataset(&TestDataConfig::sample())),
        fetches: AtomicUsize::new(0),
    });
    let orchestrator = Arc::new(
        QueryOrchestrator::builder()
            .source(source.clone())
            .config(QueryConfigBuilder::driving().build())
            .build(),
    );

    let queries = [
        "parks with nearby cafes",
        "museums",
        "what types are supported?",
        "cafes near libraries",
        "",
        "quiet libraries",
    ];
    let handles = queries.into_iter().map(|query| {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move { orchestrator.process_query(query).await })
    });
    let results = futures::future::join_all(handles).await;

    for (query, result) in queries.iter().zip(results) {
        let result = result.expect("query task should not panic");
        assert!(!result.is_error(), "{query}: {result:?}");
    }
    assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_proximity_attribute_filters() {
    setup_test_env();

    let raw = RawDataset {
        supported_types: vec!["park".into(), "cafe".into()],
        pois: vec![
            RawPoi::new("p1", "Dog Park", "park", (0.0, 0.0), "1 Park Rd")
                .with_attributes(["dog friendly"]),
            RawPoi::new("p2", "Rose Garden", "park", (0.0, 0.004), "2 Park Rd")
                .with_attributes(["gardens"]),
            RawPoi::new("c1", "Quiet Cup", "cafe", (0.0, 0.001), "1 Cafe St")
                .with_attributes(["quiet", "wifi"]),
            RawPoi::new("c2", "Loud Beans", "cafe", (0.0, 0.003), "2 Cafe St")
                .with_attributes(["music"]),
        ],
    };
    let orchestrator = QueryOrchestrator::builder()
        .source(Arc::new(StaticSource::new(raw)))
        .build();

    let result = orchestrator.process_query("quiet cafes near parks").await;
    let QueryResult::Grouped { groups, .. } = result else {
        panic!("Expected grouped results, got {result:?}");
    };
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].target.id, "c1");
    let nearby: Vec<_> = groups[0].nearby.iter().map(|n| n.poi.id.as_str()).collect();
    assert_eq!(nearby, vec!["p1", "p2"]);

    let result = orchestrator
        .process_query("vegan cafes near parks")
        .await;
    let QueryResult::Suggestions { message, .. } = result else {
        panic!("Expected suggestions, got {result:?}");
    };
    assert!(message.contains("vegan cafes"), "{message}");
}

#[tokio::test]
async fn test_results_are_serializable_for_the_ui() {
    setup_test_env();

    let orchestrator = park_and_restaurant(1.5);
    let result = orchestrator
        .process_query("parks with nearby restaurants")
        .await;
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["kind"], "grouped");
    assert_eq!(json["groups"][0]["target"]["type"], "park");
    assert_eq!(json["groups"][0]["nearby"][0]["poi"]["name"], "B");
}
