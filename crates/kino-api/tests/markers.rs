mod common;

use kino_api::ApiError;
use kino_api::markers::MarkerTarget;
use kino_timeline::MarkerEditor;
use kino_timeline::batch::BatchSelection;
use kino_types::{MarkerKind, MarkerRange, SceneMarkers};

use common::Backend;

const BATCH: &str = "/api/v1/admin/titles/show-1/scene-markers/batch";

fn intro_and_credits() -> SceneMarkers {
    let mut markers = SceneMarkers::default();
    markers.set(MarkerKind::Intro, Some(MarkerRange::new(0.0, 88.0).unwrap()));
    markers.set(MarkerKind::Credits, Some(MarkerRange::new(1290.0, 1340.0).unwrap()));
    markers
}

#[tokio::test]
async fn apply_all_sends_one_request_for_every_episode() {
    let backend = Backend::default();
    let client = backend.start().await;

    let request = BatchSelection::all()
        .build_request(&intro_and_credits(), 12)
        .unwrap();
    let resp = client.markers().batch_apply("show-1", &request).await.unwrap();

    assert_eq!(resp.updated, 12);
    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, BATCH);

    let body = requests[0].body.as_ref().unwrap();
    let ids: Vec<&str> = body["episodeIds"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    let expected: Vec<String> = (1..=12).map(|n| n.to_string()).collect();
    assert_eq!(ids, expected);
    assert_eq!(body["markers"]["intro"]["end"], 88.0);
    assert!(body["markers"]["recap"].is_null());
}

#[tokio::test]
async fn empty_batch_sends_nothing() {
    let backend = Backend::default();
    let client = backend.start().await;
    let request = kino_types::api::BatchMarkersRequest {
        episode_ids: vec![],
        markers: intro_and_credits(),
    };

    let resp = client.markers().batch_apply("show-1", &request).await.unwrap();
    assert_eq!(resp.updated, 0);
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn editor_save_round_trip_and_cache() {
    let backend = Backend::default();
    let client = backend.start().await;
    let target = MarkerTarget::episode("show-1", "e3");

    let loaded = client.markers().load(&target).await.unwrap();
    assert!(loaded.is_empty());
    client.markers().load(&target).await.unwrap();

    let mut editor = MarkerEditor::load(loaded, 1350.0);
    editor.set_range(MarkerKind::Recap, 0.0, 45.0).unwrap();
    assert!(editor.is_dirty());

    let (api_client, api_target) = (&client, &target);
    editor
        .save_with(|markers| async move { api_client.markers().save(api_target, &markers).await })
        .await
        .unwrap();
    assert!(!editor.is_dirty());

    let reloaded = client.markers().load(&target).await.unwrap();
    assert_eq!(reloaded.get(MarkerKind::Recap).unwrap().end(), 45.0);

    let path = "/api/v1/admin/titles/show-1/scene-markers";
    assert_eq!(backend.count("GET", path), 2);
    let put = backend
        .requests()
        .into_iter()
        .find(|r| r.method == "PUT")
        .unwrap();
    assert_eq!(put.query.as_deref(), Some("episodeId=e3"));
}

#[tokio::test]
async fn failed_save_keeps_edits_unsaved() {
    let backend = Backend::default();
    backend.state().locked_titles.push("film-1".into());
    let client = backend.start().await;
    let target = MarkerTarget::title("film-1");

    let mut editor = MarkerEditor::load(SceneMarkers::default(), 5400.0);
    editor.set_range(MarkerKind::Credits, 5200.0, 5400.0).unwrap();

    let (api_client, api_target) = (&client, &target);
    let err = editor
        .save_with(|markers| async move { api_client.markers().save(api_target, &markers).await })
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Title is locked for editing");
    assert!(editor.is_dirty());
    assert!(editor.markers().get(MarkerKind::Credits).is_some());
}

#[tokio::test]
async fn detected_markers_merge_into_the_session() {
    let backend = Backend::default();
    let client = backend.start().await;
    let target = MarkerTarget::episode("show-1", "e1");

    let mut existing = SceneMarkers::default();
    existing.set(MarkerKind::Recap, Some(MarkerRange::new(0.0, 30.0).unwrap()));
    let mut editor = MarkerEditor::load(existing, 1320.0);

    let detected = client.markers().detect(&target).await.unwrap();
    editor.apply_detected(&detected);

    assert!(editor.is_dirty());
    let kinds: Vec<_> = editor.markers().iter().map(|(kind, _)| kind).collect();
    assert_eq!(
        kinds,
        vec![MarkerKind::Intro, MarkerKind::Recap, MarkerKind::Credits]
    );
}

#[tokio::test]
async fn inverted_range_from_the_server_is_rejected() {
    let backend = Backend::default();
    backend.state().markers.insert(
        "/api/v1/admin/titles/film-9/scene-markers?".into(),
        serde_json::json!({ "intro": { "start": 50.0, "end": 10.0 } }),
    );
    let client = backend.start().await;

    let err = client
        .markers()
        .load(&MarkerTarget::title("film-9"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}
