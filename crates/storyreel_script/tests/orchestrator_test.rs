// Batched generation and extension with a mock driver.

mod test_utils;

use std::sync::Mutex;
use std::time::Duration;
use storyreel_core::{DialogueLanguage, ProgressEvent, Scene, VideoGenerationOptions};
use storyreel_error::GenerationErrorKind;
use storyreel_retry::{GenerationConfig, RetryConfig};
use storyreel_script::ScriptOrchestrator;
use test_utils::{MockDriver, MockResponse, batch_response};
use tokio::time::Instant;

fn options(prompt_count: u32) -> VideoGenerationOptions {
    VideoGenerationOptions::builder()
        .idea("A girl follows a paper boat through a flooded city")
        .style("Studio Ghibli watercolor")
        .prompt_count(prompt_count)
        .dialogue_language(DialogueLanguage::English)
        .build()
        .unwrap()
}

fn orchestrator(responses: Vec<MockResponse>) -> ScriptOrchestrator<MockDriver> {
    ScriptOrchestrator::new(
        MockDriver::new_sequence(responses),
        GenerationConfig::default(),
        RetryConfig::default(),
    )
}

#[tokio::test(start_paused = true)]
async fn test_23_scenes_in_three_batches() -> anyhow::Result<()> {
    // The model numbers every scene 1 and returns too many in batch 2
    let orchestrator = orchestrator(vec![
        MockResponse::Success(batch_response("A boat finds its way home.", 10, 1)),
        MockResponse::Success(batch_response("A different summary.", 12, 1)),
        MockResponse::Success(batch_response("Yet another summary.", 3, 1)),
    ]);
    let events = Mutex::new(Vec::new());
    let sink = |event: &ProgressEvent| events.lock().unwrap().push(event.clone());
    let started = Instant::now();

    let script = orchestrator.generate(&options(23), &sink).await?;

    let numbers: Vec<u32> = script.scenes().iter().map(|s| *s.scene_number()).collect();
    assert_eq!(numbers, (1..=23).collect::<Vec<_>>());
    assert_eq!(script.story_summary(), "A boat finds its way home.");
    assert_eq!(orchestrator.driver().call_count(), 3);

    let prompts = orchestrator.driver().prompts();
    assert!(prompts[0].contains("Write exactly 10 scenes, numbered 1 to 10"));
    assert!(prompts[1].contains("Write exactly 10 scenes, numbered 11 to 20"));
    assert!(prompts[2].contains("Write exactly 3 scenes, numbered 21 to 23"));

    // Two cool-downs between three batches
    assert_eq!(started.elapsed(), Duration::from_secs(10));

    let events = events.lock().unwrap();
    let batches: Vec<(usize, u32, u32)> = events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::BatchStarted {
                batch,
                first_scene,
                last_scene,
                ..
            } => Some((*batch, *first_scene, *last_scene)),
            _ => None,
        })
        .collect();
    assert_eq!(batches, vec![(1, 1, 10), (2, 11, 20), (3, 21, 23)]);
    let cooldowns = events
        .iter()
        .filter(|e| matches!(e, ProgressEvent::CoolingDown { .. }))
        .count();
    assert_eq!(cooldowns, 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_short_batch_is_topped_up() -> anyhow::Result<()> {
    let orchestrator = orchestrator(vec![
        MockResponse::Success(batch_response("A boat finds its way home.", 7, 1)),
        MockResponse::Success(batch_response("s", 10, 1)),
        MockResponse::Success(batch_response("s", 6, 1)),
    ]);
    let started = Instant::now();

    let script = orchestrator.generate(&options(23), &()).await?;

    let numbers: Vec<u32> = script.scenes().iter().map(|s| *s.scene_number()).collect();
    assert_eq!(numbers, (1..=23).collect::<Vec<_>>());
    let prompts = orchestrator.driver().prompts();
    assert!(prompts[0].contains("Write exactly 10 scenes, numbered 1 to 10"));
    assert!(prompts[1].contains("Write exactly 10 scenes, numbered 8 to 17"));
    assert!(prompts[2].contains("Write exactly 6 scenes, numbered 18 to 23"));
    assert_eq!(started.elapsed(), Duration::from_secs(10));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_persistently_short_batches_fail() -> anyhow::Result<()> {
    let orchestrator = orchestrator(vec![
        MockResponse::Success(batch_response("s", 1, 1)),
        MockResponse::Success(batch_response("s", 1, 1)),
        MockResponse::Success(batch_response("never used", 1, 1)),
    ]);

    let err = orchestrator.generate(&options(3), &()).await.unwrap_err();

    match err.generation_kind() {
        Some(GenerationErrorKind::BatchFailed { batch, message, .. }) => {
            assert_eq!(*batch, 2);
            assert!(message.contains("only 2 of 3 scenes"));
        }
        other => panic!("expected BatchFailed, got {:?}", other),
    }
    assert_eq!(orchestrator.driver().call_count(), 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_later_batches_carry_summary_and_continuity() -> anyhow::Result<()> {
    let orchestrator = orchestrator(vec![
        MockResponse::Success(batch_response("A boat finds its way home.", 10, 1)),
        MockResponse::Success(batch_response("ignored", 2, 1)),
    ]);

    orchestrator.generate(&options(12), &()).await?;

    let prompts = orchestrator.driver().prompts();
    assert!(prompts[0].contains("Start the story"));
    assert!(prompts[1].contains("Story so far: A boat finds its way home."));
    assert!(prompts[1].contains(
        "Continuity: The previous scene ended at location 10, where Mai was step 10."
    ));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_scene_json_is_single_line_and_numbered() -> anyhow::Result<()> {
    let orchestrator = orchestrator(vec![MockResponse::Success(batch_response("s", 2, 9))]);

    let script = orchestrator.generate(&options(2), &()).await?;

    for (i, scene) in script.scenes().iter().enumerate() {
        assert!(!scene.json_prompt().contains('\n'));
        assert!(!scene.generation_prompt().contains('\n'));
        let value: serde_json::Value = serde_json::from_str(scene.json_prompt())?;
        assert_eq!(value["scene"], serde_json::json!(i + 1));
        assert_eq!(value["style"], "Studio Ghibli watercolor");
        assert!(scene.script_description().starts_with(&format!("Scene {} (0s-5s)", i + 1)));
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_failing_batch_aborts_remaining() -> anyhow::Result<()> {
    let orchestrator = orchestrator(vec![
        MockResponse::Success(batch_response("summary", 10, 1)),
        MockResponse::Error(GenerationErrorKind::Http {
            status_code: 400,
            message: "API key not valid".to_string(),
        }),
        MockResponse::Success(batch_response("never used", 5, 1)),
    ]);

    let err = orchestrator.generate(&options(25), &()).await.unwrap_err();

    match err.generation_kind() {
        Some(GenerationErrorKind::BatchFailed {
            batch,
            total_batches,
            message,
        }) => {
            assert_eq!(*batch, 2);
            assert_eq!(*total_batches, 3);
            assert!(message.contains("API key not valid"));
        }
        other => panic!("expected BatchFailed, got {:?}", other),
    }
    assert_eq!(orchestrator.driver().call_count(), 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_transient_failure_retried_within_batch() -> anyhow::Result<()> {
    let orchestrator = orchestrator(vec![
        MockResponse::Error(GenerationErrorKind::Overloaded("The model is overloaded".into())),
        MockResponse::Success(batch_response("summary", 3, 1)),
    ]);
    let started = Instant::now();

    let script = orchestrator.generate(&options(3), &()).await?;

    assert_eq!(script.scenes().len(), 3);
    assert_eq!(orchestrator.driver().call_count(), 2);
    assert_eq!(started.elapsed(), Duration::from_secs(5));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_malformed_response_names_batch() -> anyhow::Result<()> {
    let orchestrator = orchestrator(vec![MockResponse::Success(
        "Sorry, I can't write that story.".to_string(),
    )]);

    let err = orchestrator.generate(&options(4), &()).await.unwrap_err();
    assert!(matches!(
        err.generation_kind(),
        Some(GenerationErrorKind::BatchFailed { batch: 1, total_batches: 1, .. })
    ));
    assert_eq!(orchestrator.driver().call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_extend_continues_numbering() -> anyhow::Result<()> {
    let orchestrator = orchestrator(vec![MockResponse::Success(batch_response("", 5, 1))]);
    let last = Scene::new(23, "Scene 23 (0s-5s) | Setting: harbor", "{}", "harbor");

    let scenes = orchestrator
        .extend(&last, "a storm rolls in", 5, &options(23), &())
        .await?;

    let numbers: Vec<u32> = scenes.iter().map(|s| *s.scene_number()).collect();
    assert_eq!(numbers, vec![24, 25, 26, 27, 28]);
    let prompt = &orchestrator.driver().prompts()[0];
    assert!(prompt.contains("Scene 23 (0s-5s) | Setting: harbor"));
    assert!(prompt.contains("a storm rolls in"));
    Ok(())
}

#[tokio::test]
async fn test_extend_zero_count_makes_no_call() {
    let orchestrator = orchestrator(vec![]);
    let last = Scene::new(3, "Scene 3", "{}", "x");

    assert!(orchestrator.extend(&last, "", 0, &options(3), &()).await.is_err());
    assert_eq!(orchestrator.driver().call_count(), 0);
}
