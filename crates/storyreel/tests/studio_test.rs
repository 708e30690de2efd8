// License gating of script generation through the Studio facade.

mod test_utils;

use chrono::{Duration, Utc};
use std::sync::Arc;
use storyreel::{
    ActivationPhase, ActivationSource, GenerationConfig, LicenseErrorKind, LicenseGuard,
    MemoryActivationStore, RetryConfig, ScriptOrchestrator, StoryreelErrorKind, Studio,
    VerificationErrorKind, VerificationOutcome, VideoGenerationOptions,
};
use test_utils::{CountingDriver, FixedAuthority, test_codec};

type TestStudio = Studio<FixedAuthority, MemoryActivationStore, Arc<CountingDriver>>;

fn studio(outcome: VerificationOutcome, driver: &Arc<CountingDriver>) -> TestStudio {
    let guard = Arc::new(LicenseGuard::new(
        FixedAuthority::new(outcome),
        MemoryActivationStore::new(),
        test_codec(),
    ));
    let orchestrator = ScriptOrchestrator::new(
        Arc::clone(driver),
        GenerationConfig::default(),
        RetryConfig::default(),
    );
    Studio::new(guard, orchestrator)
}

fn options() -> VideoGenerationOptions {
    VideoGenerationOptions::builder()
        .idea("A courier crosses Hanoi at night")
        .style("neon noir")
        .prompt_count(3u32)
        .build()
        .unwrap()
}

fn is_locked_error(err: &storyreel::StoryreelError) -> bool {
    matches!(
        err.kind(),
        StoryreelErrorKind::License(e) if e.kind == LicenseErrorKind::Locked
    )
}

#[tokio::test]
async fn test_generation_refused_while_locked() -> anyhow::Result<()> {
    let driver = Arc::new(CountingDriver::new(3));
    let studio = studio(VerificationOutcome::Valid, &driver);

    let state = studio.check_saved_key().await;
    assert_eq!(state.phase, ActivationPhase::Locked);

    let err = studio.generate_script(&options(), &()).await.unwrap_err();
    assert!(is_locked_error(&err));
    assert_eq!(driver.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_generation_after_online_activation() -> anyhow::Result<()> {
    let driver = Arc::new(CountingDriver::new(3));
    let studio = studio(VerificationOutcome::Valid, &driver);

    let outcome = studio.submit_key("reel-anything-pro-abc").await;
    assert!(outcome.ok);
    assert_eq!(studio.guard().state().source, ActivationSource::Online);

    let script = studio.generate_script(&options(), &()).await?;
    let numbers: Vec<u32> = script.scenes().iter().map(|s| *s.scene_number()).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert_eq!(script.story_summary(), "Linh walks home.");
    assert_eq!(driver.call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_extension_refused_after_logout() -> anyhow::Result<()> {
    let driver = Arc::new(CountingDriver::new(3));
    let studio = studio(VerificationOutcome::Valid, &driver);
    assert!(studio.submit_key("REEL-X-PRO-1").await.ok);

    let script = studio.generate_script(&options(), &()).await?;
    let last = script.last_scene().cloned().unwrap();
    studio.logout();

    let err = studio
        .extend_script(&last, "the rain stops", 2, &options(), &())
        .await
        .unwrap_err();
    assert!(is_locked_error(&err));
    assert_eq!(driver.call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_offline_key_unlocks_until_expiry_sweep() -> anyhow::Result<()> {
    let driver = Arc::new(CountingDriver::new(2));
    let studio = studio(
        VerificationOutcome::Indeterminate(VerificationErrorKind::Network(
            "connection refused".to_string(),
        )),
        &driver,
    );
    let key = test_codec().issue(Some(Utc::now() + Duration::days(1)), "PRO");

    let outcome = studio.submit_key(&key).await;
    assert!(outcome.ok, "{:?}", outcome.message);
    assert_eq!(studio.guard().state().source, ActivationSource::Offline);

    let extended = studio
        .extend_script(
            &storyreel::Scene::new(7, "Scene 7 (0s-5s)", "{}", "prompt"),
            "",
            2,
            &options(),
            &(),
        )
        .await?;
    let numbers: Vec<u32> = extended.iter().map(|s| *s.scene_number()).collect();
    assert_eq!(numbers, vec![8, 9]);

    assert!(studio.guard().sweep_at(Utc::now() + Duration::days(2)));
    assert_eq!(studio.guard().state().phase, ActivationPhase::Locked);

    let err = studio.generate_script(&options(), &()).await.unwrap_err();
    assert!(is_locked_error(&err));
    Ok(())
}
