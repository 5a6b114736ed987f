mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use growthflow::domains::chat::ChatRole;
use growthflow::domains::intake::IntakeRecord;
use growthflow::domains::strategy::StrategyKind;
use growthflow::error::GrowthFlowError;
use growthflow::prompts::{AUDITOR_SYSTEM_PROMPT, INITIAL_STATUS};
use growthflow::session_fsm::SessionStep;

use common::{
    controller, nexus_labs_intake, storefront_intake, strategy_body, FailingLlmProvider,
    GatedLlmProvider, QueueLlmProvider,
};

#[tokio::test]
async fn valid_submission_reaches_dashboard_with_one_request() {
    let provider = Arc::new(QueueLlmProvider::new(vec![Ok(strategy_body("seo"))]));
    let session = controller(provider.clone());

    assert_eq!(session.step().await, SessionStep::Welcome);
    session.begin().await.unwrap();
    assert_eq!(session.step().await, SessionStep::Onboarding);

    let strategy = session.submit_intake(storefront_intake()).await.unwrap();

    assert_eq!(provider.structured_count(), 1);
    assert_eq!(session.step().await, SessionStep::Dashboard);
    assert_eq!(strategy.kind, StrategyKind::Seo);
    assert_eq!(strategy.display_score(), 42);
    let days: Vec<u32> = strategy.roadmap.iter().map(|task| task.day).collect();
    assert_eq!(days, vec![1, 2]);

    let call = provider.structured_calls.lock().unwrap()[0].clone();
    assert_eq!(call.system_prompt, AUDITOR_SYSTEM_PROMPT);
    assert!(call.prompt.contains("- Name: Copper Kettle Coffee"));
    assert!(call.prompt.contains("https://copperkettle.example"));
    assert_eq!(call.json_schema["title"], "growth_strategy");

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.intake, Some(storefront_intake()));
    assert!(snapshot.strategy.is_some());
    assert!(!session.status_ticker_running());
}

#[tokio::test]
async fn greeting_seeds_history_with_name_and_score() {
    let provider = Arc::new(QueueLlmProvider::new(vec![Ok(strategy_body("seo"))]));
    let session = controller(provider);
    session.begin().await.unwrap();
    session.submit_intake(storefront_intake()).await.unwrap();

    let history = session.history().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].role, ChatRole::Advisor);
    assert!(history[0].text.contains("Copper Kettle Coffee"));
    assert!(history[0].text.contains("42/100"));
}

#[tokio::test]
async fn failed_generation_returns_to_onboarding_with_intake_kept() {
    let provider = Arc::new(FailingLlmProvider::default());
    let session = controller(provider.clone());
    session.begin().await.unwrap();

    let err = session.submit_intake(storefront_intake()).await.unwrap_err();

    assert!(matches!(err, GrowthFlowError::GenerationFailed(_)));
    assert!(err.is_generation_failure());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    assert_eq!(session.step().await, SessionStep::Onboarding);
    assert_eq!(session.intake().await, Some(storefront_intake()));
    assert!(session.strategy().await.is_none());
    assert!(session.history().await.is_empty());
    assert!(!session.status_ticker_running());
}

#[tokio::test]
async fn unparsable_reply_fails_and_allows_resubmission() {
    let provider = Arc::new(QueueLlmProvider::new(vec![
        Ok("I'm sorry, I can't help with that.".to_string()),
        Ok(format!("```json\n{}\n```", strategy_body("seo"))),
    ]));
    let session = controller(provider.clone());
    session.begin().await.unwrap();

    let err = session.submit_intake(storefront_intake()).await.unwrap_err();
    assert!(matches!(err, GrowthFlowError::GenerationFailed(_)));
    assert_eq!(session.step().await, SessionStep::Onboarding);

    let retry = session.intake().await.unwrap();
    session.submit_intake(retry).await.unwrap();
    assert_eq!(provider.structured_count(), 2);
    assert_eq!(session.step().await, SessionStep::Dashboard);
}

#[tokio::test]
async fn reply_missing_required_fields_is_a_failure() {
    let mut partial = common::strategy_value("seo");
    partial.as_object_mut().unwrap().remove("roadmap");
    let provider = Arc::new(QueueLlmProvider::new(vec![Ok(partial.to_string())]));
    let session = controller(provider);
    session.begin().await.unwrap();

    let err = session.submit_intake(storefront_intake()).await.unwrap_err();
    assert!(matches!(err, GrowthFlowError::GenerationFailed(_)));
    assert_eq!(session.step().await, SessionStep::Onboarding);
}

#[tokio::test]
async fn invalid_intake_sends_nothing() {
    let provider = Arc::new(QueueLlmProvider::new(vec![Ok(strategy_body("seo"))]));
    let session = controller(provider.clone());
    session.begin().await.unwrap();

    let intake = IntakeRecord {
        business_name: "   ".to_string(),
        ..storefront_intake()
    };
    let err = session.submit_intake(intake).await.unwrap_err();

    assert!(matches!(err, GrowthFlowError::Validation(ref msg) if msg.contains("businessName")));
    assert_eq!(provider.structured_count(), 0);
    assert_eq!(session.step().await, SessionStep::Onboarding);
    assert!(session.intake().await.is_none());
}

#[tokio::test]
async fn submission_outside_onboarding_is_rejected() {
    let provider = Arc::new(QueueLlmProvider::new(vec![
        Ok(strategy_body("seo")),
        Ok(strategy_body("seo")),
    ]));
    let session = controller(provider.clone());

    let err = session.submit_intake(storefront_intake()).await.unwrap_err();
    assert!(matches!(err, GrowthFlowError::Transition(_)));
    assert_eq!(provider.structured_count(), 0);

    session.begin().await.unwrap();
    session.submit_intake(storefront_intake()).await.unwrap();
    let err = session.submit_intake(storefront_intake()).await.unwrap_err();
    assert!(matches!(err, GrowthFlowError::Transition(_)));
    assert_eq!(provider.structured_count(), 1);
    assert_eq!(session.step().await, SessionStep::Dashboard);
}

#[tokio::test]
async fn ticker_runs_only_while_processing() {
    let provider = Arc::new(GatedLlmProvider::new(strategy_body("seo")));
    let session = Arc::new(controller(provider.clone()));
    session.begin().await.unwrap();
    let status = session.subscribe_status();

    let pending = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.submit_intake(storefront_intake()).await })
    };
    provider.entered.notified().await;

    assert_eq!(session.step().await, SessionStep::Processing);
    assert!(session.status_ticker_running());
    assert_eq!(*status.borrow(), INITIAL_STATUS);

    let second = session.submit_intake(storefront_intake()).await.unwrap_err();
    assert!(matches!(second, GrowthFlowError::Transition(_)));

    provider.gate.notify_one();
    pending.await.unwrap().unwrap();
    assert_eq!(session.step().await, SessionStep::Dashboard);
    assert!(!session.status_ticker_running());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn no_website_intake_is_steered_to_social() {
    let provider = Arc::new(QueueLlmProvider::new(vec![Ok(strategy_body("social"))]));
    let session = controller(provider.clone());
    session.begin().await.unwrap();

    let strategy = session.submit_intake(nexus_labs_intake()).await.unwrap();

    let call = provider.structured_calls.lock().unwrap()[0].clone();
    assert!(call.prompt.to_lowercase().contains("no website"));
    assert!(call.prompt.contains(r#"set "type" to "social""#));
    assert_eq!(strategy.kind, StrategyKind::Social);
}

#[tokio::test]
async fn dashboard_view_tracks_roadmap_completion() {
    let provider = Arc::new(QueueLlmProvider::new(vec![Ok(strategy_body("seo"))]));
    let session = controller(provider);
    session.begin().await.unwrap();

    let err = session
        .with_dashboard(|view, strategy| view.toggle_task(strategy, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, GrowthFlowError::Transition(_)));

    session.submit_intake(storefront_intake()).await.unwrap();
    let done = session
        .with_dashboard(|view, strategy| view.toggle_task(strategy, 1))
        .await
        .unwrap();
    assert!(done);
    let percent = session
        .with_dashboard(|view, strategy| Ok(view.progress_percent(strategy)))
        .await
        .unwrap();
    assert_eq!(percent, 50);
}

#[tokio::test]
async fn abandoned_submission_clears_ticker_and_reopens_onboarding() {
    let provider = Arc::new(GatedLlmProvider::new(strategy_body("seo")));
    let session = Arc::new(controller(provider.clone()));
    session.begin().await.unwrap();

    let pending = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.submit_intake(storefront_intake()).await })
    };
    provider.entered.notified().await;
    assert!(session.status_ticker_running());

    pending.abort();
    assert!(pending.await.unwrap_err().is_cancelled());

    assert!(!session.status_ticker_running());
    assert_eq!(session.step().await, SessionStep::Onboarding);
    assert_eq!(session.intake().await, Some(storefront_intake()));

    provider.gate.notify_one();
    let retry = session.intake().await.unwrap();
    session.submit_intake(retry).await.unwrap();
    assert_eq!(session.step().await, SessionStep::Dashboard);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
}
