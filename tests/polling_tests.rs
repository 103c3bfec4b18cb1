//! OOB polling tests, run on paused tokio time.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{
    binding, context_with, pending_response, token_response, CancelOnSendExecutor, SlowExecutor,
    TimedExecutor, TokioClock,
};
use direct_auth_integration::{
    BindingContext, BindingMethod, DirectAuthenticationState, GrantType, MockApiExecutor,
    OobChannel, OobPending, Transfer,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[tokio::test(start_paused = true)]
async fn test_polls_until_authenticated() {
    let mock = MockApiExecutor::new();
    for _ in 0..3 {
        mock.queue_response(pending_response());
    }
    mock.queue_response(token_response());
    let executor = Arc::new(TimedExecutor::new(mock));
    let context = context_with(executor.clone(), Arc::new(TokioClock::new(1_000)));
    let mut events = context.subscribe();
    let pending = OobPending::new(binding(BindingMethod::None, None, 120), context.clone(), None);

    let started = Instant::now();
    let state = pending.proceed().await;

    assert_eq!(
        state.token().map(|t| t.access_token.as_str()),
        Some("access-123")
    );
    assert_eq!(context.current_state(), state);

    let mut published = Vec::new();
    while let Ok(event) = events.try_recv() {
        published.push(event);
    }
    assert_eq!(published.len(), 4);
    assert!(published[..3]
        .iter()
        .all(|s| *s == DirectAuthenticationState::AuthorizationPending));
    assert_eq!(published[3], state);

    let sent_at = executor.sent_at();
    assert_eq!(sent_at.len(), 4);
    assert_eq!(sent_at[0], started);
    for pair in sent_at.windows(2) {
        assert_eq!(pair[1] - pair[0], Duration::from_secs(5));
    }
}

#[tokio::test(start_paused = true)]
async fn test_times_out_at_deadline() {
    let mock = MockApiExecutor::new();
    mock.set_default_response(pending_response());
    let executor = Arc::new(TimedExecutor::new(mock));
    let context = context_with(executor.clone(), Arc::new(TokioClock::new(1_000)));
    let pending = OobPending::new(binding(BindingMethod::None, None, 12), context.clone(), None);

    let started = Instant::now();
    let state = pending.proceed().await;

    let error = state.error().expect("timeout error");
    assert!(error.is_timeout());
    assert_eq!(error.error_code(), "EXCEPTION");
    assert_eq!(
        error.to_string(),
        "Internal error: EXCEPTION: Polling timed out after 12 seconds."
    );
    assert_eq!(context.current_state(), state);

    // Sent at 0s, 5s and 10s; the last wait is clipped to the deadline.
    assert_eq!(executor.sent_at().len(), 3);
    assert_eq!(started.elapsed(), Duration::from_secs(12));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_while_waiting() {
    let mock = MockApiExecutor::new();
    mock.set_default_response(pending_response());
    let executor = Arc::new(TimedExecutor::new(mock));
    let context = context_with(executor.clone(), Arc::new(TokioClock::new(1_000)));
    let pending = OobPending::new(binding(BindingMethod::None, None, 120), context.clone(), None);

    let cancel = CancellationToken::new();
    let task = {
        let cancel = cancel.clone();
        tokio::spawn(async move { pending.proceed_with_cancellation(&cancel).await })
    };

    tokio::time::sleep(Duration::from_secs(7)).await;
    cancel.cancel();
    let state = task.await.unwrap();

    assert_eq!(state, DirectAuthenticationState::Canceled);
    assert_eq!(context.current_state(), DirectAuthenticationState::Canceled);
    assert_eq!(executor.sent_at().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_zero_interval_polls_once_per_second() {
    let mock = MockApiExecutor::new();
    mock.set_default_response(pending_response());
    let executor = Arc::new(TimedExecutor::new(mock));
    let context = context_with(executor.clone(), Arc::new(TokioClock::new(1_000)));
    let binding = BindingContext::new(
        "c1",
        3,
        Some(0),
        OobChannel::Push,
        BindingMethod::None,
        None,
        GrantType::Oob,
    )
    .unwrap();
    let pending = OobPending::new(binding, context, None);

    let state = tokio::time::timeout(Duration::from_secs(10), pending.proceed())
        .await
        .expect("polling must yield between attempts");

    assert!(state.error().expect("timeout error").is_timeout());
    let sent_at = executor.sent_at();
    assert_eq!(sent_at.len(), 3);
    for pair in sent_at.windows(2) {
        assert_eq!(pair[1] - pair[0], Duration::from_secs(1));
    }
}

#[tokio::test(start_paused = true)]
async fn test_cancel_while_request_in_flight() {
    let mock = MockApiExecutor::new();
    mock.set_default_response(pending_response());
    let executor = Arc::new(SlowExecutor::new(mock, Duration::from_secs(10)));
    let context = context_with(executor.clone(), Arc::new(TokioClock::new(1_000)));
    let mut events = context.subscribe();
    let pending = OobPending::new(binding(BindingMethod::None, None, 120), context.clone(), None);

    let cancel = CancellationToken::new();
    let task = {
        let cancel = cancel.clone();
        tokio::spawn(async move { pending.proceed_with_cancellation(&cancel).await })
    };

    tokio::time::sleep(Duration::from_secs(2)).await;
    cancel.cancel();
    let state = task.await.unwrap();

    assert_eq!(state, DirectAuthenticationState::Canceled);
    assert_eq!(context.current_state(), DirectAuthenticationState::Canceled);
    assert_eq!(executor.requests().len(), 1);

    let mut published = Vec::new();
    while let Ok(event) = events.try_recv() {
        published.push(event);
    }
    assert_eq!(published, vec![DirectAuthenticationState::Canceled]);
}

#[tokio::test(start_paused = true)]
async fn test_authenticated_wins_over_same_turn_cancel() {
    let cancel = CancellationToken::new();
    let mock = MockApiExecutor::new();
    mock.queue_response(token_response());
    let executor = Arc::new(CancelOnSendExecutor::new(mock, cancel.clone()));
    let context = context_with(executor, Arc::new(TokioClock::new(1_000)));
    let mut events = context.subscribe();
    let pending = OobPending::new(binding(BindingMethod::None, None, 120), context.clone(), None);

    let state = pending.proceed_with_cancellation(&cancel).await;

    assert!(cancel.is_cancelled());
    assert!(matches!(state, DirectAuthenticationState::Authenticated { .. }));
    assert_eq!(context.current_state(), state);

    let mut published = Vec::new();
    while let Ok(event) = events.try_recv() {
        published.push(event);
    }
    assert_eq!(published, vec![state]);
}

#[tokio::test(start_paused = true)]
async fn test_watch_observes_latest_state() {
    let mock = MockApiExecutor::new();
    mock.queue_response(pending_response());
    mock.queue_response(token_response());
    let executor = Arc::new(TimedExecutor::new(mock));
    let context = context_with(executor.clone(), Arc::new(TokioClock::new(0)));
    let mut watcher = context.watch();
    let transfer = Transfer::new(
        binding(BindingMethod::Transfer, Some("42"), 60),
        context.clone(),
        None,
    );

    let task = tokio::spawn(async move { transfer.proceed().await });

    watcher.changed().await.unwrap();
    assert_eq!(
        *watcher.borrow_and_update(),
        DirectAuthenticationState::AuthorizationPending
    );

    let state = task.await.unwrap();
    assert!(matches!(state, DirectAuthenticationState::Authenticated { .. }));
    assert_eq!(*watcher.borrow(), state);

    for request in executor.requests() {
        assert_eq!(request.form_parameter("binding_code").as_deref(), Some("42"));
    }
}
