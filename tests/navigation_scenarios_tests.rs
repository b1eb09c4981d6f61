mod common;

use common::{Harness, advance_ms};
use simple_navigator::{LogAction, Outcome, SurfaceEvent, TabGateway};
use simple_navigator_config::{COMMAND_GO_BACK_OR_CLOSE, COMMAND_GO_FORWARD, Config};
use tokio::sync::mpsc;

async fn back(h: &Harness) -> Outcome {
    h.router.dispatch_command(COMMAND_GO_BACK_OR_CLOSE).await.unwrap()
}

async fn forward(h: &Harness) -> Outcome {
    h.router.dispatch_command(COMMAND_GO_FORWARD).await.unwrap()
}

// ─── Back-or-close ───

#[tokio::test(start_paused = true)]
async fn test_empty_history_arms_then_closes() {
    let mut h = Harness::new();
    let keep = h.browser.open_tab("https://keep.example");
    let tab = h.browser.open_tab("https://single.example");

    assert_eq!(back(&h).await, Outcome::CloseArmed(tab));
    assert_eq!(h.log_actions(), vec![LogAction::AwaitClose]);
    assert!(h.state().confirmations.is_close_armed(tab));
    assert_eq!(h.browser.tabs().len(), 2);

    advance_ms(2000).await;
    assert_eq!(
        back(&h).await,
        Outcome::TabClosed {
            tab,
            returned_to: None
        }
    );
    h.pump_host_events();

    assert_eq!(h.log_actions(), vec![LogAction::CloseTab, LogAction::AwaitClose]);
    assert_eq!(h.state().confirmations.pending_close_count(), 0);
    assert_eq!(h.browser.active_tab_id(), Some(keep));
    let detail = &h.state().status.snapshot().navigation_logs[0].detail;
    assert_eq!(detail, "Shortcut Back → History exhausted, closing active tab");
}

#[tokio::test(start_paused = true)]
async fn test_close_window_expires_after_four_seconds() {
    let h = Harness::new();
    let tab = h.browser.open_tab("https://single.example");

    back(&h).await;
    advance_ms(3999).await;
    assert!(h.state().confirmations.is_close_armed(tab));

    advance_ms(1).await;
    assert!(!h.state().confirmations.is_close_armed(tab));
    assert_eq!(back(&h).await, Outcome::CloseArmed(tab));
    assert_eq!(h.browser.tabs().len(), 1);
    assert_eq!(
        h.log_actions(),
        vec![LogAction::AwaitClose, LogAction::AwaitClose]
    );
}

#[tokio::test(start_paused = true)]
async fn test_rearming_does_not_duplicate_pending_close() {
    let h = Harness::new();
    let tab = h.browser.open_tab("https://single.example");

    back(&h).await;
    advance_ms(4000).await;
    back(&h).await;
    assert_eq!(h.state().confirmations.pending_close_count(), 1);

    // The re-armed window runs its full length.
    advance_ms(3500).await;
    assert!(matches!(back(&h).await, Outcome::TabClosed { tab: t, .. } if t == tab));
}

#[tokio::test(start_paused = true)]
async fn test_back_navigation_clears_pending_close() {
    let h = Harness::new();
    let tab = h.open_with_history(&["https://a.example", "https://b.example"]);
    h.state().confirmations.arm_close(tab);

    assert_eq!(back(&h).await, Outcome::NavigatedBack(tab));
    assert!(!h.state().confirmations.is_close_armed(tab));
    assert_eq!(h.browser.history(tab).unwrap().1, 0);
    assert_eq!(h.log_actions(), vec![LogAction::Back]);
}

#[tokio::test(start_paused = true)]
async fn test_forward_entries_do_not_hide_exhausted_back_history() {
    let h = Harness::new();
    let tab = h.open_with_history(&["https://a.example", "https://b.example"]);
    h.browser.go_back(tab).await.unwrap();

    // Stack length is 2, but there is nothing behind the current entry.
    assert_eq!(back(&h).await, Outcome::CloseArmed(tab));
    let detail = &h.state().status.snapshot().navigation_logs[0].detail;
    assert_eq!(
        detail,
        "Shortcut Back → Unable to go back, waiting for confirmation to close"
    );
    assert!(matches!(back(&h).await, Outcome::TabClosed { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_privileged_page_follows_navigation_result() {
    let h = Harness::new();
    let tab = h.browser.open_tab("chrome://newtab");

    assert_eq!(back(&h).await, Outcome::CloseArmed(tab));
    assert!(matches!(back(&h).await, Outcome::TabClosed { .. }));
    assert!(h.browser.tabs().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_tab_close_can_be_disabled() {
    let h = Harness::with_config(Config {
        enable_tab_close: false,
        ..Config::default()
    });
    let tab = h.browser.open_tab("https://single.example");

    assert_eq!(back(&h).await, Outcome::CloseDisabled(tab));
    assert_eq!(back(&h).await, Outcome::CloseDisabled(tab));
    assert_eq!(h.browser.tabs().len(), 1);
    assert!(h.log_actions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_no_active_tab_is_silent() {
    let mut h = Harness::new();
    assert_eq!(back(&h).await, Outcome::NoActiveTab);
    assert_eq!(forward(&h).await, Outcome::NoActiveTab);
    assert!(h.log_actions().is_empty());
    assert!(h.drain_popup().is_empty());
}

// ─── Forward-or-reopen ───

#[tokio::test(start_paused = true)]
async fn test_reopen_then_close_returns_to_source() {
    let mut h = Harness::new();
    let source = h.open_with_history(&["https://source.example"]);
    let doomed = h.browser.open_tab("https://doomed.example");
    h.browser.remove_tab(doomed).unwrap();
    h.pump_host_events();
    h.browser.switch_to(source).unwrap();

    assert_eq!(forward(&h).await, Outcome::ReopenArmed(source));
    assert_eq!(h.log_actions()[0], LogAction::AwaitReopen);

    let Outcome::TabReopened {
        source: from,
        reopened: Some(reopened),
    } = forward(&h).await
    else {
        panic!("expected a reopened tab");
    };
    assert_eq!(from, source);
    assert_eq!(h.log_actions()[0], LogAction::ReopenTab);
    assert_eq!(h.browser.active_tab_id(), Some(reopened));

    // The restored page has no history behind it.
    assert_eq!(back(&h).await, Outcome::CloseArmed(reopened));
    assert_eq!(
        back(&h).await,
        Outcome::TabClosed {
            tab: reopened,
            returned_to: Some(source)
        }
    );
    h.pump_host_events();

    assert_eq!(h.browser.active_tab_id(), Some(source));
    assert_eq!(h.state().confirmations.take_provenance(reopened), None);
}

#[tokio::test(start_paused = true)]
async fn test_reopen_with_nothing_closed() {
    let h = Harness::new();
    let tab = h.browser.open_tab("https://only.example");

    forward(&h).await;
    assert_eq!(
        forward(&h).await,
        Outcome::TabReopened {
            source: tab,
            reopened: None
        }
    );
    assert_eq!(h.browser.tabs().len(), 1);
    assert_eq!(h.state().confirmations.reopen_target(), None);
}

#[tokio::test(start_paused = true)]
async fn test_reopen_slot_moves_to_latest_tab() {
    let h = Harness::new();
    let a = h.browser.open_tab("https://a.example");
    let b = h.browser.open_tab("https://b.example");

    h.browser.switch_to(a).unwrap();
    assert_eq!(forward(&h).await, Outcome::ReopenArmed(a));
    h.browser.switch_to(b).unwrap();
    assert_eq!(forward(&h).await, Outcome::ReopenArmed(b));

    // A's window was replaced, so A starts over.
    h.browser.switch_to(a).unwrap();
    assert_eq!(forward(&h).await, Outcome::ReopenArmed(a));
    assert!(!h.state().confirmations.is_reopen_armed(b));
}

#[tokio::test(start_paused = true)]
async fn test_reopen_window_expires() {
    let h = Harness::new();
    let tab = h.browser.open_tab("https://only.example");

    forward(&h).await;
    advance_ms(4000).await;
    assert_eq!(forward(&h).await, Outcome::ReopenArmed(tab));
}

#[tokio::test(start_paused = true)]
async fn test_forward_navigation_clears_pending_reopen() {
    let h = Harness::new();
    let tab = h.open_with_history(&["https://a.example", "https://b.example"]);
    h.browser.go_back(tab).await.unwrap();
    h.state().confirmations.arm_reopen(tab);

    assert_eq!(forward(&h).await, Outcome::NavigatedForward(tab));
    assert_eq!(h.state().confirmations.reopen_target(), None);
    assert_eq!(h.log_actions(), vec![LogAction::Forward]);
}

#[tokio::test(start_paused = true)]
async fn test_confirmation_tracks_are_independent() {
    let h = Harness::new();
    let a = h.browser.open_tab("https://a.example");
    let b = h.open_with_history(&["https://b1.example", "https://b2.example"]);

    h.browser.switch_to(a).unwrap();
    forward(&h).await;
    back(&h).await;
    assert!(h.state().confirmations.is_reopen_armed(a));
    assert!(h.state().confirmations.is_close_armed(a));

    h.browser.switch_to(b).unwrap();
    assert_eq!(back(&h).await, Outcome::NavigatedBack(b));
    assert!(h.state().confirmations.is_reopen_armed(a));
    assert!(h.state().confirmations.is_close_armed(a));
}

#[tokio::test(start_paused = true)]
async fn test_interleaved_commands_keep_both_windows() {
    let h = Harness::new();
    let tab = h.browser.open_tab("https://only.example");

    let (back_outcome, forward_outcome) = tokio::join!(back(&h), forward(&h));
    assert_eq!(back_outcome, Outcome::CloseArmed(tab));
    assert_eq!(forward_outcome, Outcome::ReopenArmed(tab));
    assert!(h.state().confirmations.is_close_armed(tab));
    assert!(h.state().confirmations.is_reopen_armed(tab));
}

// ─── Host notifications ───

#[tokio::test(start_paused = true)]
async fn test_external_close_clears_tab_state() {
    let mut h = Harness::new();
    let other = h.browser.open_tab("https://other.example");
    let tab = h.browser.open_tab("https://single.example");

    back(&h).await;
    forward(&h).await;
    h.state().confirmations.record_provenance(tab, other);

    h.browser.remove_tab(tab).unwrap();
    h.pump_host_events();

    assert_eq!(h.state().confirmations.pending_close_count(), 0);
    assert_eq!(h.state().confirmations.reopen_target(), None);
    assert_eq!(h.state().confirmations.take_provenance(tab), None);
}

#[tokio::test(start_paused = true)]
async fn test_confirmed_close_with_vanished_source() {
    let mut h = Harness::new();
    let source = h.browser.open_tab("https://source.example");
    let tab = h.browser.open_tab("https://reopened.example");
    h.state().confirmations.record_provenance(tab, source);
    h.browser.remove_tab(source).unwrap();
    h.pump_host_events();
    h.browser.switch_to(tab).unwrap();

    back(&h).await;
    assert_eq!(
        back(&h).await,
        Outcome::TabClosed {
            tab,
            returned_to: None
        }
    );
    assert_eq!(h.state().confirmations.take_provenance(tab), None);
}

// ─── Logging and feedback ───

#[tokio::test(start_paused = true)]
async fn test_disabled_logging_records_nothing() {
    let mut h = Harness::new();
    h.browser.open_tab("https://single.example");

    h.state().status.set_logging_enabled(false);
    back(&h).await;
    back(&h).await;

    assert!(h.log_actions().is_empty());
    let statuses = h.drain_popup();
    assert_eq!(statuses.len(), 1);
    assert!(!statuses[0].logging_enabled);
}

#[tokio::test(start_paused = true)]
async fn test_every_logged_action_is_broadcast() {
    let mut h = Harness::new();
    h.open_with_history(&["https://a.example", "https://b.example"]);

    back(&h).await;
    forward(&h).await;

    let statuses = h.drain_popup();
    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[1].navigation_logs[0].action, LogAction::Forward);
    assert_eq!(statuses[1].navigation_logs[1].action, LogAction::Back);
}

#[tokio::test(start_paused = true)]
async fn test_log_capacity_follows_config() {
    let h = Harness::with_config(Config {
        max_nav_logs: 3,
        ..Config::default()
    });
    let urls: Vec<String> = (0..6).map(|i| format!("https://p{i}.example")).collect();
    let urls: Vec<&str> = urls.iter().map(String::as_str).collect();
    h.open_with_history(&urls);

    for _ in 0..4 {
        back(&h).await;
    }
    forward(&h).await;

    assert_eq!(
        h.log_actions(),
        vec![LogAction::Forward, LogAction::Back, LogAction::Back]
    );
}

#[tokio::test(start_paused = true)]
async fn test_arming_sends_toast_to_tab() {
    let h = Harness::new();
    let tab = h.browser.open_tab("https://single.example");
    let mut content = h.attach_content(tab);

    back(&h).await;
    forward(&h).await;

    let toasts: Vec<_> = std::iter::from_fn(|| content.try_recv().ok())
        .filter_map(|event| match event {
            SurfaceEvent::Toast { payload } => Some(payload),
            SurfaceEvent::Status { .. } | SurfaceEvent::HideToast => None,
        })
        .collect();
    assert_eq!(toasts.len(), 2);
    assert!(toasts[0].message.contains("close"));
    assert!(toasts[1].message.contains("reopen"));
    assert_eq!(toasts[0].duration_ms, Some(1000));
}

fn toast_events(rx: &mut mpsc::UnboundedReceiver<SurfaceEvent>) -> Vec<&'static str> {
    std::iter::from_fn(|| rx.try_recv().ok())
        .map(|event| event.kind())
        .filter(|kind| *kind != "status")
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_consumed_confirmations_dismiss_toast() {
    let h = Harness::new();
    let first = h.browser.open_tab("https://first.example");
    let mut first_content = h.attach_content(first);
    let second = h.browser.open_tab("https://second.example");
    let mut second_content = h.attach_content(second);

    // Confirmed close: toast shown, then dismissed before the tab goes away.
    back(&h).await;
    back(&h).await;
    assert_eq!(toast_events(&mut second_content), vec!["toast", "hideToast"]);

    // Confirmed reopen from the surviving tab.
    assert_eq!(h.browser.active_tab_id(), Some(first));
    forward(&h).await;
    forward(&h).await;
    assert_eq!(toast_events(&mut first_content), vec!["toast", "hideToast"]);
}

#[tokio::test(start_paused = true)]
async fn test_successful_navigation_dismisses_pending_toast() {
    let h = Harness::new();
    let tab = h.open_with_history(&["https://a.example", "https://b.example"]);
    let mut content = h.attach_content(tab);

    forward(&h).await;
    assert!(h.state().confirmations.is_reopen_armed(tab));
    h.browser.go_back(tab).await.unwrap();
    forward(&h).await;
    assert!(!h.state().confirmations.is_reopen_armed(tab));
    assert_eq!(toast_events(&mut content), vec!["toast", "hideToast"]);

    h.state().confirmations.arm_close(tab);
    back(&h).await;
    assert_eq!(toast_events(&mut content), vec!["hideToast"]);
}

#[tokio::test(start_paused = true)]
async fn test_nothing_to_dismiss_sends_nothing() {
    let h = Harness::new();
    let tab = h.open_with_history(&["https://a.example", "https://b.example"]);
    let mut content = h.attach_content(tab);

    back(&h).await;
    forward(&h).await;
    assert!(toast_events(&mut content).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_toasts_can_be_disabled() {
    let h = Harness::with_config(Config {
        enable_toast: false,
        ..Config::default()
    });
    let tab = h.browser.open_tab("https://single.example");
    let mut content = h.attach_content(tab);

    back(&h).await;
    while let Ok(event) = content.try_recv() {
        assert!(!matches!(event, SurfaceEvent::Toast { .. }));
    }
    assert_eq!(h.log_actions(), vec![LogAction::AwaitClose]);
    assert!(h.state().confirmations.is_close_armed(tab));
}
