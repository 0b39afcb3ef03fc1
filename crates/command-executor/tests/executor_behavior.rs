//! Behavioral tests for the command executor against the fake page.

use command_executor::CommandExecutor;
use interaction_primitives::Pacing;
use page_port::fake::{FakeElement, FakePage, PageEvent};
use pagepilot_core_types::{
    CheckObservation, Command, CommandKind, CommandOutcome, ElementRole, SessionId,
};

fn executor<'a>(page: &'a FakePage) -> CommandExecutor<'a> {
    CommandExecutor::new(page, SessionId("session-exec".into()), Pacing::none())
}

fn click_command(selector: Option<&str>, text: Option<&str>) -> Command {
    Command::new(CommandKind::Click {
        selector: selector.map(str::to_string),
        index: None,
        role: None,
        text: text.map(str::to_string),
        delay_ms: None,
    })
}

#[tokio::test]
async fn click_on_missing_selector_reports_element_not_found() {
    let page = FakePage::new("https://app.example.com/");
    let report = executor(&page).execute(&click_command(Some("#missing"), None)).await;

    assert!(!report.success);
    assert!(report.error.as_deref().unwrap().contains("#missing"));
    assert!(report
        .error
        .as_deref()
        .unwrap()
        .contains("no element matched"));
    assert_eq!(report.command_id, "click");
}

#[tokio::test]
async fn click_on_hidden_element_is_distinguished() {
    let page = FakePage::new("https://app.example.com/");
    page.add(FakeElement::new("button").with_id("ghost").hidden());
    let report = executor(&page).execute(&click_command(Some("#ghost"), None)).await;

    assert!(!report.success);
    assert!(report.error.as_deref().unwrap().contains("not visible"));
}

#[tokio::test]
async fn click_by_text_containment_succeeds() {
    let page = FakePage::new("https://app.example.com/");
    let button = page.add(FakeElement::new("button").with_text("Sign in"));
    let report = executor(&page).execute(&click_command(None, Some("Sign in"))).await;

    assert!(report.success, "report: {:?}", report);
    assert!(page.events_for(&button).contains(&PageEvent::Click));
    match report.result.unwrap() {
        CommandOutcome::Clicked { clicked, element, text } => {
            assert!(clicked);
            assert_eq!(element, "button");
            assert_eq!(text.as_deref(), Some("Sign in"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn click_by_index_uses_the_role_collection() {
    let page = FakePage::new("https://app.example.com/");
    page.add(FakeElement::new("button").with_text("First"));
    let second = page.add(FakeElement::new("button").with_text("Second"));
    let command = Command::new(CommandKind::Click {
        selector: None,
        index: Some(1),
        role: Some(ElementRole::Button),
        text: None,
        delay_ms: None,
    });
    let report = executor(&page).execute(&command).await;

    assert!(report.success);
    assert!(page.events_for(&second).contains(&PageEvent::Click));
}

#[tokio::test]
async fn click_by_out_of_range_index_reports_not_found() {
    let page = FakePage::new("https://app.example.com/");
    page.add(FakeElement::new("button"));
    let command = Command::new(CommandKind::Click {
        selector: None,
        index: Some(7),
        role: Some(ElementRole::Button),
        text: None,
        delay_ms: None,
    });
    let report = executor(&page).execute(&command).await;
    assert!(!report.success);
    assert!(report.error.as_deref().unwrap().contains("no element matched"));
}

#[tokio::test]
async fn type_by_field_name_fills_exact_value() {
    let page = FakePage::new("https://auth.example.com/sign-up");
    let field = page.add(FakeElement::new("input").with_name("email").with_kind("email"));
    let command = Command::new(CommandKind::TypeText {
        selector: None,
        index: None,
        name: Some("email".into()),
        value: "ada@tmp.example.com".into(),
    });
    let report = executor(&page).execute(&command).await;

    assert!(report.success);
    assert_eq!(page.value_of(&field).unwrap(), "ada@tmp.example.com");
    match report.result.unwrap() {
        CommandOutcome::Typed { field, value, .. } => {
            assert_eq!(field, "email");
            assert_eq!(value, "ada@tmp.example.com");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn wait_defaults_to_one_second() {
    let page = FakePage::new("about:blank");
    tokio::time::pause();
    let exec = executor(&page);
    let started = tokio::time::Instant::now();
    let report = exec
        .execute(&Command::new(CommandKind::Wait { duration_ms: None }))
        .await;
    assert!(report.success);
    assert!(started.elapsed() >= std::time::Duration::from_millis(1000));
    match report.result.unwrap() {
        CommandOutcome::Waited { duration, .. } => assert_eq!(duration, 1000),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn navigate_never_fails_locally() {
    let page = FakePage::new("https://app.example.com/");
    let report = executor(&page)
        .execute(&Command::new(CommandKind::Navigate {
            url: "https://auth.example.com/sign-up".into(),
        }))
        .await;
    assert!(report.success);
    assert_eq!(page.navigations(), vec!["https://auth.example.com/sign-up"]);
}

#[tokio::test]
async fn url_contains_check_observes_match() {
    let page = FakePage::new("https://x/sign-up/foo");
    let command = Command::new(CommandKind::Check {
        condition: "url_contains".into(),
        selector: None,
        text: Some("/sign-up".into()),
    });
    let report = executor(&page).execute(&command).await;

    assert!(report.success);
    match report.result.unwrap() {
        CommandOutcome::Checked(CheckObservation::UrlContains {
            url_match,
            current_url,
        }) => {
            assert!(url_match);
            assert_eq!(current_url, "https://x/sign-up/foo");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn negative_check_is_still_a_success() {
    let page = FakePage::new("https://app.example.com/");
    let command = Command::new(CommandKind::Check {
        condition: "element_exists".into(),
        selector: Some("#nope".into()),
        text: None,
    });
    let report = executor(&page).execute(&command).await;

    assert!(report.success);
    match report.result.unwrap() {
        CommandOutcome::Checked(CheckObservation::Exists { exists, .. }) => assert!(!exists),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn unknown_check_condition_is_a_typed_failure() {
    let page = FakePage::new("https://app.example.com/");
    let command = Command::new(CommandKind::Check {
        condition: "dom_is_pretty".into(),
        selector: None,
        text: None,
    });
    let report = executor(&page).execute(&command).await;

    assert!(!report.success);
    assert!(report
        .error
        .as_deref()
        .unwrap()
        .contains("unknown check condition: dom_is_pretty"));
}

#[tokio::test]
async fn complete_reports_and_carries_message() {
    let page = FakePage::new("https://auth.example.com/done");
    let command = Command::new(CommandKind::Complete {
        message: Some("signup finished".into()),
    });
    let report = executor(&page).execute(&command).await;

    assert!(report.success);
    match report.result.unwrap() {
        CommandOutcome::Completed { completed, message } => {
            assert!(completed);
            assert_eq!(message.as_deref(), Some("signup finished"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}
