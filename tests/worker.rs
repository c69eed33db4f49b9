use httpmock::prelude::*;
use ledger_desk::advisor::{CompletionClient, Persona};
use ledger_desk::config::Settings;
use ledger_desk::tui::App;
use ledger_desk::tui::app::FETCHING;
use ledger_desk::tui::worker::{Update, dispatch};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

fn client_for(base: String) -> Arc<CompletionClient> {
    let settings = Settings::from_lookup(move |key| match key {
        "CLOUDFLARE_AUTH_TOKEN" => Some("tok".to_string()),
        "CLOUDFLARE_ACCOUNT_ID" => Some("acct-9".to_string()),
        "CLOUDFLARE_API_BASE" => Some(base.clone()),
        _ => None,
    });
    Arc::new(CompletionClient::new(&settings))
}

fn recv(rx: &mpsc::Receiver<Update>) -> Update {
    rx.recv_timeout(Duration::from_secs(20))
        .expect("worker did not report back")
}

#[test]
fn answer_flows_back_through_channel() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/accounts/acct-9/ai/v1/chat/completions");
        then.status(200)
            .json_body(json!({"choices": [{"message": {"content": "Refinance the loan."}}]}));
    });
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (tx, rx) = mpsc::channel();

    let mut app = App::new(PathBuf::from("."));
    app.panes[0] = "Should I refinance?".to_string();
    let job = app.begin_request(Persona::FinancialAdvisor).unwrap();
    assert_eq!(app.panes[1], FETCHING);

    let handle = dispatch(rt.handle().clone(), client_for(server.base_url()), job, tx).unwrap();
    let update = recv(&rx);
    handle.join().unwrap();

    assert_eq!(update.persona, Persona::FinancialAdvisor);
    app.apply_update(update);
    assert_eq!(app.panes[1], "Refinance the loan.");
    assert!(!app.is_busy(Persona::FinancialAdvisor));
}

#[test]
fn transport_failure_becomes_error_text() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (tx, rx) = mpsc::channel();

    let mut app = App::new(PathBuf::from("."));
    app.panes[2] = "Is this clause enforceable?".to_string();
    let job = app.begin_request(Persona::LegalConsultant).unwrap();

    dispatch(
        rt.handle().clone(),
        client_for("http://127.0.0.1:1".to_string()),
        job,
        tx,
    )
    .unwrap();
    let update = recv(&rx);
    assert!(update.text.starts_with("Error: "), "got {:?}", update.text);

    app.apply_update(update);
    assert!(app.panes[3].starts_with("Error: "));
    assert!(!app.is_busy(Persona::LegalConsultant));
}

#[test]
fn independent_agents_run_concurrently() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/accounts/acct-9/ai/v1/chat/completions");
        then.status(200)
            .delay(Duration::from_millis(200))
            .json_body(json!({"choices": [{"message": {"content": "ok"}}]}));
    });
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (tx, rx) = mpsc::channel();
    let client = client_for(server.base_url());

    let mut app = App::new(PathBuf::from("."));
    app.panes[0] = "first".to_string();
    app.panes[2] = "third".to_string();
    let first = app.begin_request(Persona::FinancialAdvisor).unwrap();
    let third = app.begin_request(Persona::LegalConsultant).unwrap();
    assert!(app.begin_request(Persona::FinancialAdvisor).is_none());

    dispatch(rt.handle().clone(), Arc::clone(&client), first, tx.clone()).unwrap();
    dispatch(rt.handle().clone(), client, third, tx).unwrap();

    let mut seen = vec![recv(&rx).persona, recv(&rx).persona];
    seen.sort_by_key(|p| p.index());
    assert_eq!(seen, [Persona::FinancialAdvisor, Persona::LegalConsultant]);
}
