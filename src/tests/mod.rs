use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::panel::{Options, Panel};
use crate::payload::StatsPayload;
use crate::render;
use crate::state::QueryState;

type Route = fn(&str) -> (&'static str, String);

/// Serves `connections` HTTP requests on a local port, answering each with
/// `route(request_line)`. Resolves to the request lines seen.
async fn spawn_server(route: Route, connections: usize) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}/", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let mut seen = Vec::new();
        for _ in 0..connections {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = sock.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            let head = String::from_utf8_lossy(&buf).to_string();
            let request_line = head.lines().next().unwrap_or("").to_string();
            let (status, body) = route(&request_line);
            let resp = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            sock.write_all(resp.as_bytes()).await.unwrap();
            sock.shutdown().await.ok();
            seen.push(request_line);
        }
        seen
    });
    (base, handle)
}

fn panel_for(base: &str) -> Panel {
    Panel::new(Options {
        endpoint: base.to_string(),
        system_proxy: false,
        ..Options::default()
    })
    .unwrap()
}

fn two_rows(_: &str) -> (&'static str, String) {
    (
        "200 OK",
        r#"{"status":"OK","query":"q","selected":["?x"],
            "res":[["<http://e.org/a/One>"],["\"<b>bold</b> & co\"@en"]],
            "resultsize":500,"time":{"total":"20ms","computeResult":"15ms"}}"#
            .to_string(),
    )
}

fn query_or_stats(request_line: &str) -> (&'static str, String) {
    if request_line.contains("cmd=stats") {
        (
            "200 OK",
            r#"{"name-index":"test","num-permutations":"6","num-triples-normal":123456,
                "num-subjects-normal":10,"num-predicates-normal":20,"num-objects-normal":30}"#
                .to_string(),
        )
    } else {
        two_rows(request_line)
    }
}

fn parse_error(_: &str) -> (&'static str, String) {
    (
        "400 Bad Request",
        r#"{"status":"ERROR","query":"SELECT <x","resultsize":0,
            "time":{"total":1,"computeResult":1},"exception":"token recognition error at: '<x'"}"#
            .to_string(),
    )
}

#[tokio::test]
async fn submit_renders_table_and_pushes_link() {
    let (base, server) = spawn_server(two_rows, 1).await;
    let mut panel = panel_for(&base);
    let state = QueryState::new("SELECT ?x WHERE { ?x ?p ?o }").with_max_rows(Some(2));
    let rendered = panel.submit(state).await.unwrap();

    let seen = server.await.unwrap();
    assert!(seen[0].starts_with("GET /?query=SELECT+%3Fx+WHERE"));
    assert!(seen[0].contains("&send=2 HTTP/1.1"));

    assert!(rendered.outcome.is_ok());
    assert!(rendered.html.contains("<td title=\"&lt;http://e.org/a/One&gt;\">One</td>"));
    assert!(rendered.html.contains("&quot;&lt;b&gt;bold&lt;/b&gt; &amp; co&quot;"));
    assert!(rendered.html.contains("id=\"truncated\""));
    assert!(rendered.html.contains("<span id=\"jsonTime\">5ms</span>"));
    assert_eq!(panel.history().len(), 1);
    assert_eq!(panel.history().current(), Some(&rendered.link));
    assert!(rendered.link.as_str().ends_with("&send=2"));
}

#[tokio::test]
async fn error_payload_renders_error_panel_without_table() {
    let (base, server) = spawn_server(parse_error, 1).await;
    let mut panel = panel_for(&base);
    let rendered = panel.submit(QueryState::new("SELECT <x")).await.unwrap();
    server.await.unwrap();

    assert!(rendered.outcome.as_ref().unwrap().is_error());
    assert!(rendered.html.contains("<span id=\"queryErrorText\">SELECT &lt;x</span>"));
    assert!(rendered
        .html
        .contains("<span id=\"queryErrorMessage\">token recognition error at: &#39;&lt;x&#39;</span>"));
    assert!(!rendered.html.contains("resTable"));
}

#[tokio::test]
async fn unreachable_service_renders_connection_panel() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}/", listener.local_addr().unwrap());
    drop(listener);

    let mut panel = panel_for(&base);
    let rendered = panel.submit(QueryState::new("ASK {}")).await.unwrap();
    let err = rendered.outcome.as_ref().unwrap_err();
    assert!(err.is_transport());
    assert!(rendered.html.contains("Connection problem"));
    assert!(!rendered.html.to_lowercase().contains("waiting"));
    // the link was pushed before the request went out
    assert_eq!(panel.history().len(), 1);
}

#[tokio::test]
async fn stats_are_fetched_alongside_the_query() {
    let (base, server) = spawn_server(query_or_stats, 2).await;
    let mut panel = panel_for(&base);
    let (rendered, stats) = panel.submit_with_stats(QueryState::new("q")).await.unwrap();
    let mut seen = server.await.unwrap();
    seen.sort();

    assert!(seen.iter().any(|l| l.starts_with("GET /?cmd=stats ")));
    assert!(seen.iter().any(|l| l.starts_with("GET /?query=q ")));
    assert!(rendered.outcome.is_ok());
    let stats: StatsPayload = stats.unwrap();
    let html = crate::stats::render_stats(&stats);
    assert!(html.contains("<dd id=\"ntriples\">123,456</dd>"));
    assert!(html.contains("<dd id=\"nsubjects\">10</dd>"));
}

#[tokio::test]
async fn shared_link_dispatches_and_history_replays() {
    let (base, server) = spawn_server(two_rows, 4).await;
    let mut panel = panel_for(&base);

    let first = panel
        .open_link(&format!("{base}?send=5&query=first&cmd=clearcache"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.state, QueryState::new("first").with_clear_cache(true).with_max_rows(Some(5)));
    // links are normalized to the canonical parameter order
    assert!(first.link.as_str().ends_with("?query=first&cmd=clear-cache&send=5"));

    panel.submit(QueryState::new("second")).await.unwrap();
    assert_eq!(panel.history().len(), 2);

    let back = panel.back().await.unwrap();
    assert_eq!(back.state.query, "first");
    let fwd = panel.forward().await.unwrap();
    assert_eq!(fwd.state.query, "second");
    assert!(panel.forward().await.is_none());
    assert_eq!(panel.history().len(), 2);

    let seen = server.await.unwrap();
    assert_eq!(seen.len(), 4);
    assert!(seen[0].contains("query=first&cmd=clear-cache&send=5"));
}

#[tokio::test]
async fn csv_export_is_downloaded_verbatim() {
    fn csv(_: &str) -> (&'static str, String) {
        ("200 OK", "x,y\n1,\"a,b\"\n".to_string())
    }
    let (base, server) = spawn_server(csv, 1).await;
    let bytes = tokio::task::spawn_blocking(move || {
        let endpoint = crate::request::Endpoint::parse(&base).unwrap();
        let mut out = Vec::new();
        crate::client::export::download_export(
            &endpoint,
            &QueryState::new("SELECT *")
                .with_clear_cache(true)
                .with_max_rows(Some(3)),
            crate::request::ExportFormat::Csv,
            &crate::client::ClientOptions::default(),
            &mut out,
        )
        .unwrap();
        out
    })
    .await
    .unwrap();

    assert_eq!(bytes, b"x,y\n1,\"a,b\"\n");
    let seen = server.await.unwrap();
    assert!(seen[0].starts_with("GET /?query=SELECT+*&cmd=clear-cache&action=csv_export "));
}

#[test]
fn rendered_cells_never_contain_raw_markup() {
    let values = [
        "<script>alert(\"x\")</script>",
        "\"a<b>c\"@en",
        "<http://e.org/a&b>",
        "Tom & \"Jerry\" <3",
        "&amp; already escaped",
    ];
    for value in values {
        let td = render::render_cell(value, 8);
        let inner = td
            .strip_prefix("<td title=\"")
            .and_then(|s| s.strip_suffix("</td>"))
            .unwrap();
        let (title, body) = inner.split_once("\">").unwrap();
        for part in [title, body] {
            assert!(!part.contains('<'), "{td}");
            assert!(!part.contains('>'), "{td}");
            assert!(!part.contains('"'), "{td}");
            for (idx, _) in part.match_indices('&') {
                let rest = &part[idx..];
                assert!(
                    ["&amp;", "&lt;", "&gt;", "&quot;", "&#39;"]
                        .iter()
                        .any(|e| rest.starts_with(e)),
                    "{td}"
                );
            }
        }
    }
}
