//! End-to-end JSON-RPC sessions against an in-memory stdio pair.
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod common;

use std::collections::HashMap;

use common::{FixtureBuilder, NiriConfigFixture};
use niri_mcp::commands::tools::write_list;
use niri_mcp::server::NiriServer;
use niri_mcp::tools::Registry;
use rmcp::ServiceExt;
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines};

/// Run an initialized session against `fx` and return the responses to
/// `requests` keyed by id.
async fn session(fx: &NiriConfigFixture, requests: &[Value]) -> HashMap<u64, Value> {
    let (client, server_io) = tokio::io::duplex(64 * 1024);
    let server = NiriServer::new(Registry::new(), fx.ctx.clone());
    let handle = tokio::spawn(async move {
        let running = server
            .serve(tokio::io::split(server_io))
            .await
            .expect("handshake");
        running.waiting().await.expect("session");
    });

    let (read, mut write) = tokio::io::split(client);
    let mut lines = BufReader::new(read).lines();
    send(&mut write, &json!({
        "jsonrpc": "2.0",
        "id": 0,
        "method": "initialize",
        "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {"name": "session-test", "version": "0"}
        }
    }))
    .await;
    let init = next_message(&mut lines).await;
    send(&mut write, &json!({"jsonrpc": "2.0", "method": "notifications/initialized"})).await;

    let mut responses = HashMap::from([(0, init)]);
    for request in requests {
        send(&mut write, request).await;
        let response = next_message(&mut lines).await;
        let id = response["id"].as_u64().expect("numeric id");
        responses.insert(id, response);
    }

    write.shutdown().await.expect("close input");
    drop(lines);
    handle.await.expect("server task");
    responses
}

async fn send<W: AsyncWrite + Unpin>(write: &mut W, message: &Value) {
    write
        .write_all(format!("{message}\n").as_bytes())
        .await
        .expect("write request");
}

async fn next_message<R: AsyncBufRead + Unpin>(lines: &mut Lines<R>) -> Value {
    let line = lines
        .next_line()
        .await
        .expect("read response")
        .expect("response before close");
    serde_json::from_str(&line).expect("response is JSON")
}

fn call(id: u64, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    })
}

fn text(response: &Value) -> Value {
    let text = response["result"]["content"][0]["text"]
        .as_str()
        .expect("text content");
    serde_json::from_str(text).expect("text is JSON")
}

#[test]
fn tool_listing() {
    let mut out = Vec::new();
    write_list(&Registry::new(), &mut out).expect("write list");
    let listing = String::from_utf8(out).expect("utf-8");
    insta::assert_snapshot!(listing, @r"
    niri_outputs             List connected outputs (monitors) in Niri window manager
    niri_workspaces          List workspaces in Niri window manager
    niri_windows             List open windows in Niri window manager
    niri_layers              List layer-shell surfaces (like panels, menus) in Niri window manager
    niri_keyboard_layouts    List keyboard layouts in Niri window manager
    niri_focused_output      Get the currently focused output (monitor) in Niri window manager
    niri_focused_window      Get the currently focused window in Niri window manager
    niri_overview_state      Get the overview state in Niri window manager
    list_niri_configs        List niri config.d files with their state (included/excluded)
    toggle_niri_config       Toggle niri config.d files (enable/disable)
    list_niri_kdl_includes   List KDL include directives from niri config.kdl with state
    toggle_niri_kdl_include  Toggle KDL include directives in niri config.kdl by adding/removing '// disabled' comment
    ");
}

#[tokio::test]
async fn handshake_list_and_toggle() {
    let fx = FixtureBuilder::new()
        .with_fragment("a.kdl")
        .with_document("include \"a.kdl\"\n")
        .build();

    let responses = session(
        &fx,
        &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}),
            call(2, "toggle_niri_config", json!({"action": "off"})),
            call(3, "toggle_niri_kdl_include", json!({"action": "off"})),
            call(4, "list_niri_kdl_includes", json!({})),
            json!({"jsonrpc": "2.0", "id": 5, "method": "ping"}),
        ],
    )
    .await;

    assert_eq!(responses[&0]["result"]["serverInfo"]["name"], "niri-mcp");
    assert_eq!(responses[&0]["result"]["protocolVersion"], "2024-11-05");
    let tools = responses[&1]["result"]["tools"].as_array().expect("tools");
    assert_eq!(tools.len(), 12);
    assert_eq!(tools[8]["name"], "list_niri_configs");
    assert_eq!(tools[8]["inputSchema"]["type"], "object");
    assert_eq!(text(&responses[&2])["affected"][0]["name"], "a.kdl");
    assert_eq!(text(&responses[&3])["affected"][0]["newState"], "excluded");
    assert_eq!(
        text(&responses[&4])["includes"],
        json!([{"path": "a.kdl", "state": "excluded"}])
    );
    assert_eq!(responses[&5]["result"], json!({}));
    assert_eq!(fx.fragment_names(), ["a.kdl.disabled"]);
    assert_eq!(fx.document_content(), "include \"a.kdl\" // disabled\n");
}

#[tokio::test]
async fn query_tool_filters_canned_output() {
    let fx = FixtureBuilder::new()
        .with_niri_response(
            r#"[{"id":1,"idx":1,"name":null,"output":"DP-1","is_active":true,"is_focused":true,"active_window_id":7},
                {"id":2,"idx":2,"name":"web","output":"DP-1","is_active":false,"is_focused":false,"active_window_id":null}]"#,
        )
        .build();

    let responses = session(
        &fx,
        &[call(
            1,
            "niri_workspaces",
            json!({
                "include": ["id", "name"],
                "filter": [{"field": "is_active", "operator": "eq", "value": false}]
            }),
        )],
    )
    .await;
    assert_eq!(text(&responses[&1]), json!([{"id": 2, "name": "web"}]));
}

#[tokio::test]
async fn failed_query_is_error_result_and_session_continues() {
    let fx = FixtureBuilder::new().build();

    let responses = session(
        &fx,
        &[
            call(1, "niri_outputs", json!({})),
            call(2, "no_such_tool", json!({})),
            json!({"jsonrpc": "2.0", "id": 3, "method": "ping"}),
        ],
    )
    .await;
    assert_eq!(responses[&1]["result"]["isError"], true);
    assert!(
        responses[&1]["result"]["content"][0]["text"]
            .as_str()
            .expect("text")
            .contains("no canned response")
    );
    assert_eq!(responses[&2]["error"]["code"], -32602);
    assert_eq!(responses[&3]["result"], json!({}));
}
