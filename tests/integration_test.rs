use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::{Matcher, Server};

#[test]
fn test_get_json_prints_pretty_body() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("GET", "/v2/project/sessions?page=1")
        .match_header("accept", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"count":1,"items":[{"sessionId":"s1"}]}"#)
        .create();

    Command::new(cargo::cargo_bin!("vetch"))
        .arg("/v2/project/sessions")
        .arg("--base-url")
        .arg(&url)
        .arg("-q")
        .arg("page=1")
        .assert()
        .success()
        .stdout(predicates::str::contains(r#""sessionId": "s1""#));

    mock.assert();
}

#[test]
fn test_base_url_from_env() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("GET", "/health")
        .with_status(200)
        .with_body("ok")
        .create();

    Command::new(cargo::cargo_bin!("vetch"))
        .env("VETCH_BASE_URL", &url)
        .arg("/health")
        .arg("-t")
        .arg("text")
        .assert()
        .success()
        .stdout("ok\n");

    mock.assert();
}

#[test]
fn test_post_json_body_and_user_agent() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("POST", "/v2/items")
        .match_header("content-type", "application/json")
        .match_header(
            "user-agent",
            Matcher::Regex(r"^vonage-server-sdk-rust/\S+ rust/\S+ cli-test/1\.0$".to_string()),
        )
        .match_body(Matcher::Json(serde_json::json!({"name": "demo"})))
        .with_status(201)
        .with_body(r#"{"id":"abc"}"#)
        .create();

    Command::new(cargo::cargo_bin!("vetch"))
        .arg(format!("{}/v2/items", url))
        .arg("-X")
        .arg("POST")
        .arg("-d")
        .arg(r#"{"name":"demo"}"#)
        .arg("--user-agent-suffix")
        .arg("cli-test/1.0")
        .arg("-i")
        .assert()
        .success()
        .stdout(predicates::str::starts_with("201 Created"))
        .stdout(predicates::str::contains(r#""id": "abc""#));

    mock.assert();
}

#[test]
fn test_error_status_fails() {
    let mut server = Server::new();
    let url = server.url();

    let _mock = server
        .mock("GET", "/missing")
        .with_status(404)
        .with_body(r#"{"title":"Not Found"}"#)
        .create();

    Command::new(cargo::cargo_bin!("vetch"))
        .arg(format!("{}/missing", url))
        .assert()
        .failure()
        .stderr(predicates::str::contains(
            "Request failed with status code 404",
        ));
}

#[test]
fn test_missing_url_argument_fails() {
    Command::new(cargo::cargo_bin!("vetch"))
        .assert()
        .failure()
        .stderr(predicates::str::contains("URL"));
}

#[test]
fn test_empty_url_fails_validation() {
    Command::new(cargo::cargo_bin!("vetch"))
        .arg("")
        .assert()
        .failure()
        .stderr(predicates::str::contains("URL is required."));
}
