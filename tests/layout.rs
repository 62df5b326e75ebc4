//! Layout files built into full httpd command lines.

use std::io::Write;

use apache_connect::config::{load_config, ConfigError};
use apache_connect::{build_server, Listener};


fn layout_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_layout_to_command_line() {
    let file = layout_file(
        r#"
        [listener]
        bind_address = "127.0.0.1:8080"
        file = "/etc/httpd/httpd.conf"

        [server]
        defines = ["PROD"]

        [[mounts]]
        path = "/status"
        directives = ["SetHandler server-status"]
        "#,
    );
    let layout = load_config(file.path()).unwrap();
    let server = build_server(&layout).unwrap();

    let conf = Listener::new(layout.listener.bind_address.clone())
        .with_file("/etc/httpd/httpd.conf")
        .bootstrap(&server)
        .await
        .unwrap();

    assert_eq!(
        conf.to_args(),
        [
            "-f",
            "/etc/httpd/httpd.conf",
            "-D",
            "PROD",
            "-C",
            "Listen 127.0.0.1:8080",
            "-C",
            "<Location \"/status\">",
            "-C",
            "</Location>",
            "-c",
            "<Location \"/status\">",
            "-c",
            "SetHandler server-status",
            "-c",
            "</Location>"
        ]
    );
    assert!(conf.is_ended());
}

#[tokio::test]
async fn test_routes_follow_layout_tree() {
    let file = layout_file(
        r#"
        [[mounts]]
        directives = ["ServerName example.com"]

        [[mounts]]
        path = "/api"

        [[mounts.mounts]]
        path = "/users"
        directives = ["Require valid-user"]

        [[mounts.mounts]]
        path = "/orders"
        directives = ["Require all denied"]
        "#,
    );
    let server = build_server(&load_config(file.path()).unwrap()).unwrap();

    let routes: Vec<String> = server
        .routes_for("/api/users/42")
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(routes, ["/", "/api/users"]);
    assert_eq!(server.routes_for("/apiary").len(), 1);
}

#[test]
fn test_invalid_layout_reports_every_problem() {
    let file = layout_file(
        r#"
        [listener]
        bind_address = " "

        [[mounts]]
        path = "/bad\u0007path"

        [[mounts]]
        path = "/ok"
        directives = ["Two\nlines"]
        "#,
    );

    match load_config(file.path()) {
        Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 3),
        other => panic!("expected validation errors, got {:?}", other.map(|_| ())),
    }
}
