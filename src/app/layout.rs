//! Server trees built from layout files.
//!
//! Leaf mounts become handlers. A mount with children becomes a nested
//! server of its own, so its children are scoped relative to it and may use
//! a different scoping strategy.

use futures_util::future::BoxFuture;

use crate::app::server::Server;
use crate::config::{LayoutConfig, MountConfig};
use crate::dispatch::{Context, Flow, Handler, ScopeKind};
use crate::error::Result;

/// Build the server tree a layout describes.
pub fn build_server(layout: &LayoutConfig) -> Result<Server> {
    let subject = layout.server.subject.as_str();
    let server = Server::with_strategy(layout.server.scope.strategy(subject));

    if !layout.server.defines.is_empty() {
        server.attach(MountHandler {
            defines: layout.server.defines.clone(),
            ..MountHandler::default()
        })?;
    }
    for mount in &layout.mounts {
        add_mount(&server, mount, layout.server.scope, subject)?;
    }

    tracing::debug!(
        mounts = layout.mounts.len(),
        layers = server.layers().len(),
        "Layout built"
    );
    Ok(server)
}

fn add_mount(
    parent: &Server,
    mount: &MountConfig,
    inherited: ScopeKind,
    subject: &str,
) -> Result<()> {
    let handler = MountHandler::from(mount);
    if mount.mounts.is_empty() {
        parent.mount(&mount.path, handler)?;
        return Ok(());
    }

    let kind = mount.scope.unwrap_or(inherited);
    let child = Server::with_strategy(kind.strategy(subject));
    if !handler.is_empty() {
        child.attach(handler)?;
    }
    for nested in &mount.mounts {
        add_mount(&child, nested, kind, subject)?;
    }
    parent.mount(&mount.path, child)?;
    Ok(())
}

/// Writes one mount's directives and definitions.
#[derive(Debug, Default)]
struct MountHandler {
    early_directives: Vec<String>,
    directives: Vec<String>,
    defines: Vec<String>,
    halt: bool,
}

impl MountHandler {
    fn is_empty(&self) -> bool {
        self.early_directives.is_empty()
            && self.directives.is_empty()
            && self.defines.is_empty()
            && !self.halt
    }

    fn apply(&self, cx: &mut Context<'_>) -> Result<Flow> {
        for line in &self.early_directives {
            cx.prepend(line);
        }
        for line in &self.directives {
            cx.append(line);
        }
        for name in &self.defines {
            cx.define(name)?;
        }
        Ok(if self.halt { Flow::Halt } else { Flow::Next })
    }
}

impl From<&MountConfig> for MountHandler {
    fn from(mount: &MountConfig) -> Self {
        Self {
            early_directives: mount.early_directives.clone(),
            directives: mount.directives.clone(),
            defines: mount.defines.clone(),
            halt: mount.halt,
        }
    }
}

impl Handler for MountHandler {
    fn call<'a, 'b>(&'a self, cx: &'a mut Context<'b>) -> BoxFuture<'a, Result<Flow>> {
        Box::pin(async move { self.apply(cx) })
    }

    fn name(&self) -> &str {
        "layout"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::Conf;
    use crate::config::parse_config;

    async fn render(layout: &str) -> Conf {
        let server = build_server(&parse_config(layout).unwrap()).unwrap();
        let mut conf = Conf::new();
        server.handle(&mut conf).await.unwrap();
        conf
    }

    #[tokio::test]
    async fn test_root_and_scoped_mounts() {
        let conf = render(
            r#"
            [server]
            defines = ["PROD"]

            [[mounts]]
            early_directives = ["ServerName example.com"]

            [[mounts]]
            path = "/admin/"
            directives = ["Require all denied"]
            defines = ["ADMIN"]
            "#,
        )
        .await;

        assert_eq!(conf.defines(), ["PROD"]);
        assert_eq!(
            conf.prepended(),
            [
                "ServerName example.com",
                "<Location \"/admin\">",
                "Define ADMIN",
                "</Location>"
            ]
        );
        assert_eq!(
            conf.appended(),
            ["<Location \"/admin\">", "Require all denied", "</Location>"]
        );
        assert!(conf.is_ended());
    }

    #[tokio::test]
    async fn test_children_become_nested_servers() {
        let layout = parse_config(
            r#"
            [[mounts]]
            path = "/api"
            directives = ["Header set X-Api 1"]

            [[mounts.mounts]]
            path = "/users"
            directives = ["Require valid-user"]
            "#,
        )
        .unwrap();
        let server = build_server(&layout).unwrap();
        let nested = server.layers()[0].server().cloned().unwrap();
        assert_eq!(nested.route().as_str(), "/api");
        assert_eq!(nested.layers().len(), 2);

        let mut conf = Conf::new();
        server.handle(&mut conf).await.unwrap();
        assert_eq!(
            conf.appended(),
            [
                "<Location \"/api\">",
                "Header set X-Api 1",
                "<Location \"/users\">",
                "Require valid-user",
                "</Location>",
                "</Location>"
            ]
        );
    }

    #[tokio::test]
    async fn test_child_scope_override_and_halt() {
        let conf = render(
            r#"
            [[mounts]]
            path = "/api"
            scope = "conditional"

            [[mounts.mounts]]
            path = "/v1.0"
            defines = ["V1"]
            halt = true

            [[mounts]]
            path = "/never"
            directives = ["Unreachable"]
            "#,
        )
        .await;

        assert!(!conf.is_ended());
        assert!(conf.appended().iter().all(|line| line != "Unreachable"));
        assert_eq!(
            conf.prepended(),
            [
                "<Location \"/api\">",
                "Define V1",
                r##"<If "%{REQUEST_URI} =~ m#^/v1\.0([/.].*)?$#">"##,
                "</If>",
                "</Location>"
            ]
        );
    }

    #[test]
    fn test_subject_reaches_conditional_scopes() {
        let layout = parse_config(
            r#"
            [server]
            scope = "conditional"
            subject = "%{REQUEST_FILENAME}"
            "#,
        )
        .unwrap();
        let server = build_server(&layout).unwrap();
        let tag = server
            .scope()
            .open_tag(&crate::routing::MountPath::parse("/srv").unwrap())
            .unwrap();
        assert!(tag.starts_with("<If \"%{REQUEST_FILENAME}"));
    }
}
