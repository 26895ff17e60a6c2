//! Shared utilities for integration testing.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tempfile::TempDir;
use tokio::net::TcpListener;

use eti_router::calling::encode_calling;
use eti_router::db::LazyConnector;
use eti_router::lifecycle::BootError;
use eti_router::registry::builtin;
use eti_router::{AppOptions, Bootstrap, HttpServer, Router, Shutdown};

pub const APP: &str = "demo";

pub const MAIN_CONFIG: &str = r#"
debug = false
webRoot = "http://localhost/demo/"

[db]
host = "127.0.0.1"
name = "eti_test"
user = "eti"
passwd = "secret"
"#;

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "").unwrap();
}

/// Installation tree with the given config sources, the `dao` core class
/// and the `echo`/`status` method files.
pub fn layout(main: Option<&str>, my: Option<&str>) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path();

    fs::create_dir_all(base.join("config")).unwrap();
    if let Some(main) = main {
        fs::write(base.join("config").join("config"), main).unwrap();
    }
    if let Some(my) = my {
        fs::write(base.join("config").join("my"), my).unwrap();
    }

    touch(&base.join("lib").join("dao.class"));
    touch(&base.join("app").join(APP).join("lib").join("echo.class"));
    touch(&base.join("app").join(APP).join("lib").join("status.class"));
    dir
}

/// Default installation: main config only.
#[allow(dead_code)]
pub fn default_layout() -> TempDir {
    layout(Some(MAIN_CONFIG), None)
}

/// Boot `APP` from `base` without touching a real database.
pub async fn boot(base: &Path) -> Result<Router, BootError> {
    Bootstrap::new(AppOptions {
        base_path: base.to_path_buf(),
        app_name: APP.to_string(),
        app_root: None,
    })
    .methods(builtin::demo_methods())
    .run(&LazyConnector)
    .await
}

/// Serve `router` on an ephemeral port.
#[allow(dead_code)]
pub async fn serve(router: Arc<Router>) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();

    tokio::spawn(async move {
        HttpServer::new(router).run(listener, rx).await.unwrap();
    });
    (addr, shutdown)
}

/// Base64 `calling` value for a JSON object.
#[allow(dead_code)]
pub fn calling(value: Value) -> String {
    let Value::Object(map) = value else { panic!("calling must be a JSON object") };
    encode_calling(&map)
}
