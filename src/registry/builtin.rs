//! Types shipped with the dispatcher.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::MySqlPool;

use crate::calling::{Auth, CallingRequest};
use crate::registry::library::Factories;
use crate::registry::method::{CoreObject, Method, MethodError};
use crate::routing::Router;

/// Data-access helper over the shared pool.
#[derive(Debug, Default)]
pub struct Dao;

impl Dao {
    pub fn new() -> Self {
        Self
    }

    /// Round-trip a trivial statement.
    pub async fn ping(&self, pool: &MySqlPool) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
    }
}

/// Framework classes known to every deployment.
pub fn core_classes() -> Factories<CoreObject> {
    let mut factories: Factories<CoreObject> = Factories::new();
    factories.register("dao", || Arc::new(Dao::new()) as Arc<CoreObject>);
    factories
}

/// Returns the decoded call back to the caller.
#[derive(Debug, Default)]
pub struct Echo;

#[async_trait]
impl Method for Echo {
    async fn call(&self, _router: &Router, calling: &CallingRequest) -> Result<Value, MethodError> {
        let auth = match calling.auth() {
            Auth::Token(_) => "token",
            Auth::Operator { .. } => "operator",
        };
        Ok(json!({
            "requestID": calling.request_id(),
            "methodName": calling.method_name(),
            "auth": auth,
            "calling": Value::Object(calling.fields().clone()),
        }))
    }
}

/// Reports whether the database answers, through the `dao` core class.
#[derive(Debug, Default)]
pub struct Status;

#[async_trait]
impl Method for Status {
    async fn call(&self, router: &Router, calling: &CallingRequest) -> Result<Value, MethodError> {
        let dao = router
            .load_class("dao", false)
            .ok()
            .and_then(|loaded| loaded.instance())
            .and_then(|object| object.downcast::<Dao>().ok())
            .ok_or_else(|| MethodError::Failed("dao is not available".to_string()))?;
        dao.ping(router.db()).await?;
        Ok(json!({
            "requestID": calling.request_id(),
            "database": "ok",
            "webRoot": router.config().web_root,
        }))
    }
}

/// Demo application methods registered by the server binary.
pub fn demo_methods() -> Factories<dyn Method> {
    let mut factories: Factories<dyn Method> = Factories::new();
    factories.register("echo", || Arc::new(Echo) as Arc<dyn Method>);
    factories.register("status", || Arc::new(Status) as Arc<dyn Method>);
    factories
}
