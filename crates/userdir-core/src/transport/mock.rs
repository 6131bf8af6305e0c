//! In-memory `HttpHandler`s
//!
//! `ScriptedHandler` replays a fixed sequence of outcomes, one per attempt.
//! `FakeDirectory` behaves like the public users API: reads are served from
//! its seed data, writes echo the body back and are not persisted.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{ApiRequest, AttemptError, HttpHandler, Method};
use crate::models::UserRecord;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One scripted attempt outcome
#[derive(Debug, Clone)]
pub enum Step {
    /// Succeed with this body
    Respond(Value),
    /// Fail the attempt
    Fail(AttemptError),
    /// Never answer (exercises the transport timeout)
    Hang,
}

/// Replays `Step`s in order and records every request
#[derive(Debug, Default)]
pub struct ScriptedHandler {
    steps: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedHandler {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue another step
    pub fn push(&self, step: Step) {
        lock(&self.steps).push_back(step);
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<ApiRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl HttpHandler for ScriptedHandler {
    async fn send(&self, request: &ApiRequest) -> Result<Value, AttemptError> {
        lock(&self.requests).push(request.clone());
        let step = lock(&self.steps).pop_front();

        match step {
            Some(Step::Respond(value)) => Ok(value),
            Some(Step::Fail(error)) => Err(error),
            Some(Step::Hang) => std::future::pending().await,
            None => Err(AttemptError::Other("no scripted response left".to_string())),
        }
    }
}

/// Non-durable stand-in for the users API
#[derive(Debug)]
pub struct FakeDirectory {
    users: Vec<UserRecord>,
    created_id: Mutex<Option<i64>>,
    failures: Mutex<VecDeque<(Method, AttemptError)>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeDirectory {
    /// Serve `users`; creates are answered with id `users.len() + 1`
    pub fn new(users: Vec<UserRecord>) -> Self {
        let next_id = users.len() as i64 + 1;
        Self {
            users,
            created_id: Mutex::new(Some(next_id)),
            failures: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Change the id returned by create; `None` omits it from the response
    pub fn set_created_id(&self, id: Option<i64>) {
        *lock(&self.created_id) = id;
    }

    /// Fail the next request with the given method
    pub fn fail_next(&self, method: Method, error: AttemptError) {
        lock(&self.failures).push_back((method, error));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        lock(&self.requests).clone()
    }

    fn take_failure(&self, method: Method) -> Option<AttemptError> {
        let mut failures = lock(&self.failures);
        let index = failures.iter().position(|(m, _)| *m == method)?;
        failures.remove(index).map(|(_, e)| e)
    }

    fn find(&self, id: &str) -> Result<&UserRecord, AttemptError> {
        id.parse::<i64>()
            .ok()
            .and_then(|id| self.users.iter().find(|u| u.id == id))
            .ok_or_else(not_found)
    }
}

fn not_found() -> AttemptError {
    AttemptError::Status {
        status: 404,
        reason: "Not Found".to_string(),
    }
}

fn encode(record: &UserRecord) -> Result<Value, AttemptError> {
    serde_json::to_value(record).map_err(|e| AttemptError::Decode(e.to_string()))
}

fn with_id(body: Option<&Value>, id: Option<i64>) -> Value {
    let mut value = body.cloned().unwrap_or_else(|| json!({}));
    if let (Some(object), Some(id)) = (value.as_object_mut(), id) {
        object.insert("id".to_string(), json!(id));
    }
    value
}

#[async_trait]
impl HttpHandler for FakeDirectory {
    async fn send(&self, request: &ApiRequest) -> Result<Value, AttemptError> {
        lock(&self.requests).push(request.clone());
        if let Some(error) = self.take_failure(request.method) {
            return Err(error);
        }

        let segments: Vec<&str> = request.path.trim_matches('/').split('/').collect();
        match (request.method, segments.as_slice()) {
            (Method::Get, ["users"]) => serde_json::to_value(&self.users)
                .map_err(|e| AttemptError::Decode(e.to_string())),
            (Method::Get, ["users", id]) => encode(self.find(id)?),
            (Method::Post, ["users"]) => {
                let id = *lock(&self.created_id);
                Ok(with_id(request.body.as_ref(), id))
            }
            (Method::Put, ["users", id]) => {
                let existing = self.find(id)?;
                Ok(with_id(request.body.as_ref(), Some(existing.id)))
            }
            (Method::Delete, ["users", id]) => {
                self.find(id)?;
                Ok(json!({}))
            }
            _ => Err(not_found()),
        }
    }
}
