//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
#![allow(dead_code)]

use astra_rust_sdk::Client;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wiremock::matchers::path_regex;
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const APP_TOKEN: &str = "AstraCS:test-token";
pub const NAMESPACES: &str = "/api/rest/v2/namespaces";

/// Set up a tracing subscriber to see output based on RUST_LOG environment setting
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .with_ansi(false)
        .compact()
        .with_test_writer()
        .try_init();
}

/// Build an application-token client against the mock server.
pub async fn app_client(server: &MockServer) -> Client {
    Client::builder()
        .base_url(&server.uri())
        .unwrap()
        .application_token(APP_TOKEN)
        .unwrap()
        .build()
        .await
        .unwrap()
}

/// An in-memory document store speaking the path-addressed document API.
///
/// Collections are keyed by `namespace/collection`; documents keep insertion order.
#[derive(Clone, Default)]
pub struct DocStore {
    collections: Arc<Mutex<HashMap<String, Map<String, Value>>>>,
    requests: Arc<Mutex<Vec<String>>>,
    next_id: Arc<AtomicUsize>,
    // document ids whose writes and deletes fail with a 500
    failing: Arc<Mutex<Vec<String>>>,
}

impl DocStore {
    /// Start a mock server backed by a fresh store.
    pub async fn start() -> (MockServer, DocStore) {
        init_logging();
        let server = MockServer::start().await;
        let store = DocStore::default();
        let responder = store.clone();
        Mock::given(path_regex("^/api/rest/v2/namespaces/.*"))
            .respond_with(move |req: &Request| responder.handle(req))
            .mount(&server)
            .await;
        (server, store)
    }

    /// Every request seen, as `METHOD path?query`.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count_requests(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.starts_with(prefix))
            .count()
    }

    pub fn document(&self, ns: &str, coll: &str, id: &str) -> Option<Value> {
        let colls = self.collections.lock().unwrap();
        colls.get(&format!("{}/{}", ns, coll))?.get(id).cloned()
    }

    pub fn len(&self, ns: &str, coll: &str) -> usize {
        let colls = self.collections.lock().unwrap();
        colls
            .get(&format!("{}/{}", ns, coll))
            .map(|c| c.len())
            .unwrap_or(0)
    }

    pub fn insert(&self, ns: &str, coll: &str, id: &str, doc: Value) {
        let mut colls = self.collections.lock().unwrap();
        colls
            .entry(format!("{}/{}", ns, coll))
            .or_default()
            .insert(id.to_string(), doc);
    }

    pub fn fail_writes_for(&self, id: &str) {
        self.failing.lock().unwrap().push(id.to_string());
    }

    fn handle(&self, req: &Request) -> ResponseTemplate {
        let method = req.method.as_str().to_string();
        let query = req.url.query().map(|q| format!("?{}", q)).unwrap_or_default();
        self.requests
            .lock()
            .unwrap()
            .push(format!("{} {}{}", method, req.url.path(), query));

        let params: HashMap<String, String> = req.url.query_pairs().into_owned().collect();
        let body: Value = if req.body.is_empty() {
            Value::Null
        } else {
            match serde_json::from_slice(&req.body) {
                Ok(v) => v,
                Err(_) => return error(400, "invalid json"),
            }
        };

        // namespaces/{ns}/collections[/{coll}[/...]]
        let rest = req.url.path().trim_start_matches(NAMESPACES).trim_matches('/');
        let decoded: Vec<String> = rest
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| urlencoding::decode(s).unwrap().into_owned())
            .collect();
        let segs: Vec<&str> = decoded.iter().map(|s| s.as_str()).collect();
        if segs.len() < 2 || segs[1] != "collections" {
            return error(404, "unknown path");
        }
        let ns = segs[0];
        if segs.len() == 2 {
            return self.collections_root(ns, &method, &body);
        }
        let key = format!("{}/{}", ns, segs[2]);
        let doc_path = &segs[3..];

        match (method.as_str(), doc_path) {
            ("GET", []) => self.find(&key, &params),
            ("POST", []) => {
                let id = format!("gen-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
                self.insert_key(&key, &id, body);
                ResponseTemplate::new(201).set_body_json(json!({ "documentId": id }))
            }
            ("DELETE", []) => {
                self.collections.lock().unwrap().remove(&key);
                ResponseTemplate::new(204)
            }
            ("POST", ["batch"]) => self.batch(&key, &params, body),
            ("POST", [path @ .., "function"]) if !path.is_empty() => {
                self.function(&key, path, &body)
            }
            ("GET", path) => {
                let colls = self.collections.lock().unwrap();
                let found = colls
                    .get(&key)
                    .and_then(|c| c.get(path[0]))
                    .and_then(|d| get_path(d, &path[1..]));
                match found {
                    Some(v) => ResponseTemplate::new(200)
                        .set_body_json(json!({"documentId": path[0], "data": v})),
                    None => error(404, "A document with that id does not exist."),
                }
            }
            ("PUT", path) | ("PATCH", path) => {
                if self.failing.lock().unwrap().iter().any(|f| f == path[0]) {
                    return error(500, "write failed");
                }
                let mut colls = self.collections.lock().unwrap();
                let coll = colls.entry(key).or_default();
                let merge = method == "PATCH";
                if path.len() == 1 {
                    let doc = coll.entry(path[0].to_string()).or_insert(json!({}));
                    if merge {
                        deep_merge(doc, &body);
                    } else {
                        *doc = body;
                    }
                } else {
                    let doc = coll.entry(path[0].to_string()).or_insert(json!({}));
                    let target = ensure_path(doc, &path[1..]);
                    if merge {
                        deep_merge(target, &body);
                    } else {
                        *target = body;
                    }
                }
                ResponseTemplate::new(200).set_body_json(json!({ "documentId": path[0] }))
            }
            ("DELETE", path) => {
                if self.failing.lock().unwrap().iter().any(|f| f == path[0]) {
                    return error(500, "delete failed");
                }
                let mut colls = self.collections.lock().unwrap();
                if let Some(coll) = colls.get_mut(&key) {
                    if path.len() == 1 {
                        coll.shift_remove(path[0]);
                    } else if let Some(doc) = coll.get_mut(path[0]) {
                        remove_path(doc, &path[1..]);
                    }
                }
                ResponseTemplate::new(204)
            }
            _ => error(405, "method not allowed"),
        }
    }

    fn insert_key(&self, key: &str, id: &str, doc: Value) {
        let mut colls = self.collections.lock().unwrap();
        colls
            .entry(key.to_string())
            .or_default()
            .insert(id.to_string(), doc);
    }

    fn collections_root(&self, ns: &str, method: &str, body: &Value) -> ResponseTemplate {
        let mut colls = self.collections.lock().unwrap();
        match method {
            "POST" => {
                let name = body["name"].as_str().unwrap_or_default();
                colls.entry(format!("{}/{}", ns, name)).or_default();
                ResponseTemplate::new(201)
            }
            "GET" => {
                let prefix = format!("{}/", ns);
                let mut names: Vec<Value> = colls
                    .keys()
                    .filter_map(|k| k.strip_prefix(&prefix))
                    .map(|n| json!({ "name": n }))
                    .collect();
                names.sort_by(|a, b| a["name"].as_str().cmp(&b["name"].as_str()));
                ResponseTemplate::new(200).set_body_json(json!({ "data": names }))
            }
            _ => error(405, "method not allowed"),
        }
    }

    fn find(&self, key: &str, params: &HashMap<String, String>) -> ResponseTemplate {
        let filter: Map<String, Value> = match params.get("where") {
            Some(w) => match serde_json::from_str(w) {
                Ok(f) => f,
                Err(_) => return error(400, "invalid where"),
            },
            None => Map::new(),
        };
        let page_size: usize = params
            .get("page-size")
            .and_then(|p| p.parse().ok())
            .unwrap_or(3);
        let offset: usize = params
            .get("page-state")
            .and_then(|p| p.parse().ok())
            .unwrap_or(0);

        let colls = self.collections.lock().unwrap();
        let matching: Vec<(&String, &Value)> = match colls.get(key) {
            Some(c) => c.iter().filter(|(_, d)| matches(d, &filter)).collect(),
            None => Vec::new(),
        };
        let mut data = Map::new();
        for (id, doc) in matching.iter().skip(offset).take(page_size) {
            data.insert(id.to_string(), (*doc).clone());
        }
        let mut envelope = json!({ "data": data });
        if offset + page_size < matching.len() {
            envelope["pageState"] = json!((offset + page_size).to_string());
        }
        ResponseTemplate::new(200).set_body_json(envelope)
    }

    fn batch(&self, key: &str, params: &HashMap<String, String>, body: Value) -> ResponseTemplate {
        let id_path = match params.get("id-path") {
            Some(p) => p.clone(),
            None => return error(400, "id-path required"),
        };
        let docs = match body {
            Value::Array(a) => a,
            _ => return error(400, "batch body must be an array"),
        };
        let mut ids = Vec::new();
        for d in docs {
            let id = match &d[&id_path] {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            self.insert_key(key, &id, d);
            ids.push(id);
        }
        ResponseTemplate::new(202).set_body_json(json!({ "documentIds": ids }))
    }

    fn function(&self, key: &str, path: &[&str], body: &Value) -> ResponseTemplate {
        let mut colls = self.collections.lock().unwrap();
        let doc = match colls.get_mut(key).and_then(|c| c.get_mut(path[0])) {
            Some(d) => d,
            None => return error(404, "A document with that id does not exist."),
        };
        let target = match get_path_mut(doc, &path[1..]) {
            Some(Value::Array(a)) => a,
            _ => return error(400, "target is not an array"),
        };
        match body["operation"].as_str() {
            Some("$push") => {
                target.push(body["value"].clone());
                let arr = Value::Array(target.clone());
                ResponseTemplate::new(200).set_body_json(json!({"documentId": path[0], "data": arr}))
            }
            Some("$pop") => match target.pop() {
                Some(v) => ResponseTemplate::new(200)
                    .set_body_json(json!({"documentId": path[0], "data": v})),
                None => error(400, "array is empty"),
            },
            _ => error(400, "unknown operation"),
        }
    }
}

fn error(status: u16, description: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "description": description,
        "code": status,
    }))
}

fn get_path<'a>(doc: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = doc;
    for p in path {
        cur = match cur {
            Value::Object(m) => m.get(*p)?,
            Value::Array(a) => a.get(p.trim_start_matches('[').trim_end_matches(']').parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(cur)
}

fn get_path_mut<'a>(doc: &'a mut Value, path: &[&str]) -> Option<&'a mut Value> {
    let mut cur = doc;
    for p in path {
        cur = cur.as_object_mut()?.get_mut(*p)?;
    }
    Some(cur)
}

fn ensure_path<'a>(doc: &'a mut Value, path: &[&str]) -> &'a mut Value {
    let mut cur = doc;
    for p in path {
        if !cur.is_object() {
            *cur = json!({});
        }
        cur = cur
            .as_object_mut()
            .unwrap()
            .entry(p.to_string())
            .or_insert(Value::Null);
    }
    cur
}

fn remove_path(doc: &mut Value, path: &[&str]) {
    if let Some((last, parent)) = path.split_last() {
        if let Some(Value::Object(m)) = get_path_mut(doc, parent) {
            m.shift_remove(*last);
        }
    }
}

fn deep_merge(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(t), Value::Object(p)) => {
            for (k, v) in p {
                match t.get_mut(k) {
                    Some(tv) if tv.is_object() && v.is_object() => deep_merge(tv, v),
                    _ => {
                        t.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (t, p) => *t = p.clone(),
    }
}

fn matches(doc: &Value, filter: &Map<String, Value>) -> bool {
    filter.iter().all(|(field, cond)| {
        let value = get_path(doc, &field.split('.').collect::<Vec<_>>());
        match cond {
            Value::Object(ops) => ops.iter().all(|(op, arg)| check(value, op, arg)),
            // the document API only accepts operator objects
            _ => false,
        }
    })
}

fn check(value: Option<&Value>, op: &str, arg: &Value) -> bool {
    match op {
        "$eq" => value == Some(arg),
        "$ne" => value != Some(arg),
        "$exists" => value.is_some() == arg.as_bool().unwrap_or(true),
        "$in" => arg.as_array().map_or(false, |a| value.map_or(false, |v| a.contains(v))),
        "$gt" | "$gte" | "$lt" | "$lte" => {
            let (v, a) = match (value.and_then(|v| v.as_f64()), arg.as_f64()) {
                (Some(v), Some(a)) => (v, a),
                _ => return false,
            };
            match op {
                "$gt" => v > a,
                "$gte" => v >= a,
                "$lt" => v < a,
                _ => v <= a,
            }
        }
        _ => false,
    }
}
