// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses.

use http::{Request, Response};
use http_body_util::BodyExt;
use k8s_openapi::api::core::v1::{ObjectReference, Secret, ServiceAccount};
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::Client;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A request seen by the mock API server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

impl RecordedRequest {
    /// Parse the request body as JSON
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// A mock HTTP service that returns predefined responses based on request paths.
/// Unmatched requests get a 404, unless `echo_creates` is set and the request is a POST,
/// in which case the posted object is returned with a generated UID.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    echo_creates: bool,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            echo_creates: false,
        }
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for POST requests matching the exact path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    /// Add a response for PATCH requests matching the exact path
    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PATCH", path, status, body)
    }

    /// Answer unmatched POSTs with the created object
    pub fn echo_creates(mut self) -> Self {
        self.echo_creates = true;
        self
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    /// All requests received so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// All non-GET requests received so far
    pub fn writes(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method != "GET")
            .collect()
    }

    /// Requests matching a method and exact path
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        self.responses
            .lock()
            .unwrap()
            .get(&(method.to_string(), path.to_string()))
            .cloned()
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let response = self.find_response(&method, &path);
        let echo = self.echo_creates && method == "POST";
        let requests = self.requests.clone();

        Box::pin(async move {
            let bytes = req
                .into_body()
                .collect()
                .await
                .map_err(|e| tower::BoxError::from(e.to_string()))?
                .to_bytes();
            let body = String::from_utf8_lossy(&bytes).to_string();
            requests.lock().unwrap().push(RecordedRequest {
                method,
                path,
                body: body.clone(),
            });

            let (status, body) = match response {
                Some(resp) => resp,
                None if echo => (201, with_generated_uid(&body)),
                // Default 404 for unmatched requests
                None => (404, status_json(404, "NotFound", "not found")),
            };
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

fn with_generated_uid(body: &str) -> String {
    let mut obj: serde_json::Value = serde_json::from_str(body).unwrap();
    let name = obj["metadata"]["name"].as_str().unwrap_or_default().to_string();
    if obj["metadata"].get("uid").is_none() {
        obj["metadata"]["uid"] = serde_json::Value::String(format!("uid-{}", name));
    }
    obj.to_string()
}

/// Create a mock namespace JSON response
pub fn namespace_json(name: &str, uid: &str) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "uid": uid
        }
    })
    .to_string()
}

/// Create a Status response body
pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

/// Create a 409 already exists response
pub fn already_exists_json(resource: &str, name: &str) -> String {
    status_json(
        409,
        "AlreadyExists",
        &format!("{} \"{}\" already exists", resource, name),
    )
}

/// Create a mock ServiceAccount JSON response referencing the given secrets
pub fn service_account_json(namespace: &str, name: &str, secrets: &[&str]) -> String {
    let sa = ServiceAccount {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            uid: Some(format!("uid-{}", name)),
            ..Default::default()
        },
        secrets: Some(
            secrets
                .iter()
                .map(|s| ObjectReference {
                    name: Some(s.to_string()),
                    ..Default::default()
                })
                .collect(),
        ),
        ..Default::default()
    };
    serde_json::to_string(&sa).unwrap()
}

/// Create a mock service-account token Secret JSON response
pub fn token_secret_json(namespace: &str, name: &str, ca: &str, token: &str) -> String {
    serde_json::to_string(&token_secret(namespace, name, ca, token)).unwrap()
}

/// Create a mock token Secret JSON response annotated with its ServiceAccount
pub fn owned_token_secret_json(
    namespace: &str,
    name: &str,
    service_account: &str,
    ca: &str,
    token: &str,
) -> String {
    let mut secret = token_secret(namespace, name, ca, token);
    secret.metadata.annotations = Some(BTreeMap::from([(
        "kubernetes.io/service-account.name".to_string(),
        service_account.to_string(),
    )]));
    serde_json::to_string(&secret).unwrap()
}

fn token_secret(namespace: &str, name: &str, ca: &str, token: &str) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        type_: Some("kubernetes.io/service-account-token".to_string()),
        data: Some(BTreeMap::from([
            ("ca.crt".to_string(), ByteString(ca.as_bytes().to_vec())),
            ("namespace".to_string(), ByteString(namespace.as_bytes().to_vec())),
            ("token".to_string(), ByteString(token.as_bytes().to_vec())),
        ])),
        ..Default::default()
    }
}

/// Create a mock ClusterList JSON response from (name, id) pairs
pub fn cluster_list_json(clusters: &[(&str, &str)]) -> String {
    serde_json::json!({
        "apiVersion": "cluster.karmada.io/v1alpha1",
        "kind": "ClusterList",
        "metadata": {},
        "items": clusters.iter().map(|(name, id)| serde_json::json!({
            "apiVersion": "cluster.karmada.io/v1alpha1",
            "kind": "Cluster",
            "metadata": { "name": name, "uid": format!("uid-{}", name) },
            "spec": { "id": id, "syncMode": "Push", "apiEndpoint": "https://member:6443" }
        })).collect::<Vec<_>>()
    })
    .to_string()
}

/// Create a mock Secret JSON response without data
pub fn secret_json(namespace: &str, name: &str) -> String {
    let secret = Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    serde_json::to_string(&secret).unwrap()
}

/// A member cluster whose token controller has already populated the ServiceAccount secrets
pub fn member_cluster_mock(namespace: &str, cluster_name: &str, uid: &str) -> MockService {
    let mock = MockService::new()
        .echo_creates()
        .on_get(
            "/api/v1/namespaces/kube-system",
            200,
            &namespace_json("kube-system", uid),
        )
        .on_get(
            &format!("/api/v1/namespaces/{}", namespace),
            200,
            &namespace_json(namespace, &format!("uid-{}", namespace)),
        );

    let accounts = [
        (format!("karmada-{}", cluster_name), "abcde"),
        ("karmada-impersonator".to_string(), "fghij"),
    ];
    accounts.iter().fold(mock, |mock, (account, suffix)| {
        let secret = format!("{}-token-{}", account, suffix);
        mock.on_get(
            &format!("/api/v1/namespaces/{}/serviceaccounts/{}", namespace, account),
            200,
            &service_account_json(namespace, account, &[secret.as_str()]),
        )
        .on_get(
            &format!("/api/v1/namespaces/{}/secrets/{}", namespace, secret),
            200,
            &token_secret_json(namespace, &secret, "ca-data", &format!("{}-token", account)),
        )
    })
}

/// A control plane with the given (name, id) clusters registered that accepts a new join
pub fn control_plane_mock(
    namespace: &str,
    cluster_name: &str,
    registered: &[(&str, &str)],
) -> MockService {
    let impersonator = format!("{}-impersonator", cluster_name);
    MockService::new()
        .echo_creates()
        .on_get(
            "/apis/cluster.karmada.io/v1alpha1/clusters",
            200,
            &cluster_list_json(registered),
        )
        .on_get(
            &format!("/api/v1/namespaces/{}", namespace),
            200,
            &namespace_json(namespace, &format!("uid-{}", namespace)),
        )
        .on_patch(
            &format!("/api/v1/namespaces/{}/secrets/{}", namespace, cluster_name),
            200,
            &secret_json(namespace, cluster_name),
        )
        .on_patch(
            &format!("/api/v1/namespaces/{}/secrets/{}", namespace, impersonator),
            200,
            &secret_json(namespace, &impersonator),
        )
}
