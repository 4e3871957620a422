//! # HTTP implementation of the cluster API boundary
//!
//! [HttpVmService] sends plain JSON requests to the KubeVirt REST API
//! (`/apis/kubevirt.io/v1/namespaces/{namespace}/virtualmachines`). It does
//! not handle TLS nor authentication against the cluster itself, it is meant
//! to be used behind an authenticating proxy such as `kubectl proxy`, either
//! over TCP or over a Unix socket (`kubectl proxy --unix-socket`).
//!
//! HTTP 404 answers are reported as [ClientError::NotFound], any other
//! failing status as [ClientError::Status] with the body sent by the server.
use std::{collections::BTreeMap, fmt, path::PathBuf};

use async_trait::async_trait;
use hyper::{body::Bytes, client::HttpConnector, Body, Client, Method, Request, StatusCode};
use hyperlocal::{UnixClientExt, UnixConnector};
use kubepilot_models::models::{
    VirtualMachine, VirtualMachineList, API_VERSION, VIRTUAL_MACHINE_KIND,
};
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument, trace};
use url::Url;

use crate::{
    builder::BuilderError,
    service::{check_vm_name, ClientError, VmService},
};

/// Location of the API server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `http://host:port[/prefix]`
    Http(Url),
    /// `unix:///path/to/socket`
    Unix(PathBuf),
}

impl Endpoint {
    pub fn parse(endpoint: &str) -> Result<Endpoint, BuilderError> {
        let url = Url::parse(endpoint)
            .map_err(|e| BuilderError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
        match url.scheme() {
            "http" => Ok(Endpoint::Http(url)),
            "unix" => Ok(Endpoint::Unix(PathBuf::from(url.path()))),
            scheme => Err(BuilderError::InvalidEndpoint(format!(
                "{}: unsupported scheme {}",
                endpoint, scheme
            ))),
        }
    }
}

#[derive(Debug)]
enum Transport {
    Http {
        base: Url,
        client: Client<HttpConnector>,
    },
    Unix {
        socket: PathBuf,
        client: Client<UnixConnector>,
    },
}

/// [VmService] talking to the API server over HTTP
pub struct HttpVmService {
    transport: Transport,
    namespace: String,
    /// Sent as a bearer token when set
    token: Option<String>,
}

impl fmt::Debug for HttpVmService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpVmService")
            .field("transport", &self.transport)
            .field("namespace", &self.namespace)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ClientError> {
    serde_json::from_slice(body).map_err(|e| ClientError::Deserialize(e.to_string()))
}

/// A list envelope would decode as an empty VM, check the kind
fn decode_vm(body: &[u8]) -> Result<VirtualMachine, ClientError> {
    let vm: VirtualMachine = decode(body)?;
    if vm.kind != VIRTUAL_MACHINE_KIND {
        return Err(ClientError::Deserialize(format!(
            "expected a {} object, got {:?}",
            VIRTUAL_MACHINE_KIND, vm.kind
        )));
    }
    Ok(vm)
}

fn encode_path(segments: &[&str]) -> Result<String, ClientError> {
    let mut url = Url::parse("http://localhost/").map_err(|e| ClientError::Request(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| ClientError::Request("cannot build request path".to_string()))?
        .clear()
        .extend(segments);
    Ok(url.path().to_string())
}

impl HttpVmService {
    pub fn new(endpoint: Endpoint, namespace: String) -> HttpVmService {
        let transport = match endpoint {
            Endpoint::Http(base) => Transport::Http {
                base,
                client: Client::new(),
            },
            Endpoint::Unix(socket) => Transport::Unix {
                socket,
                client: Client::unix(),
            },
        };
        HttpVmService {
            transport,
            namespace,
            token: None,
        }
    }

    pub fn with_token(self, token: String) -> HttpVmService {
        HttpVmService {
            token: Some(token),
            ..self
        }
    }

    /// Path of the collection, or of the VM `name` in it. Segments are
    /// percent-encoded, a name can't escape its segment.
    fn vm_path(&self, name: Option<&str>) -> Result<String, ClientError> {
        let mut segments = vec!["apis"];
        segments.extend(API_VERSION.split('/'));
        segments.extend(["namespaces", self.namespace.as_str(), "virtualmachines"]);
        segments.extend(name);
        encode_path(&segments)
    }

    fn uri(&self, path: &str, filters: &BTreeMap<String, String>) -> Result<hyper::Uri, ClientError> {
        let query = (!filters.is_empty()).then(|| {
            url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(filters)
                .finish()
        });

        match &self.transport {
            Transport::Http { base, .. } => {
                let mut url = base.clone();
                url.set_path(&format!("{}{}", base.path().trim_end_matches('/'), path));
                url.set_query(query.as_deref());
                url.as_str()
                    .parse::<hyper::Uri>()
                    .map_err(|e| ClientError::Request(format!("{}: {}", url, e)))
            }
            Transport::Unix { socket, .. } => {
                let path_and_query = match query {
                    Some(query) => format!("{}?{}", path, query),
                    None => path.to_string(),
                };
                // hyperlocal panics on an invalid path
                path_and_query
                    .parse::<hyper::Uri>()
                    .map_err(|e| ClientError::Request(format!("{}: {}", path_and_query, e)))?;
                Ok(hyperlocal::Uri::new(socket, &path_and_query).into())
            }
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: hyper::Uri,
        body: Option<String>,
    ) -> Result<Bytes, ClientError> {
        debug!("Send {} request to {}", method, uri);
        let mut request = Request::builder()
            .method(method)
            .uri(uri.clone())
            .header("Accept", "application/json");
        if body.is_some() {
            request = request.header("Content-Type", "application/json");
        }
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        let request = request
            .body(body.map(Body::from).unwrap_or_else(Body::empty))
            .map_err(|e| ClientError::Request(format!("{}: {}", uri, e)))?;

        let response = match &self.transport {
            Transport::Http { client, .. } => client.request(request).await,
            Transport::Unix { client, .. } => client.request(request).await,
        }
        .map_err(|e| ClientError::Request(format!("{}: {}", uri, e)))?;

        let status = response.status();
        trace!("Response status: {:#?}", status);
        let body = hyper::body::to_bytes(response.into_body())
            .await
            .map_err(|e| ClientError::Request(format!("{}: {}", uri, e)))?;

        if status == StatusCode::NOT_FOUND {
            debug!("Resource not found [{}]", uri);
            return Err(ClientError::NotFound(uri.path().to_string()));
        }
        if !status.is_success() {
            let body = String::from_utf8_lossy(&body).into_owned();
            error!("Request to API server failed [{}]: {:#?}", uri, status);
            error!("Request [{}] body: {}", uri, body);
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl VmService for HttpVmService {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    #[instrument(skip(self), fields(namespace = %self.namespace))]
    async fn list_vms(
        &self,
        filters: &BTreeMap<String, String>,
    ) -> Result<VirtualMachineList, ClientError> {
        let uri = self.uri(&self.vm_path(None)?, filters)?;
        let body = self.send(Method::GET, uri, None).await?;
        decode(&body)
    }

    #[instrument(skip(self), fields(namespace = %self.namespace))]
    async fn get_vm(&self, name: &str) -> Result<VirtualMachine, ClientError> {
        check_vm_name(name)?;
        let uri = self.uri(&self.vm_path(Some(name))?, &BTreeMap::new())?;
        let body = self.send(Method::GET, uri, None).await?;
        decode_vm(&body)
    }

    #[instrument(skip_all, fields(namespace = %self.namespace, name = ?vm.metadata.name))]
    async fn create_vm(&self, vm: &VirtualMachine) -> Result<VirtualMachine, ClientError> {
        let json = serde_json::to_string(vm).map_err(ClientError::Serialize)?;
        trace!("VirtualMachine sent: {}", json);
        let uri = self.uri(&self.vm_path(None)?, &BTreeMap::new())?;
        let body = self.send(Method::POST, uri, Some(json)).await?;
        decode_vm(&body)
    }
}
