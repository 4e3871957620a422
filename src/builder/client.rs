use std::env::var;

use crate::{
    builder::{Builder, BuilderError},
    http::{Endpoint, HttpVmService},
};

/// Endpoint used when nothing is configured, the default `kubectl proxy` address
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8001";
pub const DEFAULT_NAMESPACE: &str = "default";

/// Configuration of a [HttpVmService]
#[derive(Debug, Default)]
pub struct ClientBuilder {
    endpoint: Option<String>,
    namespace: Option<String>,
    token: Option<String>,
}

impl ClientBuilder {
    pub fn new() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Read a variable from the environment, an empty value is ignored
    fn find_from_env(key: &str) -> Option<String> {
        match var(key) {
            Ok(value) if !value.trim().is_empty() => Some(value),
            Ok(_) => {
                log::warn!("{} is set but empty, ignoring it", key);
                None
            }
            Err(_) => None,
        }
    }

    /// Create a builder from the environment (upper take priority over lower):
    ///
    /// - `KUBEPILOT_ENDPOINT`, `KUBEPILOT_NAMESPACE` and `KUBEPILOT_TOKEN`
    ///   environment variables
    /// - [DEFAULT_ENDPOINT] and [DEFAULT_NAMESPACE], no token
    pub fn auto() -> ClientBuilder {
        let endpoint = Self::find_from_env("KUBEPILOT_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let namespace = Self::find_from_env("KUBEPILOT_NAMESPACE")
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

        let builder = Self::new()
            .with_endpoint(endpoint)
            .with_namespace(namespace);
        match Self::find_from_env("KUBEPILOT_TOKEN") {
            Some(token) => builder.with_token(token),
            None => builder,
        }
    }

    /// `http://host:port` or `unix:///path/to/socket`
    pub fn with_endpoint(mut self, endpoint: String) -> ClientBuilder {
        self.endpoint = Some(endpoint);
        self
    }

    pub fn with_namespace(mut self, namespace: String) -> ClientBuilder {
        self.namespace = Some(namespace);
        self
    }

    pub fn with_token(mut self, token: String) -> ClientBuilder {
        self.token = Some(token);
        self
    }
}

impl Builder<HttpVmService> for ClientBuilder {
    fn try_build(self) -> Result<HttpVmService, BuilderError> {
        let endpoint = super::require(stringify!(self.endpoint), self.endpoint)?;
        let endpoint = Endpoint::parse(&endpoint)?;
        if let Endpoint::Unix(socket) = &endpoint {
            if !socket.exists() {
                return Err(BuilderError::SocketNotFound(socket.display().to_string()));
            }
        }

        let namespace = self
            .namespace
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        let service = HttpVmService::new(endpoint, namespace);
        Ok(match self.token {
            Some(token) => service.with_token(token),
            None => service,
        })
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use std::fs::File;

    use tempfile::tempdir;

    use crate::builder::client::ClientBuilder;
    use crate::builder::{Builder, BuilderError};
    use crate::service::VmService;

    fn clear_env() {
        std::env::remove_var("KUBEPILOT_ENDPOINT");
        std::env::remove_var("KUBEPILOT_NAMESPACE");
        std::env::remove_var("KUBEPILOT_TOKEN");
    }

    #[test]
    fn test_client_builder() {
        let service = ClientBuilder::new()
            .with_endpoint("http://127.0.0.1:8001".to_string())
            .with_namespace("vms".to_string())
            .try_build()
            .unwrap();
        assert_eq!(service.namespace(), "vms");
    }

    #[test]
    fn test_client_builder_required_fields() {
        let result = ClientBuilder::new()
            .with_namespace("vms".to_string())
            .try_build();
        assert_eq!(
            result.unwrap_err(),
            BuilderError::MissingRequiredField(stringify!(self.endpoint).to_string())
        );
    }

    #[test]
    fn test_namespace_defaults() {
        let service = ClientBuilder::new()
            .with_endpoint("http://127.0.0.1:8001".to_string())
            .try_build()
            .unwrap();
        assert_eq!(service.namespace(), "default");
    }

    #[test]
    fn test_invalid_endpoint() {
        let result = ClientBuilder::new()
            .with_endpoint("ftp://127.0.0.1".to_string())
            .try_build();
        assert!(matches!(result, Err(BuilderError::InvalidEndpoint(_))));
    }

    #[test]
    fn test_unix_socket_must_exist() {
        let result = ClientBuilder::new()
            .with_endpoint("unix:///tmp/invalid_path/kubectl.sock".to_string())
            .try_build();
        assert_eq!(
            result.unwrap_err(),
            BuilderError::SocketNotFound("/tmp/invalid_path/kubectl.sock".to_string())
        );
    }

    #[test]
    fn test_unix_socket() {
        let dir = tempdir().expect("failed to create temporary directory");
        let socket = dir.path().join("kubectl.sock");
        let _file = File::create(&socket).expect("failed to create temporary file");

        let result = ClientBuilder::new()
            .with_endpoint(format!("unix://{}", socket.display()))
            .try_build();
        assert!(result.is_ok());
    }

    #[test]
    #[serial]
    fn test_auto_from_env() {
        clear_env();
        std::env::set_var("KUBEPILOT_ENDPOINT", "http://10.0.0.1:8080");
        std::env::set_var("KUBEPILOT_NAMESPACE", "virt");
        std::env::set_var("KUBEPILOT_TOKEN", "abc");

        let builder = ClientBuilder::auto();
        assert_eq!(builder.endpoint.as_deref(), Some("http://10.0.0.1:8080"));
        assert_eq!(builder.namespace.as_deref(), Some("virt"));
        assert_eq!(builder.token.as_deref(), Some("abc"));
        assert_eq!(builder.try_build().unwrap().namespace(), "virt");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_auto_defaults() {
        clear_env();
        std::env::set_var("KUBEPILOT_NAMESPACE", "  ");

        let builder = ClientBuilder::auto();
        assert_eq!(builder.endpoint.as_deref(), Some(super::DEFAULT_ENDPOINT));
        assert_eq!(builder.namespace.as_deref(), Some(super::DEFAULT_NAMESPACE));
        assert_eq!(builder.token, None);
        clear_env();
    }
}
