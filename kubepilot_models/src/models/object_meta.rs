use std::collections::BTreeMap;

use uuid::Uuid;

/// ObjectMeta : Metadata of a persisted object. `uid`, `resourceVersion` and
/// `creationTimestamp` are assigned by the API server and never sent on create.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(rename = "name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "namespace", skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(rename = "labels", skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
    #[serde(rename = "uid", skip_serializing_if = "Option::is_none")]
    pub uid: Option<Uuid>,
    #[serde(rename = "resourceVersion", skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(rename = "creationTimestamp", skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<String>,
}

impl ObjectMeta {
    pub fn new(name: String) -> ObjectMeta {
        ObjectMeta {
            name: Some(name),
            ..ObjectMeta::default()
        }
    }
}

/// TemplateMeta : Metadata of the instance template embedded in a virtual
/// machine. `creationTimestamp` is always written, as `null` when unset.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct TemplateMeta {
    #[serde(rename = "creationTimestamp", default)]
    pub creation_timestamp: Option<String>,
    #[serde(rename = "labels", skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
}

/// ListMeta : Metadata of a list response.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct ListMeta {
    #[serde(rename = "resourceVersion", skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(rename = "continue", skip_serializing_if = "Option::is_none")]
    pub _continue: Option<String>,
}
