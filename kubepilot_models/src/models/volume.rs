/// Volume : Storage backing a disk of the same name. Exactly one source is set.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Volume {
    #[serde(rename = "name")]
    pub name: String,
    #[serde(rename = "containerDisk", skip_serializing_if = "Option::is_none")]
    pub container_disk: Option<ContainerDiskSource>,
    #[serde(rename = "persistentVolumeClaim", skip_serializing_if = "Option::is_none")]
    pub persistent_volume_claim: Option<PersistentVolumeClaimSource>,
    /// Raw NoCloud payload (`userData`, `networkData`, ...).
    #[serde(rename = "cloudInitNoCloud", skip_serializing_if = "Option::is_none")]
    pub cloud_init_no_cloud: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Volume {
    pub fn new(name: String) -> Volume {
        Volume {
            name,
            ..Volume::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct ContainerDiskSource {
    #[serde(rename = "image")]
    pub image: String,
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct PersistentVolumeClaimSource {
    #[serde(rename = "claimName")]
    pub claim_name: String,
}
