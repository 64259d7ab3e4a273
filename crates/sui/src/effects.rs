use serde_json::Value;

use crate::error::{Result, SuiInterfaceError};

/// Outcome of an executed transaction, always inspected as a value.
#[derive(Debug, Clone, PartialEq)]
pub enum TxStatus {
    Approved { digest: String },
    Failed { reason: String, digest: Option<String> },
    RejectedBySigner,
}

impl TxStatus {
    pub fn is_approved(&self) -> bool {
        matches!(self, TxStatus::Approved { .. })
    }
}

/// A created on-chain object, tagged by its ownership kind.
#[derive(Debug, Clone, PartialEq)]
pub enum CreatedObject {
    Shared {
        object_id: String,
        object_type: String,
    },
    AddressOwned {
        object_id: String,
        object_type: String,
        owner: String,
    },
    Other {
        object_id: String,
        object_type: String,
    },
}

impl CreatedObject {
    pub fn object_id(&self) -> &str {
        match self {
            CreatedObject::Shared { object_id, .. }
            | CreatedObject::AddressOwned { object_id, .. }
            | CreatedObject::Other { object_id, .. } => object_id,
        }
    }
}

/// The two objects an album-create transaction must produce: the shared
/// album record and the creator's address-owned cap.
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumCreation {
    pub album_id: String,
    pub cap_id: String,
}

impl AlbumCreation {
    /// Map created objects by ownership tag: Shared is the album, AddressOwner
    /// is the cap. Missing either is fatal for a create call.
    pub fn from_created(created: &[CreatedObject]) -> Result<Self> {
        let album_id = created.iter().find_map(|obj| match obj {
            CreatedObject::Shared { object_id, .. } => Some(object_id.clone()),
            _ => None,
        });
        let cap_id = created.iter().find_map(|obj| match obj {
            CreatedObject::AddressOwned { object_id, .. } => Some(object_id.clone()),
            _ => None,
        });

        match (album_id, cap_id) {
            (Some(album_id), Some(cap_id)) => Ok(Self { album_id, cap_id }),
            (None, _) => Err(SuiInterfaceError::InvalidObjectFormat(
                "album creation produced no shared object".to_string(),
            )),
            (_, None) => Err(SuiInterfaceError::InvalidObjectFormat(
                "album creation produced no address-owned cap".to_string(),
            )),
        }
    }
}

/// Extract the transaction status from an executeTransactionBlock result.
pub fn parse_status(result: &Value) -> TxStatus {
    let digest = result
        .get("digest")
        .and_then(Value::as_str)
        .map(|s| s.to_string());

    let status = result
        .pointer("/effects/status/status")
        .and_then(Value::as_str);

    match status {
        Some("success") => TxStatus::Approved {
            digest: digest.unwrap_or_else(|| "unknown".to_string()),
        },
        Some(_) => TxStatus::Failed {
            reason: result
                .pointer("/effects/status/error")
                .and_then(Value::as_str)
                .unwrap_or("unknown failure")
                .to_string(),
            digest,
        },
        None => TxStatus::Failed {
            reason: "transaction effects missing from response".to_string(),
            digest,
        },
    }
}

/// Extract created objects from the result's objectChanges list.
pub fn parse_created_objects(result: &Value) -> Vec<CreatedObject> {
    let Some(changes) = result.get("objectChanges").and_then(Value::as_array) else {
        return Vec::new();
    };

    changes
        .iter()
        .filter(|c| c.get("type").and_then(Value::as_str) == Some("created"))
        .filter_map(|c| {
            let object_id = c.get("objectId").and_then(Value::as_str)?.to_string();
            let object_type = c
                .get("objectType")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();

            let owner = c.get("owner")?;
            if owner.get("Shared").is_some() {
                Some(CreatedObject::Shared {
                    object_id,
                    object_type,
                })
            } else if let Some(addr) = owner.get("AddressOwner").and_then(Value::as_str) {
                Some(CreatedObject::AddressOwned {
                    object_id,
                    object_type,
                    owner: addr.to_string(),
                })
            } else {
                Some(CreatedObject::Other {
                    object_id,
                    object_type,
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_result() -> Value {
        json!({
            "digest": "9XmTqA",
            "effects": { "status": { "status": "success" } },
            "objectChanges": [
                {
                    "type": "created",
                    "owner": { "Shared": { "initial_shared_version": 5 } },
                    "objectType": "0xp::albums::Album",
                    "objectId": "0xa1"
                },
                {
                    "type": "created",
                    "owner": { "AddressOwner": "0xowner" },
                    "objectType": "0xp::albums::AlbumCap",
                    "objectId": "0xc1"
                },
                {
                    "type": "mutated",
                    "owner": { "AddressOwner": "0xowner" },
                    "objectType": "0x2::coin::Coin<0x2::sui::SUI>",
                    "objectId": "0xgas"
                }
            ]
        })
    }

    #[test]
    fn success_status_is_approved_with_digest() {
        let status = parse_status(&create_result());
        assert_eq!(
            status,
            TxStatus::Approved {
                digest: "9XmTqA".to_string()
            }
        );
    }

    #[test]
    fn failure_status_carries_reason() {
        let result = json!({
            "digest": "9XmTqA",
            "effects": { "status": { "status": "failure", "error": "MoveAbort: 7" } }
        });
        let status = parse_status(&result);
        assert_eq!(
            status,
            TxStatus::Failed {
                reason: "MoveAbort: 7".to_string(),
                digest: Some("9XmTqA".to_string())
            }
        );
    }

    #[test]
    fn created_objects_map_to_album_and_cap_by_ownership() {
        let created = parse_created_objects(&create_result());
        assert_eq!(created.len(), 2);
        let creation = AlbumCreation::from_created(&created).unwrap();
        assert_eq!(creation.album_id, "0xa1");
        assert_eq!(creation.cap_id, "0xc1");
    }

    #[test]
    fn missing_ownership_tag_is_fatal() {
        let created = vec![CreatedObject::Shared {
            object_id: "0xa1".to_string(),
            object_type: "0xp::albums::Album".to_string(),
        }];
        let err = AlbumCreation::from_created(&created).unwrap_err();
        assert!(matches!(err, SuiInterfaceError::InvalidObjectFormat(_)));
    }
}
