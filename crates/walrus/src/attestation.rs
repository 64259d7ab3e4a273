use serde_json::{json, Value};

use crate::error::{Result, WalrusError};

/// Canonical record for a blob accepted by the storage network.
///
/// The publisher daemon answers with one of two shapes depending on whether
/// the blob was new to the network (`newlyCreated`) or already registered by
/// someone else (`alreadyCertified`). Both are flattened into this struct;
/// anything else is rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct BlobAttestation {
    pub blob_id: String,
    /// On-chain object id of the blob, when the network created one for us.
    pub sui_object_id: Option<String>,
    pub registered_epoch: u64,
    pub certified_epoch: Option<u64>,
    pub size: u64,
    pub start_epoch: u64,
    pub end_epoch: u64,
    pub deletable: bool,
    pub cost: u64,
    /// Raw resource-operation metadata from the daemon, synthesized for
    /// `alreadyCertified` responses which do not carry one.
    pub resource_operation: Value,
    pub newly_created: bool,
}

/// Flatten a publisher store response into a [`BlobAttestation`].
///
/// `payload_size` is the size of the uploaded ciphertext; it backfills the
/// size field for `alreadyCertified` responses, which omit it.
pub fn normalize_store_response(info: &Value, payload_size: u64) -> Result<BlobAttestation> {
    if let Some(created) = info.get("newlyCreated") {
        return normalize_newly_created(created);
    }
    if let Some(certified) = info.get("alreadyCertified") {
        return normalize_already_certified(certified, payload_size);
    }
    Err(WalrusError::UnrecognizedShape(
        info.as_object()
            .map(|o| o.keys().cloned().collect::<Vec<_>>().join(","))
            .unwrap_or_else(|| "non-object response".to_string()),
    ))
}

fn normalize_newly_created(created: &Value) -> Result<BlobAttestation> {
    let object = created
        .get("blobObject")
        .ok_or_else(|| WalrusError::UnrecognizedShape("newlyCreated without blobObject".into()))?;

    let blob_id = require_str(object, "blobId")?;
    let registered_epoch = require_u64(object, "registeredEpoch")?;
    let size = require_u64(object, "size")?;
    let certified_epoch = object.get("certifiedEpoch").and_then(Value::as_u64);
    let deletable = object
        .get("deletable")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    // The storage window rides in a nested wrapper object.
    let storage = object
        .get("storage")
        .ok_or_else(|| WalrusError::UnrecognizedShape("blobObject without storage".into()))?;
    let start_epoch = require_u64(storage, "startEpoch")?;
    let end_epoch = require_u64(storage, "endEpoch")?;

    let sui_object_id = object
        .get("id")
        .and_then(Value::as_str)
        .map(|s| s.to_string());
    let cost = created.get("cost").and_then(Value::as_u64).unwrap_or(0);
    let resource_operation = created
        .get("resourceOperation")
        .cloned()
        .unwrap_or_else(|| json!({ "registerFromScratch": null }));

    Ok(BlobAttestation {
        blob_id,
        sui_object_id,
        registered_epoch,
        certified_epoch,
        size,
        start_epoch,
        end_epoch,
        deletable,
        cost,
        resource_operation,
        newly_created: true,
    })
}

fn normalize_already_certified(certified: &Value, payload_size: u64) -> Result<BlobAttestation> {
    let blob_id = require_str(certified, "blobId")?;
    let end_epoch = require_u64(certified, "endEpoch")?;

    // The daemon reports neither epochs nor cost for a blob someone else
    // already paid for; record the certification event instead.
    let resource_operation = json!({
        "alreadyCertified": {
            "event": certified.get("event").cloned().unwrap_or(Value::Null),
        }
    });

    Ok(BlobAttestation {
        blob_id,
        sui_object_id: None,
        registered_epoch: 0,
        certified_epoch: None,
        size: payload_size,
        start_epoch: 0,
        end_epoch,
        deletable: false,
        cost: 0,
        resource_operation,
        newly_created: false,
    })
}

fn require_str(value: &Value, field: &str) -> Result<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(|s| s.to_string())
        .ok_or_else(|| WalrusError::UnrecognizedShape(format!("missing string field {}", field)))
}

fn require_u64(value: &Value, field: &str) -> Result<u64> {
    value
        .get(field)
        .and_then(Value::as_u64)
        .ok_or_else(|| WalrusError::UnrecognizedShape(format!("missing numeric field {}", field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn newly_created_fixture() -> Value {
        json!({
            "newlyCreated": {
                "blobObject": {
                    "id": "0xb1ab",
                    "registeredEpoch": 34,
                    "blobId": "M4hsZGQ1oCktdzegB6HnI6Mi28S2nqOPHxK-W7_4BUk",
                    "size": 17,
                    "encodingType": "RS2",
                    "certifiedEpoch": 35,
                    "storage": {
                        "id": "0x57a8",
                        "startEpoch": 34,
                        "endEpoch": 37,
                        "storageSize": 66034000
                    },
                    "deletable": false
                },
                "resourceOperation": {
                    "registerFromScratch": {
                        "encodedLength": 66034000,
                        "epochsAhead": 3
                    }
                },
                "cost": 132300
            }
        })
    }

    #[test]
    fn normalizes_newly_created() {
        let att = normalize_store_response(&newly_created_fixture(), 17).unwrap();
        assert_eq!(att.blob_id, "M4hsZGQ1oCktdzegB6HnI6Mi28S2nqOPHxK-W7_4BUk");
        assert_eq!(att.sui_object_id.as_deref(), Some("0xb1ab"));
        assert_eq!(att.registered_epoch, 34);
        assert_eq!(att.certified_epoch, Some(35));
        assert_eq!(att.size, 17);
        assert_eq!(att.start_epoch, 34);
        assert_eq!(att.end_epoch, 37);
        assert_eq!(att.cost, 132300);
        assert!(att.newly_created);
        assert!(att.resource_operation.get("registerFromScratch").is_some());
    }

    #[test]
    fn normalizes_already_certified_and_synthesizes_metadata() {
        let info = json!({
            "alreadyCertified": {
                "blobId": "xyzBlob",
                "event": { "txDigest": "4pZ9", "eventSeq": "0" },
                "endEpoch": 41
            }
        });
        let att = normalize_store_response(&info, 2048).unwrap();
        assert_eq!(att.blob_id, "xyzBlob");
        assert_eq!(att.size, 2048);
        assert_eq!(att.end_epoch, 41);
        assert_eq!(att.cost, 0);
        assert!(!att.newly_created);
        assert_eq!(
            att.resource_operation
                .pointer("/alreadyCertified/event/txDigest")
                .and_then(Value::as_str),
            Some("4pZ9")
        );
    }

    #[test]
    fn rejects_unknown_shape() {
        let info = json!({ "markedInvalid": { "blobId": "b" } });
        let err = normalize_store_response(&info, 0).unwrap_err();
        assert!(matches!(err, WalrusError::UnrecognizedShape(_)));
    }

    #[test]
    fn rejects_missing_storage_window() {
        let mut info = newly_created_fixture();
        info.pointer_mut("/newlyCreated/blobObject")
            .unwrap()
            .as_object_mut()
            .unwrap()
            .remove("storage");
        let err = normalize_store_response(&info, 17).unwrap_err();
        assert!(matches!(err, WalrusError::UnrecognizedShape(_)));
    }

    #[test]
    fn uncertified_blob_has_no_certified_epoch() {
        let mut info = newly_created_fixture();
        *info
            .pointer_mut("/newlyCreated/blobObject/certifiedEpoch")
            .unwrap() = Value::Null;
        let att = normalize_store_response(&info, 17).unwrap();
        assert_eq!(att.certified_epoch, None);
    }
}
