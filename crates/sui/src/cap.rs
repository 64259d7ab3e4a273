use serde_json::{json, Value};
use tracing::debug;

use crate::error::{Result, SuiInterfaceError};
use crate::rpc::SuiRpcClient;

/// Normalize an object id by ensuring the 0x prefix
fn with_prefix(id: &str) -> String {
    if id.starts_with("0x") {
        id.to_string()
    } else {
        format!("0x{}", id)
    }
}

/// Find the cap object proving `owner`'s management rights over `album_id`.
///
/// Scans the owner's objects of the cap struct type, page by page, and
/// matches the cap's recorded album id. There is at most one cap per album
/// per owner; nothing is cached. Absence is a distinct error the caller must
/// handle by re-triggering the lookup.
pub async fn find_album_cap(
    rpc: &SuiRpcClient,
    owner: &str,
    cap_type: &str,
    album_id: &str,
) -> Result<String> {
    let wanted = with_prefix(album_id);
    let mut cursor = Value::Null;

    loop {
        let page = rpc
            .call(
                "suix_getOwnedObjects",
                json!([
                    owner,
                    {
                        "filter": { "StructType": cap_type },
                        "options": { "showContent": true }
                    },
                    cursor.clone(),
                    null,
                ]),
            )
            .await?;

        let items = page
            .get("data")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                SuiInterfaceError::ParseError("getOwnedObjects response has no data".to_string())
            })?;

        for item in items {
            let Some(data) = item.get("data") else { continue };
            let cap_album = data
                .pointer("/content/fields/album_id")
                .and_then(Value::as_str);
            if cap_album.map(with_prefix).as_deref() == Some(wanted.as_str()) {
                if let Some(object_id) = data.get("objectId").and_then(Value::as_str) {
                    debug!("Found cap {} for album {}", object_id, wanted);
                    return Ok(object_id.to_string());
                }
            }
        }

        let has_next = page
            .get("hasNextPage")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !has_next {
            break;
        }
        cursor = page.get("nextCursor").cloned().unwrap_or(Value::Null);
    }

    Err(SuiInterfaceError::CapNotFound {
        owner: owner.to_string(),
        album_id: wanted,
    })
}
