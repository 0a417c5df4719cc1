//! RPC method handler for the Linkbook JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_method` dispatches a method call to the engine, the relocation
//! session or the settings engine held by the `App`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::app::App;
use crate::managers::cascade_delete::{GroupDeletion, PendingGroupDeletion};
use crate::managers::linkbook_manager::log_store_error;
use crate::store::RecordStore;
use crate::types::errors::{ErrorKind, LinkbookError, SettingsError};
use crate::types::link::{EntityKind, ROOT_GROUP_ID};
use crate::types::relocation::{Direction, Listing, RelocationDescriptor};

/// Error payload returned to the RPC client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RpcError {
    /// `validation`, `notFound`, `storeFailure`, `invalidParams`,
    /// `unknownMethod` or `settings`.
    pub kind: &'static str,
    pub message: String,
}

impl RpcError {
    fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            kind: "invalidParams",
            message: message.into(),
        }
    }
}

impl From<LinkbookError> for RpcError {
    fn from(err: LinkbookError) -> Self {
        let kind = match err.kind() {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "notFound",
            ErrorKind::StoreFailure => "storeFailure",
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

impl From<SettingsError> for RpcError {
    fn from(err: SettingsError) -> Self {
        Self {
            kind: "settings",
            message: err.to_string(),
        }
    }
}

/// Required parameter.
fn param<T: DeserializeOwned>(params: &Value, key: &str) -> Result<T, RpcError> {
    let raw = params
        .get(key)
        .cloned()
        .ok_or_else(|| RpcError::invalid_params(format!("missing {}", key)))?;
    serde_json::from_value(raw).map_err(|e| RpcError::invalid_params(format!("invalid {}: {}", key, e)))
}

/// Optional parameter; `null` counts as absent.
fn opt_param<T: DeserializeOwned>(params: &Value, key: &str) -> Result<Option<T>, RpcError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => param(params, key).map(Some),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(|e| RpcError {
        kind: "storeFailure",
        message: e.to_string(),
    })
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
pub async fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, RpcError> {
    match method {
        // ─── Tree ───
        "linkbook.compile" => {
            let a = app.lock().await;
            let tree = a.linkbook.compile_linkbook_data().await?;
            to_json(&tree)
        }

        // ─── Links ───
        "link.create" => {
            let name: String = param(params, "name")?;
            let link: String = param(params, "link")?;
            let parent = opt_param(params, "parent")?.unwrap_or(ROOT_GROUP_ID);
            let is_pinned = opt_param(params, "isPinned")?.unwrap_or(false);
            let a = app.lock().await;
            let created = a.linkbook.create_link(&name, &link, parent, is_pinned).await?;
            to_json(&created)
        }
        "link.edit" => {
            let id: i64 = param(params, "id")?;
            let name: String = param(params, "name")?;
            let link: String = param(params, "link")?;
            let a = app.lock().await;
            let edited = a.linkbook.edit_link_name_and_link(id, &name, &link).await?;
            to_json(&edited)
        }
        "link.pin" => {
            let id: i64 = param(params, "id")?;
            let is_pinned: bool = param(params, "isPinned")?;
            let a = app.lock().await;
            let edited = a.linkbook.edit_link_pin(id, is_pinned).await?;
            to_json(&edited)
        }
        "link.delete" => {
            let id: i64 = param(params, "id")?;
            let a = app.lock().await;
            let deleted = a.linkbook.delete_link(id).await?;
            Ok(json!({"id": deleted}))
        }
        "link.open" => {
            let id: i64 = param(params, "id")?;
            let a = app.lock().await;
            let link = a
                .linkbook
                .store()
                .get_link(id)
                .await
                .map_err(log_store_error)?
                .ok_or(LinkbookError::LinkNotFound(id))?;
            Ok(json!({"url": a.relocation.activation_url(&link)}))
        }

        // ─── Groups ───
        "group.create" => {
            let is_pinned = opt_param(params, "isPinned")?.unwrap_or(false);
            let a = app.lock().await;
            let group = a.linkbook.create_group(is_pinned).await?;
            to_json(&group)
        }
        "group.rename" => {
            let id: i64 = param(params, "id")?;
            let name: String = param(params, "name")?;
            let a = app.lock().await;
            let group = a.linkbook.edit_group_name(id, &name).await?;
            to_json(&group)
        }
        "group.pin" => {
            let id: i64 = param(params, "id")?;
            let is_pinned: bool = param(params, "isPinned")?;
            let a = app.lock().await;
            let group = a.linkbook.edit_group_pin(id, is_pinned).await?;
            to_json(&group)
        }
        "group.delete" => {
            let id: i64 = param(params, "id")?;
            let a = app.lock().await;
            match a.linkbook.delete_group(id).await? {
                GroupDeletion::Deleted(group) => Ok(json!({"status": "deleted", "group": group})),
                GroupDeletion::ConfirmationRequired(pending) => {
                    Ok(json!({"status": "confirmationRequired", "pending": pending}))
                }
            }
        }
        "group.delete.confirm" => {
            let pending: PendingGroupDeletion = param(params, "pending")?;
            let a = app.lock().await;
            let deleted = a.linkbook.confirm_group_deletion(pending).await?;
            to_json(&deleted)
        }
        "group.choices" => {
            let a = app.lock().await;
            let label = a.settings().display.ungrouped_label.clone();
            let choices = a.linkbook.group_choices(&label).await?;
            let arr: Vec<Value> = choices
                .into_iter()
                .map(|(id, name)| json!({"id": id, "name": name}))
                .collect();
            Ok(json!(arr))
        }

        // ─── Relocation ───
        "relocation.begin" => {
            let id: i64 = param(params, "id")?;
            let kind: EntityKind = param(params, "kind")?;
            let listing: Listing = opt_param(params, "listing")?.unwrap_or_default();
            let mut a = app.lock().await;
            a.relocation.begin_relocation(id, kind, listing);
            Ok(json!({"ok": true}))
        }
        "relocation.hover" => {
            let id: i64 = param(params, "id")?;
            let kind: EntityKind = param(params, "kind")?;
            let direction: Direction = param(params, "direction")?;
            let mut a = app.lock().await;
            let accepted = a.relocation.hover_target(id, kind, direction);
            Ok(json!({"ok": accepted}))
        }
        "relocation.leave" => {
            let mut a = app.lock().await;
            a.relocation.clear_hover();
            Ok(json!({"ok": true}))
        }
        "relocation.commit" => {
            let mut guard = app.lock().await;
            let App {
                linkbook,
                relocation,
                ..
            } = &mut *guard;
            let outcome = linkbook.commit_relocation(relocation).await?;
            to_json(&outcome)
        }
        "relocation.cancel" => {
            let mut a = app.lock().await;
            let outcome = a.relocation.cancel_relocation();
            to_json(&outcome)
        }
        "relocation.apply" => {
            let descriptor: RelocationDescriptor = param(params, "descriptor")?;
            let a = app.lock().await;
            a.linkbook.relocate(descriptor).await?;
            Ok(json!({"ok": true}))
        }

        // ─── Quick navigation ───
        "quicknav.list" => {
            let a = app.lock().await;
            let nav = a.quick_nav().await?;
            to_json(&nav.entries())
        }
        "quicknav.resolve" => {
            let digit: usize = param(params, "digit")?;
            let a = app.lock().await;
            let nav = a.quick_nav().await?;
            Ok(json!({"url": nav.resolve(digit)}))
        }

        // ─── Settings ───
        "settings.get" => {
            let a = app.lock().await;
            to_json(a.settings())
        }
        "settings.set" => {
            let key: String = param(params, "key")?;
            let value = params
                .get("value")
                .cloned()
                .ok_or_else(|| RpcError::invalid_params("missing value"))?;
            let mut a = app.lock().await;
            a.set_setting(&key, value)?;
            Ok(json!({"ok": true}))
        }
        "settings.reset" => {
            let mut a = app.lock().await;
            a.reset_settings()?;
            Ok(json!({"ok": true}))
        }

        _ => Err(RpcError {
            kind: "unknownMethod",
            message: format!("unknown method: {}", method),
        }),
    }
}
