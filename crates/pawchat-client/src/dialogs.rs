use tracing::info;

use pawchat_shared::DialogSummary;

use crate::api::ChatApi;
use crate::error::Result;

/// Fetch the conversation list, most recent first. Read-only.
pub async fn load_dialogs(api: &dyn ChatApi) -> Result<Vec<DialogSummary>> {
    let dialogs = api.list_dialogs().await?;
    info!(count = dialogs.len(), "Dialogs loaded");
    Ok(dialogs)
}
