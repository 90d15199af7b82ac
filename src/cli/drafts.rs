use crate::cli::commands::{DraftAction, DraftArgs, DraftTarget};
use crate::config::load_config;
use crate::drafts::DraftStore;
use crate::errors::RoofdeskError;

async fn store_for(target: &DraftTarget) -> Result<DraftStore, RoofdeskError> {
    let config = load_config(target.config.as_deref()).await?;
    let dir = target.dir.clone().unwrap_or(config.drafts.directory.clone());
    Ok(DraftStore::new(dir, config.drafts.ttl()))
}

pub async fn handle_draft(args: DraftArgs) -> Result<(), RoofdeskError> {
    match args.action {
        DraftAction::Show(target) => {
            let store = store_for(&target).await?;
            let draft = store
                .load(&target.user)
                .await?
                .ok_or_else(|| RoofdeskError::NotFound(format!("no draft stored for user {}", target.user)))?;
            println!("{}", serde_json::to_string_pretty(&draft)?);
        }
        DraftAction::Clear(target) => {
            let store = store_for(&target).await?;
            if store.remove(&target.user).await? {
                println!("Draft removed for user {}", target.user);
            } else {
                println!("No draft stored for user {}", target.user);
            }
        }
    }
    Ok(())
}
