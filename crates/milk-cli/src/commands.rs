use std::path::Path;

use color_eyre::{eyre::bail, Result, Section};
use milk_api::{ApiClient, ReqwestTransport};
use milk_auth::{AuthFlow, AuthOutcome};
use milk_core::{CredentialStore, Credentials, ListSummary, TaskSummary};
use milk_storage::ConfigFileStore;
use tracing::debug;

use crate::prompt::LinePrompt;

/// Run the interactive handshake if the stored token is missing or stale.
pub async fn authenticate(config: &Path) -> Result<()> {
    let store = ConfigFileStore::new(config);
    let mut client = load_client(&store).await?;
    if client.credentials().auth_token().is_some() {
        println!("Have authentication token.");
    }

    match AuthFlow::new(store, LinePrompt::stdio())
        .run(&mut client)
        .await?
    {
        AuthOutcome::AlreadyValid => println!("Token is valid. Done here."),
        AuthOutcome::Issued { .. } => {
            println!("Got auth token. Saved to configuration file {}.", config.display())
        }
    }
    Ok(())
}

pub async fn lists(config: &Path) -> Result<()> {
    let client = load_client(&ConfigFileStore::new(config)).await?;
    for list in client.get_all_lists().await? {
        println!("{}", list_line(&list));
    }
    Ok(())
}

pub async fn tasks(config: &Path, list_id: &str, include_completed: bool) -> Result<()> {
    let client = load_client(&ConfigFileStore::new(config)).await?;
    for task in client
        .get_tasks_from_list(list_id, !include_completed)
        .await?
    {
        println!("{}", task_line(&task));
    }
    Ok(())
}

/// Write placeholder credentials; never clobbers an existing file.
pub async fn config_sample(output: &Path) -> Result<()> {
    if output.exists() {
        bail!("{} already exists; not overwriting", output.display());
    }
    ConfigFileStore::new(output)
        .save(&sample_credentials())
        .await?;
    println!("Sample configuration written to {}", output.display());
    Ok(())
}

async fn load_client(store: &ConfigFileStore) -> Result<ApiClient<ReqwestTransport>> {
    let credentials = store
        .load()
        .await
        .suggestion("run `milk configsample` to write a sample config file")?;
    debug!(path = %store.path().display(), "credentials loaded");
    Ok(ApiClient::from_credentials(credentials)?)
}

fn sample_credentials() -> Credentials {
    Credentials::new("my_api_key", "my_shared_secret")
}

fn list_line(list: &ListSummary) -> String {
    format!("{}\t{}", list.id, list.name)
}

fn task_line(task: &TaskSummary) -> String {
    format!(
        "{}\t{}\t{}",
        task.id,
        task.name,
        task.created.format("%Y-%m-%d %H:%M:%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_line_is_tab_separated() {
        let task = TaskSummary {
            id: "259376921".into(),
            name: "Buy milk".into(),
            created: "2015-05-07T10:19:54Z".parse().expect("timestamp"),
            completed: false,
        };
        assert_eq!(task_line(&task), "259376921\tBuy milk\t2015-05-07 10:19:54");
    }

    #[test]
    fn list_line_is_tab_separated() {
        let list = ListSummary {
            id: "100653".into(),
            name: "Inbox".into(),
        };
        assert_eq!(list_line(&list), "100653\tInbox");
    }

    #[tokio::test]
    async fn config_sample_writes_placeholders_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sample.toml");

        config_sample(&path).await.expect("first write");
        let written = ConfigFileStore::new(&path).load().await.expect("load");
        assert_eq!(written, sample_credentials());

        config_sample(&path)
            .await
            .expect_err("existing file must not be overwritten");
    }

    #[tokio::test]
    async fn missing_config_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = lists(&dir.path().join("absent.toml"))
            .await
            .expect_err("should fail");
        assert!(err.to_string().contains("not found"));
    }
}
