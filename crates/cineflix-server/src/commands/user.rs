use crate::output::Output;
use crate::UserCommands;
use cineflix_config::{Config, PathManager};
use cineflix_core::{JsonUserStore, UserService};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::sync::Arc;

async fn open_users(config: &Config, paths: &PathManager) -> Result<UserService> {
    let paths = match &config.storage.data_dir {
        Some(dir) => paths.clone().with_data_dir(dir),
        None => paths.clone(),
    };
    let store = JsonUserStore::open(paths.users_file())
        .await
        .map_err(|e| eyre!("Failed to open user store at {}: {}", paths.users_file().display(), e))?;
    Ok(UserService::new(Arc::new(store)))
}

pub async fn run_user(cmd: UserCommands, config: &Config, paths: &PathManager, output: &Output) -> Result<()> {
    let users = open_users(config, paths).await?;

    match cmd {
        UserCommands::Add { name, email, password } => {
            let password = match password {
                Some(password) => password,
                None => rpassword::prompt_password("Password: ")?,
            };
            let profile = users.create_user(&name, &email, &password).await.map_err(|e| eyre!("{}", e))?;
            output.success(format!("Created user {} ({})", profile.email, profile.id));
            output.warn("A running server keeps its own copy of the accounts; restart it to pick up this change.");
        }
        UserCommands::List => {
            let rows = users
                .list_users()
                .await
                .map_err(|e| eyre!("{}", e))?
                .into_iter()
                .map(|user| {
                    vec![
                        user.id.to_string(),
                        user.name,
                        user.email,
                        user.created_at.format("%Y-%m-%d %H:%M").to_string(),
                    ]
                })
                .collect();
            output.table(&["Id", "Name", "Email", "Created"], rows);
        }
        UserCommands::Passwd { email, password } => {
            let password = match password {
                Some(password) => password,
                None => rpassword::prompt_password("New password: ")?,
            };
            let profile = users.set_password(&email, &password).await.map_err(|e| eyre!("{}", e))?;
            output.success(format!("Password updated for {}", profile.email));
            output.warn("A running server keeps its own copy of the accounts; restart it to pick up this change.");
        }
        UserCommands::Remove { email } => {
            let profile = users.find_by_email(&email).await.map_err(|e| eyre!("{}", e))?;
            users.delete_user(&profile.id).await.map_err(|e| eyre!("{}", e))?;
            output.success(format!("Removed user {}", profile.email));
            output.warn("A running server keeps its own copy of the accounts; restart it to pick up this change.");
        }
    }
    Ok(())
}
