//! Administrative provisioning tool: creates or deletes the single-file
//! backing store and seeds a default admin account. Plumbing around the
//! library core, kept deliberately thin.

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use custodia::config::AuthConfig;
use custodia::identity::ADMIN_PERMISSION;
use custodia::security::CredentialStore;
use custodia::storage::FileStore;

const DEFAULT_STORE_PATH: &str = "auth.json";

fn usage() -> ! {
    eprintln!("usage: custodia-provision <create|delete> [store-path]");
    eprintln!("  create   create the store file if needed and seed a default admin");
    eprintln!("  delete   remove the store file");
    eprintln!("default store path: {DEFAULT_STORE_PATH}");
    std::process::exit(2);
}

fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    let mut args = std::env::args().skip(1);
    let Some(cmd) = args.next() else { usage() };
    let path = args.next().unwrap_or_else(|| DEFAULT_STORE_PATH.to_string());

    match cmd.as_str() {
        "create" => {
            let store = FileStore::shared(&path)?;
            let creds = CredentialStore::with_config(store, AuthConfig::from_env());
            if creds.lookup("admin")?.is_none() {
                let password = std::env::var("CUSTODIA_ADMIN_PASSWORD")
                    .unwrap_or_else(|_| "custodia".to_string());
                creds.register_with_permissions("admin", &password, &[ADMIN_PERMISSION])?;
                info!(target: "custodia", "seeded default admin in '{}'", path);
            } else {
                info!(target: "custodia", "store '{}' already has an admin, leaving it alone", path);
            }
        }
        "delete" => {
            if std::path::Path::new(&path).exists() {
                std::fs::remove_file(&path)?;
                info!(target: "custodia", "deleted store '{}'", path);
            } else {
                info!(target: "custodia", "store '{}' does not exist", path);
            }
        }
        _ => usage(),
    }
    Ok(())
}
