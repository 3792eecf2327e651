//! Directory commands: mkdir, dirs.

use anyhow::Result;
use clap::Args;
use tabled::Tabled;
use uuid::Uuid;

use docman_api::dto::request::{CreateDirectoryForm, DirectoryQuery};
use docman_api::dto::response::DirectoryPathResponse;
use docman_entity::directory::Directory;

use crate::client::ApiClient;
use crate::output::{self, OutputFormat};

/// Arguments for the mkdir command
#[derive(Debug, Args)]
pub struct MkdirArgs {
    /// Name of the new directory
    pub name: String,

    /// Parent directory id (root when omitted)
    #[arg(short, long)]
    pub parent: Option<Uuid>,
}

/// Arguments for the dirs command
#[derive(Debug, Args)]
pub struct DirsArgs {
    /// Parent directory id (root when omitted)
    #[arg(short, long)]
    pub parent: Option<Uuid>,
}

#[derive(Debug, Tabled)]
struct DirectoryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&Directory> for DirectoryRow {
    fn from(d: &Directory) -> Self {
        Self {
            id: d.id.to_string(),
            name: d.name.clone(),
            created: d.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Create a directory and print its full path.
pub async fn mkdir(args: &MkdirArgs, client: &ApiClient, format: OutputFormat) -> Result<()> {
    client.require_token()?;
    let form = CreateDirectoryForm {
        parent: args.parent.map(|p| p.to_string()),
        name: args.name.clone(),
    };
    let created: Directory = client
        .post_form("/api/file_versions/directories/", &form)
        .await?;

    match format {
        OutputFormat::Json => output::print_json(&created),
        OutputFormat::Table => {
            let path: DirectoryPathResponse = client
                .get_json(&format!("/api/file_versions/directories/{}/path/", created.id))
                .await?;
            output::print_success(&format!("Created /{}", path.names.join("/")));
            output::print_kv("Directory ID", &created.id.to_string());
        }
    }
    Ok(())
}

/// List child directories.
pub async fn dirs(args: &DirsArgs, client: &ApiClient, format: OutputFormat) -> Result<()> {
    client.require_token()?;
    let query = DirectoryQuery {
        parent: args.parent.map(|p| p.to_string()),
    };
    let children: Vec<Directory> = client
        .get_json_query("/api/file_versions/directories/", &query)
        .await?;
    let rows: Vec<DirectoryRow> = children.iter().map(DirectoryRow::from).collect();
    output::print_list(&rows, &children, format);
    Ok(())
}
