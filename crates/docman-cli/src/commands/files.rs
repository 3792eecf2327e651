//! File commands: ls, upload, download, versions.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Args;
use tabled::Tabled;
use uuid::Uuid;

use docman_api::dto::response::UploadResponse;
use docman_entity::file::{FileSummary, FileVersion, VersionSelector};

use crate::client::ApiClient;
use crate::output::{self, OutputFormat, format_size, short_digest};

/// Arguments for the ls command
#[derive(Debug, Args)]
pub struct LsArgs {
    /// List every visible file instead of only your own
    #[arg(short, long)]
    pub all: bool,
}

/// Arguments for the upload command
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Local file to upload
    pub path: PathBuf,

    /// Target directory id (root when omitted)
    #[arg(short, long)]
    pub directory: Option<Uuid>,

    /// Store under this name instead of the local file name
    #[arg(short, long)]
    pub name: Option<String>,
}

/// Arguments for the download command
#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Version id, or a file id when --at is given
    pub id: Uuid,

    /// Treat the id as a file id and fetch this version (number or `latest`)
    #[arg(long)]
    pub at: Option<VersionSelector>,

    /// Write to this path instead of the uploaded file name
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the versions command
#[derive(Debug, Args)]
pub struct VersionsArgs {
    /// File id
    pub file_id: Uuid,
}

#[derive(Debug, Tabled)]
struct FileRow {
    #[tabled(rename = "File ID")]
    file_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: i32,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Digest")]
    digest: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl From<&FileSummary> for FileRow {
    fn from(s: &FileSummary) -> Self {
        Self {
            file_id: s.file_id.to_string(),
            name: s.file_name.clone(),
            version: s.version_number,
            size: format_size(s.size_bytes),
            digest: short_digest(&s.digest_hex),
            updated: s.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

#[derive(Debug, Tabled)]
struct VersionRow {
    #[tabled(rename = "#")]
    number: i32,
    #[tabled(rename = "Version ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Digest")]
    digest: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&FileVersion> for VersionRow {
    fn from(v: &FileVersion) -> Self {
        Self {
            number: v.version_number,
            id: v.id.to_string(),
            name: v.file_name.clone(),
            size: format_size(v.size_bytes),
            digest: short_digest(&v.digest_hex),
            created: v.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// List files.
pub async fn ls(args: &LsArgs, client: &ApiClient, format: OutputFormat) -> Result<()> {
    client.require_token()?;
    let path = if args.all { "/api/files/" } else { "/api/files/user/" };
    let files: Vec<FileSummary> = client.get_json(path).await?;
    let rows: Vec<FileRow> = files.iter().map(FileRow::from).collect();
    output::print_list(&rows, &files, format);
    Ok(())
}

/// Upload a file.
pub async fn upload(args: &UploadArgs, client: &ApiClient, format: OutputFormat) -> Result<()> {
    client.require_token()?;
    let name = match &args.name {
        Some(name) => name.clone(),
        None => args
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| anyhow!("Cannot derive a file name from {}", args.path.display()))?,
    };

    let uploaded: UploadResponse = client
        .upload("/api/file_versions/upload/", &args.path, &name, args.directory)
        .await
        .with_context(|| format!("Upload of '{name}' failed"))?;

    match format {
        OutputFormat::Json => output::print_json(&uploaded),
        OutputFormat::Table => {
            output::print_success(&format!(
                "Uploaded '{}' as version {}",
                uploaded.file.name, uploaded.version.version_number
            ));
            output::print_kv("File ID", &uploaded.file.id.to_string());
            output::print_kv("Version ID", &uploaded.version.id.to_string());
            output::print_kv("Size", &format_size(uploaded.version.size_bytes));
            output::print_kv("Digest", &uploaded.version.digest_hex);
        }
    }
    Ok(())
}

/// Download a version.
pub async fn download(args: &DownloadArgs, client: &ApiClient) -> Result<()> {
    client.require_token()?;
    let path = match args.at {
        Some(selector) => format!("/api/files/{}/versions/{selector}/download/", args.id),
        None => format!("/api/file_versions/{}/download/", args.id),
    };

    let (written, target) = client.download_to(&path, args.output.as_deref()).await?;
    output::print_success(&format!(
        "Saved {} to {}",
        format_size(written as i64),
        target.display()
    ));
    Ok(())
}

/// List versions of a file.
pub async fn versions(args: &VersionsArgs, client: &ApiClient, format: OutputFormat) -> Result<()> {
    client.require_token()?;
    let versions: Vec<FileVersion> = client
        .get_json(&format!("/api/files/{}/versions/", args.file_id))
        .await?;
    let rows: Vec<VersionRow> = versions.iter().map(VersionRow::from).collect();
    output::print_list(&rows, &versions, format);
    Ok(())
}
