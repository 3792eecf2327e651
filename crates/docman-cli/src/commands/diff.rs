//! Version diff command.

use std::fmt::Write;

use anyhow::Result;
use clap::Args;
use uuid::Uuid;

use docman_api::dto::request::DiffQuery;
use docman_api::dto::response::DiffResponse;
use docman_service::{Delta, DeltaBody, Hunk};

use crate::client::ApiClient;
use crate::output::{self, OutputFormat};

/// Arguments for the diff command
#[derive(Debug, Args)]
pub struct DiffArgs {
    /// File id
    pub file_id: Uuid,

    /// Base version (number or `latest`)
    #[arg(long)]
    pub from: String,

    /// Target version (number or `latest`)
    #[arg(long)]
    pub to: String,
}

/// Fetch and print a diff.
pub async fn execute(args: &DiffArgs, client: &ApiClient, format: OutputFormat) -> Result<()> {
    client.require_token()?;
    let query = DiffQuery {
        from: Some(args.from.clone()),
        to: Some(args.to.clone()),
    };
    let diff: DiffResponse = client
        .get_json_query(&format!("/api/files/{}/diff/", args.file_id), &query)
        .await?;

    match format {
        OutputFormat::Json => output::print_json(&diff),
        OutputFormat::Table => {
            print!("{}", render(&diff.delta));
            println!(
                "{} insertion(s), {} deletion(s) in {} hunk(s)",
                diff.stats.insertions, diff.stats.deletions, diff.stats.hunks
            );
        }
    }
    Ok(())
}

/// Unified-style rendering of a delta.
pub fn render(delta: &Delta) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "--- version {}", delta.from_version);
    let _ = writeln!(out, "+++ version {}", delta.to_version);

    match &delta.body {
        DeltaBody::Text { hunks } => {
            for hunk in hunks {
                render_hunk(&mut out, hunk);
            }
        }
        DeltaBody::Binary { old, new } => {
            if old != new {
                let _ = writeln!(
                    out,
                    "Binary content differs ({} -> {} bytes)",
                    old.len(),
                    new.len()
                );
            }
        }
    }
    out
}

fn render_hunk(out: &mut String, hunk: &Hunk) {
    let _ = writeln!(
        out,
        "@@ -{},{} +{},{} @@",
        hunk.old_start + 1,
        hunk.old_lines.len(),
        hunk.new_start + 1,
        hunk.new_lines.len()
    );
    for (marker, lines) in [('-', &hunk.old_lines), ('+', &hunk.new_lines)] {
        for line in lines {
            out.push(marker);
            out.push_str(line);
            if !line.ends_with('\n') {
                out.push_str("\n\\ No newline at end of file\n");
            }
        }
    }
}
