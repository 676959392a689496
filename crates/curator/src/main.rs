use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use curator::api::client::get_client;
use curator::api::types::DuplicatePolicy;
use curator::cli::commands::{self, StatusArg};

#[derive(Parser)]
#[command(name = "curator")]
#[command(
  about = "Curator - Knowledge Base Management\nBrowse, merge, tag and generate QA pairs over a remote knowledge-base service"
)]
#[command(version)]
struct Cli {
  /// Enable verbose logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

/// Common pagination arguments
#[derive(Args)]
struct PageArgs {
  /// Page number (1-based)
  #[arg(long, default_value = "1")]
  page: u32,

  /// Records per page
  #[arg(long, default_value = "10")]
  page_size: u32,
}

#[derive(Subcommand)]
enum Command {
  /// List knowledge bases
  List {
    /// Filter by name
    #[arg(short, long)]
    search: Option<String>,

    #[command(flatten)]
    pagination: PageArgs,
  },
  /// Create a knowledge base
  Create {
    /// Display name
    name: String,

    /// Free-form description
    #[arg(short, long)]
    description: Option<String>,

    /// Embedding model backing the new knowledge base
    #[arg(short, long)]
    model: Option<String>,
  },
  /// Update a knowledge base's name or description
  Update {
    /// Knowledge base id
    id: i64,

    /// New display name
    #[arg(short, long)]
    name: Option<String>,

    /// New description
    #[arg(short, long)]
    description: Option<String>,
  },
  /// Delete a knowledge base
  Delete {
    /// Knowledge base id
    id: i64,

    /// Skip confirmation prompt
    #[arg(short, long)]
    force: bool,
  },
  /// Copy a knowledge base
  Copy {
    /// Knowledge base id
    id: i64,
  },
  /// Merge knowledge bases into a target
  Merge {
    /// Selected knowledge base ids, in check order (at least two)
    #[arg(required = true, num_args = 2..)]
    ids: Vec<i64>,

    /// Merge target; defaults to the first selected id
    #[arg(short, long)]
    target: Option<i64>,

    /// Rename the target after merging
    #[arg(long)]
    rename: Option<String>,

    /// How duplicate documents are resolved
    #[arg(long, value_enum, default_value = "skip")]
    policy: DuplicatePolicy,
  },
  /// List files in a knowledge base
  Files {
    /// Knowledge base id
    knowledge_id: i64,

    /// Filter by file name
    #[arg(short, long)]
    search: Option<String>,

    /// Filter by processing status
    #[arg(long, value_enum, default_value = "all")]
    status: StatusArg,

    #[command(flatten)]
    pagination: PageArgs,

    /// Keep refreshing while any file is still parsing
    #[arg(short, long)]
    watch: bool,
  },
  /// Delete a file from its knowledge base
  DeleteFile {
    /// File id
    file_id: i64,

    /// Skip confirmation prompt
    #[arg(short, long)]
    force: bool,
  },
  /// Ask the server to re-parse failed files
  Retry {
    /// Knowledge base id
    knowledge_id: i64,

    /// Specific file ids to retry; all failed files when omitted
    file_ids: Vec<i64>,
  },
  /// Export a knowledge base's file metadata as CSV
  Export {
    /// Knowledge base id
    knowledge_id: i64,

    /// Destination file
    #[arg(short, long, default_value = "knowledge_files.csv")]
    output: PathBuf,
  },
  /// Export a knowledge base's vector data as CSV
  ExportVectors {
    /// Knowledge base id
    knowledge_id: i64,

    /// Destination file
    #[arg(short, long, default_value = "knowledge_vectors.csv")]
    output: PathBuf,
  },
  /// Import vector data from a CSV file
  ImportVectors {
    /// Knowledge base id
    knowledge_id: i64,

    /// CSV file to upload
    input: PathBuf,
  },
  /// Edit or auto-generate a file's tags
  Tags {
    /// Knowledge base id
    knowledge_id: i64,

    /// File id
    file_id: i64,

    /// Tags to add
    #[arg(long)]
    add: Vec<String>,

    /// Tags to remove
    #[arg(long)]
    remove: Vec<String>,

    /// Ask the server to generate tags instead of saving the buffer
    #[arg(long)]
    auto: bool,

    /// Model used when generating tags
    #[arg(long, default_value = "qwen-plus")]
    model: String,
  },
  /// List every tag present in a knowledge base
  KnowledgeTags {
    /// Knowledge base id
    knowledge_id: i64,
  },
  /// List generation models currently online
  Models,
  /// Generate QA pairs from files
  GenerateQa {
    /// File ids to generate from
    #[arg(required = true)]
    file_ids: Vec<i64>,

    /// Generation model; defaults to the first available one
    #[arg(short, long)]
    model: Option<String>,

    /// Optional verification model
    #[arg(long)]
    verify_model: Option<String>,

    /// Questions per file (defaults to 5 when blank or non-numeric)
    #[arg(long)]
    count: Option<String>,

    /// Optional custom prompt
    #[arg(long)]
    prompt: Option<String>,
  },
}

async fn handle(command: Command) -> Result<()> {
  let client = get_client();

  match command {
    Command::List { search, pagination } => {
      commands::list_knowledge(&client, search, pagination.page, pagination.page_size).await
    }
    Command::Create { name, description, model } => {
      commands::create_knowledge(&client, name, description, model).await
    }
    Command::Update { id, name, description } => {
      commands::update_knowledge(&client, id, name, description).await
    }
    Command::Delete { id, force } => commands::delete_knowledge(&client, id, force).await,
    Command::Copy { id } => commands::copy_knowledge(&client, id).await,
    Command::Merge { ids, target, rename, policy } => {
      commands::merge_knowledge(&client, ids, target, rename, policy).await
    }
    Command::Files { knowledge_id, search, status, pagination, watch } => {
      commands::list_files(
        &client,
        knowledge_id,
        search,
        status,
        pagination.page,
        pagination.page_size,
        watch,
      )
      .await
    }
    Command::DeleteFile { file_id, force } => commands::delete_file(&client, file_id, force).await,
    Command::Retry { knowledge_id, file_ids } => {
      commands::retry_files(&client, knowledge_id, file_ids).await
    }
    Command::Export { knowledge_id, output } => {
      commands::export_files(&client, knowledge_id, &output).await
    }
    Command::ExportVectors { knowledge_id, output } => {
      commands::export_vectors(&client, knowledge_id, &output).await
    }
    Command::ImportVectors { knowledge_id, input } => {
      commands::import_vectors(&client, knowledge_id, &input).await
    }
    Command::Tags { knowledge_id, file_id, add, remove, auto, model } => {
      commands::edit_tags(&client, knowledge_id, file_id, add, remove, auto, model).await
    }
    Command::KnowledgeTags { knowledge_id } => {
      commands::list_knowledge_tags(&client, knowledge_id).await
    }
    Command::Models => commands::list_models(&client).await,
    Command::GenerateQa { file_ids, model, verify_model, count, prompt } => {
      commands::generate_qa(&client, file_ids, model, verify_model, count, prompt).await
    }
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("curator=debug,info")
  } else {
    EnvFilter::new("curator=info,warn")
  };
  tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

  handle(cli.command).await?;
  Ok(())
}
