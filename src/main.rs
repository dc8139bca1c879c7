use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use formflow_actions::{AgentRunnerClient, AgentRunnerSettings, FormsClient, FormsSettings};
use formflow_config::WorkflowDraft;
use formflow_orchestrator::RunOrchestrator;
use formflow_provider::{AiGateway, ProviderKind, ProviderSettings};
use formflow_store::{BlobRepository, RunStore, SqliteBlobStore, WorkflowRepository};
use formflow_workflow::{RunInput, RunStatus, Tenant};

/// Formflow - turn form submissions into structured records with an AI model
#[derive(Parser)]
#[command(name = "formflow")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.formflow)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  /// Tenant (site) that owns workflows and runs
  #[arg(long, global = true, env = "FORMFLOW_TENANT", default_value = "local")]
  tenant: String,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Manage workflow definitions
  Workflow {
    #[command(subcommand)]
    action: WorkflowCommand,
  },

  /// Submit form data (JSON object on stdin) and process the run
  Submit {
    /// The workflow to run
    workflow_id: String,
  },

  /// Inspect and retry runs
  Run {
    #[command(subcommand)]
    action: RunCommand,
  },

  /// List supported providers and their default models
  Providers,
}

#[derive(Subcommand)]
enum WorkflowCommand {
  /// Create a workflow from a JSON draft file
  Create { file: PathBuf },

  /// Replace every editable field of a workflow from a JSON draft file
  Update { workflow_id: String, file: PathBuf },

  /// List workflows, newest first
  List,

  /// Show one workflow
  Show { workflow_id: String },

  /// Delete a workflow
  Delete { workflow_id: String },
}

#[derive(Subcommand)]
enum RunCommand {
  /// Show one run
  Show { workflow_id: String, run_id: String },

  /// List runs of a workflow, newest first
  List {
    workflow_id: String,

    /// Only runs in this status (queued, processing, success, error)
    #[arg(long)]
    status: Option<RunStatus>,
  },

  /// Create a new run from an existing run's input and process it
  Retry { workflow_id: String, run_id: String },
}

fn main() -> Result<()> {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "formflow=info,formflow_orchestrator=info".into()),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
    .init();

  let cli = Cli::parse();

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".formflow"),
  };
  let tenant = Tenant::new(cli.tenant);

  let Some(command) = cli.command else {
    println!("formflow - use --help to see available commands");
    return Ok(());
  };

  if let Commands::Providers = command {
    return print_json(&ProviderKind::catalog());
  }

  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async {
    let app = App::open(&data_dir).await?;
    match command {
      Commands::Workflow { action } => app.workflow(&tenant, action).await,
      Commands::Submit { workflow_id } => app.submit(&tenant, &workflow_id).await,
      Commands::Run { action } => app.run(&tenant, action).await,
      Commands::Providers => Ok(()),
    }
  })
}

struct App {
  repo: Arc<BlobRepository<SqliteBlobStore>>,
  orchestrator: RunOrchestrator,
}

impl App {
  async fn open(data_dir: &Path) -> Result<Self> {
    tokio::fs::create_dir_all(data_dir)
      .await
      .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;

    let db_path = data_dir.join("formflow.db");
    let store = SqliteBlobStore::open(&db_path)
      .await
      .with_context(|| format!("failed to open database: {}", db_path.display()))?;
    let repo = Arc::new(BlobRepository::new(store));
    tracing::debug!(db_path = %db_path.display(), "store_opened");

    let gateway =
      AiGateway::new(ProviderSettings::from_env()).context("failed to create AI gateway")?;
    let trigger = AgentRunnerClient::new(AgentRunnerSettings::from_env())
      .context("failed to create agent runner client")?;

    let mut orchestrator = RunOrchestrator::new(
      repo.clone(),
      repo.clone(),
      Arc::new(gateway),
      Arc::new(trigger),
    );
    if let Some(settings) = FormsSettings::from_env() {
      let forms = FormsClient::new(settings).context("failed to create forms client")?;
      orchestrator = orchestrator.with_submission_sink(Arc::new(forms));
    }

    Ok(Self { repo, orchestrator })
  }

  async fn workflow(&self, tenant: &Tenant, action: WorkflowCommand) -> Result<()> {
    match action {
      WorkflowCommand::Create { file } => {
        let config = read_draft(&file).await?.into_config()?;
        self.repo.put_config(tenant, &config).await?;
        eprintln!("Created workflow: {}", config.id);
        print_json(&config)
      }
      WorkflowCommand::Update { workflow_id, file } => {
        let Some(existing) = self.repo.get_config(tenant, &workflow_id).await? else {
          bail!("workflow not found: {workflow_id}");
        };
        let config = read_draft(&file).await?.apply_to(&existing)?;
        self.repo.put_config(tenant, &config).await?;
        print_json(&config)
      }
      WorkflowCommand::List => print_json(&self.repo.list_configs(tenant).await?),
      WorkflowCommand::Show { workflow_id } => match self.repo.get_config(tenant, &workflow_id).await? {
        Some(config) => print_json(&config),
        None => bail!("workflow not found: {workflow_id}"),
      },
      WorkflowCommand::Delete { workflow_id } => {
        self
          .repo
          .delete_config(tenant, &workflow_id)
          .await
          .with_context(|| format!("failed to delete workflow: {workflow_id}"))?;
        eprintln!("Deleted workflow: {workflow_id}");
        Ok(())
      }
    }
  }

  async fn submit(&self, tenant: &Tenant, workflow_id: &str) -> Result<()> {
    let form_data = read_form_data_from_stdin()?;
    let (config, run) = self.orchestrator.enqueue(tenant, workflow_id, form_data).await?;
    eprintln!("Queued run: {}", run.id());

    let run = self.orchestrator.start_run(tenant, workflow_id, run.id()).await?;
    if let Some(url) = &config.redirect_url {
      eprintln!("Redirect: {url}");
    }
    print_json(&run)
  }

  async fn run(&self, tenant: &Tenant, action: RunCommand) -> Result<()> {
    match action {
      RunCommand::Show {
        workflow_id,
        run_id,
      } => match self.repo.get_run(tenant, &workflow_id, &run_id).await? {
        Some(run) => print_json(&run),
        None => bail!("run not found: {run_id}"),
      },
      RunCommand::List {
        workflow_id,
        status,
      } => print_json(&self.repo.list_runs(tenant, &workflow_id, status).await?),
      RunCommand::Retry {
        workflow_id,
        run_id,
      } => {
        let retry = self
          .orchestrator
          .retry_run(tenant, &workflow_id, &run_id)
          .await?;
        eprintln!("Retrying {run_id} as {} (attempt {})", retry.id(), retry.retry_count());
        let run = self
          .orchestrator
          .start_run(tenant, &workflow_id, retry.id())
          .await?;
        print_json(&run)
      }
    }
  }
}

async fn read_draft(file: &Path) -> Result<WorkflowDraft> {
  let content = tokio::fs::read_to_string(file)
    .await
    .with_context(|| format!("failed to read workflow file: {}", file.display()))?;
  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse workflow file: {}", file.display()))
}

fn read_form_data_from_stdin() -> Result<RunInput> {
  let mut input = String::new();
  io::stdin()
    .read_to_string(&mut input)
    .context("failed to read form data from stdin")?;

  if input.trim().is_empty() {
    return Ok(RunInput::new());
  }

  match serde_json::from_str::<Value>(&input).context("failed to parse form data as JSON")? {
    Value::Object(map) => Ok(map),
    _ => bail!("form data must be a JSON object"),
  }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}
