use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use taskdeck_core::project::ProjectId;
use taskdeck_core::task::query::{SortField, SortOrder};
use taskdeck_core::task::{Priority, TaskId, TaskStatus};
use taskdeck_infrastructure::{ConfigOverrides, ConfigService, TaskdeckPaths};

mod commands;
mod logging;
mod output;

use commands::App;

#[derive(Parser)]
#[command(name = "taskdeck")]
#[command(about = "Taskdeck - manage projects and tasks on a Taskdeck server", long_about = None)]
struct Cli {
    /// Base URL of the API (overrides TASKDECK_API_URL and config.toml)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory holding config.toml and the saved token
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and save the access token
    Login {
        /// Username or email
        #[arg(short, long)]
        username: Option<String>,
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the saved token
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show or edit the signed-in user's profile
    Profile(ProfileArgs),
    /// Manage projects
    Projects {
        #[command(subcommand)]
        action: ProjectAction,
    },
    /// Manage tasks
    Tasks {
        #[command(subcommand)]
        action: TaskAction,
    },
    /// Overview of projects and tasks
    Dashboard,
    /// Talk to the assistant; starts an interactive session without MESSAGE
    Chat { message: Option<String> },
}

#[derive(Args)]
struct ProfileArgs {
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    current_password: Option<String>,
    #[arg(long)]
    new_password: Option<String>,
    #[arg(long)]
    confirm_password: Option<String>,
}

#[derive(Subcommand)]
enum ProjectAction {
    /// List projects
    List,
    /// Show a project and its tasks
    Show { id: ProjectId },
    /// Create a project
    Create {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
        /// Hex color such as #3B82F6
        #[arg(short, long)]
        color: Option<String>,
    },
    /// Update a project
    Update {
        id: ProjectId,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        color: Option<String>,
    },
    /// Delete a project and its tasks
    Delete { id: ProjectId },
}

#[derive(Args)]
struct TaskFields {
    #[arg(short, long)]
    description: Option<String>,
    #[arg(short, long)]
    priority: Option<Priority>,
    #[arg(short, long)]
    status: Option<TaskStatus>,
    /// Due date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    due: Option<String>,
    #[arg(long)]
    project: Option<ProjectId>,
}

#[derive(Subcommand)]
enum TaskAction {
    /// List tasks
    List {
        #[arg(long)]
        project: Option<ProjectId>,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<Priority>,
        /// Match title or description
        #[arg(long)]
        search: Option<String>,
        /// due_date, created_at, updated_at, priority, title, status or id
        #[arg(long)]
        sort: Option<SortField>,
        #[arg(long, default_value = "asc")]
        order: SortOrder,
    },
    /// Show a task
    Show { id: TaskId },
    /// Create a task
    Create {
        title: String,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Update a task
    Update {
        id: TaskId,
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Delete a task
    Delete { id: TaskId },
    /// Flip a task between todo and completed
    Toggle { id: TaskId },
    /// Search titles and descriptions
    Search { term: String },
    /// Open tasks due within the next days
    Upcoming {
        #[arg(long, default_value_t = 7)]
        days: i64,
    },
    /// Open tasks past their due date
    Overdue,
    /// Tasks grouped by status
    Board,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let paths = TaskdeckPaths::new(cli.config_dir.as_deref())?;
    let config = ConfigService::new(paths.clone()).resolve(&ConfigOverrides::from_env(cli.api_url))?;
    logging::init(&config.logging.level);

    let app = App::new(&config, &paths, cli.json)?;
    app.session.initialize().await;

    match cli.command {
        Commands::Login { username, password } => {
            commands::auth::login(&app, username, password).await?
        }
        Commands::Register {
            email,
            username,
            password,
        } => commands::auth::register(&app, email, username, password).await?,
        Commands::Logout => commands::auth::logout(&app).await?,
        Commands::Whoami => commands::auth::whoami(&app).await?,
        Commands::Profile(args) => commands::auth::profile(&app, args.into()).await?,
        Commands::Projects { action } => match action {
            ProjectAction::List => commands::projects::list(&app).await?,
            ProjectAction::Show { id } => commands::projects::show(&app, id).await?,
            ProjectAction::Create {
                name,
                description,
                color,
            } => commands::projects::create(&app, name, description, color).await?,
            ProjectAction::Update {
                id,
                name,
                description,
                color,
            } => commands::projects::update(&app, id, name, description, color).await?,
            ProjectAction::Delete { id } => commands::projects::delete(&app, id).await?,
        },
        Commands::Tasks { action } => match action {
            TaskAction::List {
                project,
                status,
                priority,
                search,
                sort,
                order,
            } => {
                let filter = taskdeck_core::task::TaskFilter {
                    project_id: project,
                    status,
                    priority,
                    search,
                };
                commands::tasks::list(&app, &filter, sort.map(|field| (field, order))).await?
            }
            TaskAction::Show { id } => commands::tasks::show(&app, id).await?,
            TaskAction::Create { title, fields } => {
                commands::tasks::create(&app, title, fields.into()).await?
            }
            TaskAction::Update { id, title, fields } => {
                commands::tasks::update(&app, id, title, fields.into()).await?
            }
            TaskAction::Delete { id } => commands::tasks::delete(&app, id).await?,
            TaskAction::Toggle { id } => commands::tasks::toggle(&app, id).await?,
            TaskAction::Search { term } => commands::tasks::search(&app, &term).await?,
            TaskAction::Upcoming { days } => commands::tasks::upcoming(&app, days).await?,
            TaskAction::Overdue => commands::tasks::overdue(&app).await?,
            TaskAction::Board => commands::tasks::board(&app).await?,
        },
        Commands::Dashboard => commands::dashboard::show(&app).await?,
        Commands::Chat { message } => commands::chat::run(&app, message).await?,
    }

    Ok(())
}

impl From<ProfileArgs> for commands::auth::ProfileInput {
    fn from(args: ProfileArgs) -> Self {
        Self {
            email: args.email,
            username: args.username,
            current_password: args.current_password,
            new_password: args.new_password,
            confirm_password: args.confirm_password,
        }
    }
}

impl From<TaskFields> for commands::tasks::TaskInput {
    fn from(fields: TaskFields) -> Self {
        Self {
            description: fields.description,
            priority: fields.priority,
            status: fields.status,
            due: fields.due,
            project_id: fields.project,
        }
    }
}
