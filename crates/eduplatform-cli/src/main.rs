//! eduplatform CLI — terminal front end for the e-learning platform.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use eduplatform_core::model::{Category, Difficulty, LearningStyle};

mod commands;

#[derive(Parser)]
#[command(
    name = "eduplatform",
    version,
    about = "Terminal client for the EduPlatform e-learning service"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter eduplatform.toml
    Init,

    /// Create an account and sign in
    Register {
        #[arg(long)]
        email: String,

        /// Full name shown on the profile and certificate
        #[arg(long)]
        name: String,

        /// Password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,

        /// Password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign in with a Google identity token
    Google {
        #[arg(long)]
        id_token: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the profile, optionally editing it or writing a certificate
    Profile {
        /// New display name (local to this run)
        #[arg(long)]
        name: Option<String>,

        /// New email (local to this run)
        #[arg(long)]
        email: Option<String>,

        /// Write a completion certificate into this directory
        #[arg(long)]
        certificate: Option<PathBuf>,
    },

    /// Show points, level and progress
    Dashboard,

    /// Personalised learning paths
    Paths {
        #[command(subcommand)]
        action: PathsAction,
    },

    /// Generate a quiz and take it with a countdown
    Quiz {
        #[arg(long)]
        topic: String,

        /// beginner, intermediate or advanced
        #[arg(long)]
        difficulty: Option<Difficulty>,

        /// Number of questions
        #[arg(long)]
        questions: Option<u32>,
    },

    /// Chat with the AI mentor
    Mentor,

    /// Community forum
    Forum {
        #[command(subcommand)]
        action: ForumAction,
    },
}

#[derive(Subcommand)]
enum PathsAction {
    /// List your learning paths
    List {
        /// Case-insensitive search over title and description
        #[arg(long)]
        search: Option<String>,

        #[arg(long)]
        difficulty: Option<Difficulty>,
    },

    /// Generate a new learning path
    Generate {
        /// Comma-separated topics of interest
        #[arg(long)]
        topics: String,

        #[arg(long)]
        difficulty: Option<Difficulty>,

        /// visual, auditory, kinesthetic or mixed
        #[arg(long, default_value = "mixed")]
        style: LearningStyle,

        /// Weekly time commitment in hours
        #[arg(long, default_value = "5")]
        hours: u32,

        /// Free-form learning goals
        #[arg(long, default_value = "")]
        goals: String,
    },
}

#[derive(Subcommand)]
enum ForumAction {
    /// List recent posts
    List {
        /// general, programming, design, career, resources or help
        #[arg(long)]
        category: Option<Category>,

        /// Case-insensitive search over title and content
        #[arg(long)]
        search: Option<String>,
    },

    /// Publish a post
    Post {
        #[arg(long)]
        title: String,

        #[arg(long)]
        content: String,

        #[arg(long, default_value = "general")]
        category: Category,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("eduplatform=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Register {
            email,
            name,
            password,
        } => commands::auth::register(config, email, name, password).await,
        Commands::Login { email, password } => {
            commands::auth::login(config, email, password).await
        }
        Commands::Google { id_token } => commands::auth::google(config, &id_token).await,
        Commands::Logout => commands::auth::logout(config),
        Commands::Profile {
            name,
            email,
            certificate,
        } => commands::profile::execute(config, name, email, certificate).await,
        Commands::Dashboard => commands::dashboard::execute(config).await,
        Commands::Paths { action } => match action {
            PathsAction::List { search, difficulty } => {
                commands::paths::list(config, search, difficulty).await
            }
            PathsAction::Generate {
                topics,
                difficulty,
                style,
                hours,
                goals,
            } => commands::paths::generate(config, &topics, difficulty, style, hours, goals).await,
        },
        Commands::Quiz {
            topic,
            difficulty,
            questions,
        } => commands::quiz::execute(config, topic, difficulty, questions).await,
        Commands::Mentor => commands::mentor::execute(config).await,
        Commands::Forum { action } => match action {
            ForumAction::List { category, search } => {
                commands::forum::list(config, category, search).await
            }
            ForumAction::Post {
                title,
                content,
                category,
            } => commands::forum::post(config, title, content, category).await,
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
