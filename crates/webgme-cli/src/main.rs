use clap::{Parser, Subcommand};
use std::path::PathBuf;
use webgme::{
    commands::{
        config::{self, ConfigAction},
        enable::{self, ToggleTarget},
        import, init, list, mount, new, remove,
    },
    errors::ComponentError,
    logger, GlobalOpts,
};
use webgme_manifest::ComponentKind;

#[derive(Parser)]
#[command(name = "webgme")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Manage webgme components",
    long_about = "webgme creates, imports and removes plugins, add-ons, decorators, layouts, routers, seeds and visualizers, and keeps the project's runtime configuration in sync."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure the webgme CLI
    #[command(subcommand_required = false, arg_required_else_help = false)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
    /// Create a new project
    Init {
        /// Project directory (default: current directory)
        dir: Option<PathBuf>,
    },
    /// List the components of the project
    #[command(alias = "list")]
    Ls {
        /// Only list this kind (plugin, addon, decorator, layout, router, seed, visualizer)
        kind: Option<ComponentKind>,
    },
    /// Create a new component
    New {
        kind: ComponentKind,
        name: String,
        /// Overwrite an existing component of the same name
        #[arg(short, long)]
        force: bool,
    },
    /// Remove a component (and the files it owns)
    #[command(alias = "remove")]
    Rm { kind: ComponentKind, name: String },
    /// Import a component from another project or package
    Import {
        kind: ComponentKind,
        name: String,
        /// npm package specifier, git URL or local path of the project to import from
        project: String,
    },
    /// Serve a router under a different mount point
    Mount {
        router: String,
        mount_point: String,
    },
    /// Enable a plugin or add-on in a modeling project
    Enable(ToggleArgs),
    /// Disable a plugin or add-on in a modeling project
    Disable(ToggleArgs),
}

#[derive(clap::Args)]
struct ToggleArgs {
    kind: ComponentKind,
    name: String,
    /// Modeling project to change
    #[arg(short, long)]
    project: String,
    /// Branch to commit to
    #[arg(short, long, default_value = "master")]
    branch: String,
}

impl ToggleArgs {
    fn target(&self) -> ToggleTarget {
        ToggleTarget {
            project: self.project.clone(),
            branch: self.branch.clone(),
        }
    }
}

fn run(command: Commands, opts: &GlobalOpts) -> Result<(), ComponentError> {
    match command {
        Commands::Config { action } => config::handle_config(action, opts),
        Commands::Init { dir } => init::handle_init(dir, opts),
        Commands::Ls { kind } => list::handle_list(kind, opts),
        Commands::New { kind, name, force } => new::handle_new(kind, &name, force, opts),
        Commands::Rm { kind, name } => remove::handle_remove(kind, &name, opts),
        Commands::Import {
            kind,
            name,
            project,
        } => import::handle_import(kind, &name, &project, opts),
        Commands::Mount {
            router,
            mount_point,
        } => mount::handle_mount(&router, &mount_point, opts),
        Commands::Enable(args) => {
            enable::handle_toggle(args.kind, &args.name, &args.target(), true, opts)
        }
        Commands::Disable(args) => {
            enable::handle_toggle(args.kind, &args.name, &args.target(), false, opts)
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level()) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }

    if let Err(e) = run(cli.command, &cli.global) {
        logger::error(&e.to_string());
        // subprocess output only goes to the log file
        if matches!(
            e,
            ComponentError::DependencyInstallFailed { .. } | ComponentError::Runtime(_)
        ) {
            logger::show_log_path();
        }
        std::process::exit(1);
    }
}
