use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "ygit",
    about = "ygit: a minimal content-addressed version control core",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an empty repository
    Init(InitArgs),
    /// Compute a file's blob ID, optionally storing it
    HashObject(HashObjectArgs),
    /// Show an object's content, size or type
    CatFile(CatFileArgs),
    /// Stage files or directories
    Add(AddArgs),
    /// Snapshot the staged working tree as tree objects
    WriteTree,
    /// Get or set user identity
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Directory to initialize (defaults to the current directory)
    pub path: Option<String>,
}

#[derive(Args)]
pub struct HashObjectArgs {
    /// Write the blob into the object store
    #[arg(short, long)]
    pub write: bool,
    pub file: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PrettyStyle {
    Simple,
    Recursive,
}

#[derive(Args)]
#[command(group(ArgGroup::new("mode").required(true).args(["pretty", "size", "kind"])))]
pub struct CatFileArgs {
    /// Pretty-print content; `--pretty=recursive` expands subtrees
    #[arg(
        short,
        long,
        value_enum,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "simple"
    )]
    pub pretty: Option<PrettyStyle>,
    /// Print the payload size
    #[arg(short, long)]
    pub size: bool,
    /// Print the object kind
    #[arg(short = 't', long = "type")]
    pub kind: bool,
    /// Full 40-character object ID
    pub object: String,
}

#[derive(Args)]
pub struct AddArgs {
    #[arg(required = true)]
    pub paths: Vec<String>,
}

#[derive(Args)]
#[command(group(ArgGroup::new("scope").required(true).args(["local", "global"])))]
pub struct ConfigArgs {
    /// Repository configuration
    #[arg(long)]
    pub local: bool,
    /// User configuration in the home directory
    #[arg(long)]
    pub global: bool,
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
}
