use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Address to bind the HTTP server to
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Path to a YAML config file (defaults to ~/.hbuddy/config.yaml)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Model backend to use [possible values: gemini, openai]
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Model to use (provider-specific)
    #[arg(short, long)]
    pub model: Option<String>,
}
