use clap::Parser;


#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct CLI {
    /// Config file with hermes and protocol settings
    #[arg(short, long, value_name = "FILE")]
    pub config: String,

    /// SQLite database populated by the indexing pipeline
    #[arg(long = "db", default_value = "analytics.db")]
    pub database: String
}
