use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "mesh-ledger")]
pub struct Opt {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "startnode", about = "Start a ledger node")]
    StartNode {
        #[arg(
            long = "bootstrap",
            help = "Register with an existing node after startup"
        )]
        bootstrap: Option<String>,
    },
    #[command(name = "submit", about = "Submit a transaction to a running node")]
    Submit {
        #[arg(help = "Address of the node to submit to")]
        node: String,
        #[arg(help = "Organisation the entry is recorded for")]
        organisation: String,
        #[arg(help = "Amount of money moved")]
        money: u64,
        #[arg(help = "Free-form description of the entry")]
        description: String,
    },
    #[command(name = "mine", about = "Ask a running node to mine its pending pool")]
    Mine {
        #[arg(help = "Address of the node")]
        node: String,
    },
    #[command(name = "printchain", about = "Print all blocks held by a running node")]
    Printchain {
        #[arg(help = "Address of the node")]
        node: String,
    },
    #[command(name = "pendingtx", about = "Print a running node's pending transactions")]
    PendingTx {
        #[arg(help = "Address of the node")]
        node: String,
    },
}
