use clap::Parser;
use log::{error, LevelFilter};
use mesh_ledger::{call, Command, Node, Opt, Package, Reply, Server, GLOBAL_CONFIG};
use serde_json::{Map, Value};
use std::process;

fn main() {
    env_logger::builder().filter_level(LevelFilter::Info).init();

    let opt = Opt::parse();

    if let Err(e) = run_command(opt.command) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::StartNode { bootstrap } => {
            let addr = GLOBAL_CONFIG.get_node_addr();
            let node = Node::new(
                addr.clone(),
                GLOBAL_CONFIG.get_difficulty(),
                GLOBAL_CONFIG.get_gossip_ttl(),
            );
            let server = Server::bind(node.clone(), &addr)?;

            // Joining nodes adopt the bootstrap node's chain before serving.
            if let Some(remote) = bootstrap {
                node.register_with(&remote)
                    .map_err(|e| format!("Bootstrap against {remote} failed: {e}"))?;
            }

            server.run().map_err(|e| format!("Server error: {e}"))?
        }
        Command::Submit {
            node,
            organisation,
            money,
            description,
        } => {
            let mut fields = Map::new();
            fields.insert("Organisation".to_string(), Value::from(organisation));
            fields.insert("Money".to_string(), Value::from(money));
            fields.insert("Description".to_string(), Value::from(description));

            match call(&node, &Package::NewTransaction { fields })? {
                Reply::Ack => println!("Success!"),
                Reply::Rejected { reason } => return Err(reason.into()),
                other => return Err(format!("Unexpected reply: {other:?}").into()),
            }
        }
        Command::Mine { node } => match call(&node, &Package::Mine)? {
            Reply::Mined { index } => println!("Block #{index} is mined."),
            Reply::NoPendingTransactions => println!("No transactions to mine"),
            Reply::Rejected { reason } => return Err(reason.into()),
            other => return Err(format!("Unexpected reply: {other:?}").into()),
        },
        Command::Printchain { node } => match call(&node, &Package::GetChain)? {
            Reply::Chain {
                length,
                blocks,
                peers,
            } => {
                println!("Chain length: {length}");
                for block in blocks {
                    println!("Block #{}", block.index());
                    println!("  Hash: {}", block.hash());
                    println!("  Previous hash: {}", block.previous_hash());
                    println!("  Nonce: {}", block.nonce());
                    println!(
                        "  Transactions: {}",
                        serde_json::to_string(block.transactions())?
                    );
                }
                println!("Known peers: {}", peers.join(", "));
            }
            other => return Err(format!("Unexpected reply: {other:?}").into()),
        },
        Command::PendingTx { node } => match call(&node, &Package::GetPending)? {
            Reply::Pending { transactions } => {
                println!("{}", serde_json::to_string_pretty(&transactions)?)
            }
            other => return Err(format!("Unexpected reply: {other:?}").into()),
        },
    }
    Ok(())
}
