use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "ledger-node")]
pub struct Opt {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "run", about = "Launch the ledger node and its sync loop")]
    Run {
        #[arg(long, help = "Path where all node data is stored")]
        datadir: String,
        #[arg(long, help = "Address to listen on, ip:port")]
        addr: Option<String>,
        #[arg(long, help = "Bootstrap peer to seed the registry with, ip:port")]
        bootstrap: Option<String>,
        #[arg(long, help = "Evict a peer from the registry after a failed status query")]
        evict_unreachable: bool,
    },
    #[command(name = "balances", about = "Print all account balances")]
    Balances {
        #[arg(long, help = "Path where all node data is stored")]
        datadir: String,
    },
    #[command(name = "txadd", about = "Add a transaction directly to the on-disk ledger")]
    TxAdd {
        #[arg(long, help = "Path where all node data is stored")]
        datadir: String,
        #[arg(long, help = "Account to send tokens from")]
        from: String,
        #[arg(long, help = "Account to send tokens to")]
        to: String,
        #[arg(long, help = "How many tokens to send")]
        value: u64,
        #[arg(long, default_value = "", help = "Transaction data; \"reward\" mints")]
        data: String,
    },
}
