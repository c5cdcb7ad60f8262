use clap::Parser;
use ledger_node::{
    Account, Command, Node, Opt, PeerNode, State, Transaction, GLOBAL_CONFIG,
};
use log::{error, info, LevelFilter};
use std::path::Path;
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
        // Start the node: state engine, status responder and gossip loop.
        Command::Run {
            datadir,
            addr,
            bootstrap,
            evict_unreachable,
        } => {
            if let Some(addr) = addr {
                GLOBAL_CONFIG.set_node_addr(addr);
            }
            if let Some(bootstrap) = bootstrap {
                GLOBAL_CONFIG.set_bootstrap_addr(bootstrap);
            }
            if evict_unreachable {
                GLOBAL_CONFIG.set_evict_unreachable(true);
            }

            let node_addr = GLOBAL_CONFIG.get_node_addr();
            let bootstrap = PeerNode::from_addr(&GLOBAL_CONFIG.get_bootstrap_addr(), true)?;

            let state = State::open(Path::new(&datadir))?;
            info!("Launching ledger node on {node_addr}");

            let node = Node::new(state, node_addr, bootstrap)?;
            node.run()?;
        }
        // Print the balance table derived from the on-disk chain.
        Command::Balances { datadir } => {
            let state = State::open(Path::new(&datadir))?;

            println!("Account balances at {}:", state.latest_block_hash());
            let mut balances: Vec<_> = state.balances().iter().collect();
            balances.sort_by(|a, b| a.0.cmp(b.0));
            for (account, balance) in balances {
                println!("{account}: {balance}");
            }
        }
        // Submit a transaction directly against the on-disk state and
        // persist it immediately, without going through a running node.
        Command::TxAdd {
            datadir,
            from,
            to,
            value,
            data,
        } => {
            let tx = Transaction::new(Account::new(from), Account::new(to), value, data);

            let mut state = State::open(Path::new(&datadir))?;
            state.add_tx(tx)?;
            let block_hash = state.persist()?;
            state.close();

            println!("Transaction added to the ledger in block {block_hash}");
        }
    }
    Ok(())
}
