use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "proof-ledger", about = "A minimal proof-of-work UTXO ledger")]
pub struct Opt {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    #[command(name = "createblockchain", about = "Create a new blockchain")]
    Createblockchain {
        #[arg(help = "The address to send genesis block reward to")]
        address: String,
    },
    #[command(name = "createwallet", about = "Create a new wallet")]
    Createwallet,
    #[command(
        name = "getbalance",
        about = "Get the wallet balance of the target address"
    )]
    GetBalance {
        #[arg(help = "The wallet address")]
        address: String,
    },
    #[command(name = "listaddresses", about = "Print local wallet addresses")]
    ListAddresses,
    #[command(
        name = "send",
        about = "Send coins and seal them in a new block, rewarding the sender"
    )]
    Send {
        #[arg(help = "Source wallet address")]
        from: String,
        #[arg(help = "Destination wallet address")]
        to: String,
        #[arg(help = "Amount to send")]
        amount: u64,
    },
    #[command(name = "printchain", about = "Print all blocks in the blockchain")]
    Printchain,
    #[command(name = "reindexutxo", about = "Rebuild UTXO index set")]
    Reindexutxo,
    #[command(
        name = "verifychain",
        about = "Check proof-of-work and linkage of every block"
    )]
    Verifychain,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_send() {
        let opt = Opt::try_parse_from(["proof-ledger", "send", "alice", "bob", "42"]).unwrap();
        assert_eq!(
            opt.command,
            Command::Send {
                from: "alice".to_string(),
                to: "bob".to_string(),
                amount: 42,
            }
        );
    }

    #[test]
    fn test_send_rejects_negative_amount() {
        assert!(Opt::try_parse_from(["proof-ledger", "send", "alice", "bob", "-5"]).is_err());
    }

    #[test]
    fn test_parse_lowercase_subcommands() {
        let opt = Opt::try_parse_from(["proof-ledger", "reindexutxo"]).unwrap();
        assert_eq!(opt.command, Command::Reindexutxo);
        let opt = Opt::try_parse_from(["proof-ledger", "verifychain"]).unwrap();
        assert_eq!(opt.command, Command::Verifychain);
    }
}
