// Entry point for the proof-ledger CLI. Settings are loaded once here and
// passed into every command; nothing reads a global.
use clap::Parser;
use data_encoding::HEXLOWER;
use log::error;
use proof_ledger::{
    convert_address, hash_pub_key, pub_key_hash_from_address, Blockchain, Command,
    Config, LedgerError, Opt, ProofOfWork, Transaction, UTXOResolver, UTXOSet, Wallets,
};
use std::process;

fn main() {
    // Logging depends on the config, so config errors go straight to stderr.
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    let level = match config.level_filter() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    env_logger::builder().filter_level(level).init();

    let opt = Opt::parse();
    if let Err(e) = run_command(&config, opt.command) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(config: &Config, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Createblockchain { address } => {
            let pub_key_hash = pub_key_hash_from_address(&address)?;
            let blockchain = Blockchain::create_blockchain(config, &pub_key_hash)?;
            blockchain.close()?;
            println!("Done!");
        }
        Command::Createwallet => {
            let mut wallets = Wallets::load(&config.wallet_file)?;
            let address = wallets.create_wallet()?;
            println!("Your new address: {address}")
        }
        Command::GetBalance { address } => {
            let pub_key_hash = pub_key_hash_from_address(&address)?;
            let blockchain = Blockchain::open_blockchain(config)?;
            // Answered by replaying the chain, not from the index.
            let balance = UTXOResolver::new(&blockchain).balance_for(&pub_key_hash)?;
            println!("Balance of {address}: {balance}");
        }
        Command::ListAddresses => {
            let wallets = Wallets::load(&config.wallet_file)?;
            for address in wallets.get_addresses() {
                println!("{address}")
            }
        }
        Command::Send { from, to, amount } => {
            pub_key_hash_from_address(&from)?;
            let to_pub_key_hash = pub_key_hash_from_address(&to)?;

            let wallets = Wallets::load(&config.wallet_file)?;
            let wallet = wallets.get_wallet(&from).ok_or_else(|| {
                LedgerError::Wallet(format!("No local wallet for address {from}"))
            })?;

            let mut blockchain = Blockchain::open_blockchain(config)?;
            let transaction =
                Transaction::new_utxo_transaction(wallet, &to_pub_key_hash, amount, &blockchain)?;
            let block = blockchain.mine_block(&[transaction], &wallet.get_pub_key_hash())?;
            blockchain.close()?;
            println!("Success! Block {}", HEXLOWER.encode(block.get_hash()));
        }
        Command::Printchain => {
            let blockchain = Blockchain::open_blockchain(config)?;
            for block in blockchain.iterator() {
                let block = block?;
                println!("Prev. hash: {}", HEXLOWER.encode(block.get_prev_hash()));
                println!("Hash: {}", HEXLOWER.encode(block.get_hash()));
                println!(
                    "Nonce: {}, difficulty: {}",
                    block.get_nonce(),
                    block.get_difficulty()
                );
                println!("PoW: {}", ProofOfWork::validate(&block));

                for tx in block.get_transactions() {
                    println!("- Transaction {}", HEXLOWER.encode(tx.get_id()));
                    if !tx.is_coinbase() {
                        for input in tx.get_vin() {
                            let address = convert_address(&hash_pub_key(input.get_pub_key()));
                            println!(
                                "-- Input txid = {}, vout = {}, from = {}",
                                HEXLOWER.encode(input.get_txid()),
                                input.get_vout(),
                                address,
                            )
                        }
                    }
                    for output in tx.get_vout() {
                        let address = convert_address(output.get_pub_key_hash());
                        println!("-- Output value = {}, to = {}", output.get_value(), address)
                    }
                }
                println!()
            }
        }
        Command::Reindexutxo => {
            let blockchain = Blockchain::open_blockchain(config)?;
            let utxo_set = UTXOSet::new(&blockchain);
            utxo_set.reindex()?;
            let count = utxo_set.count_transactions()?;
            println!("Done! There are {count} transactions in the UTXO set.");
        }
        Command::Verifychain => {
            let blockchain = Blockchain::open_blockchain(config)?;
            if !blockchain.verify_chain()? {
                return Err("Chain verification failed".into());
            }
            println!("Chain of {} blocks is valid.", blockchain.block_count()?);
        }
    }
    Ok(())
}
