//! `keyvaultctl` - drive the vault from the command line.
//!
//! Subcommands mirror the vault's lifecycle: `master` inspects or exports
//! the master key, `geneChild` derives accounts, `exportChild` exports
//! child keys in raw/extended/keystore form, and `sign` signs a
//! transaction hash with a child key.

use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use keyvault_bip39::{set_active_language, Language};
use keyvault_chains::{BtcAdapter, ChainAdapter, EthAdapter, NetworkKind};
use keyvault_core::Vault;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "keyvaultctl", version, about = "HD multi-chain key vault control")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Operate on the master key
    Master(MasterArgs),
    /// Generate a child account
    #[command(name = "geneChild")]
    GeneChild(GeneChildArgs),
    /// Export a child account
    #[command(name = "exportChild")]
    ExportChild(ExportChildArgs),
    /// Sign a transaction hash with a child account
    Sign(SignArgs),
}

#[derive(Args)]
struct CommonArgs {
    /// The wallet file path
    #[arg(short = 'f', long, default_value = "./wallet.dat")]
    path: String,

    /// Password to encrypt and decrypt the wallet
    #[arg(short = 'p', long, default_value = "")]
    password: String,

    /// Whether the wallet caches child private keys
    #[arg(long = "isSaveSubKey")]
    save_sub_key: bool,

    /// Whether cached child keys hold the extended form
    #[arg(long = "isSaveExtendedKey")]
    save_extended_key: bool,

    /// Whether the wallet keeps the mnemonic on disk
    #[arg(long = "isSaveMnemonic", default_value_t = true, action = ArgAction::Set)]
    save_mnemonic: bool,

    /// Mnemonic language: en, zh-cn, zh-tw, fr, it, ja, ko, es
    #[arg(long = "mnemonicType", default_value = "en")]
    mnemonic_type: String,

    /// Restore the wallet from this mnemonic (words separated by spaces)
    #[arg(short = 'm', long, default_value = "")]
    mnemonic: String,

    /// Mix the password into the seed when restoring from a mnemonic
    #[arg(long = "isUsePwdBlur")]
    use_pwd_blur: bool,

    /// Restore the wallet from this base58 extended private key
    #[arg(short = 'k', long = "prvKeyBase58", default_value = "")]
    prv_key_base58: String,

    /// Network type: mainnet, testnet, devnet
    #[arg(short = 'n', long = "networkType", default_value = "mainnet")]
    network_type: String,
}

#[derive(Args)]
struct MasterArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Print the master mnemonic
    #[arg(long = "exportMasterMn")]
    export_mnemonic: bool,

    /// Print the master raw private key
    #[arg(long = "exportMasterRawKey")]
    export_raw_key: bool,

    /// Print the master base58 extended private key
    #[arg(long = "exportMasterExtendedKey")]
    export_extended_key: bool,
}

#[derive(Args)]
struct GeneChildArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Chain type: eth, btc
    #[arg(short = 't', long = "chainType", default_value = "eth")]
    chain_type: String,

    /// Purpose level: 44 or 45
    #[arg(long = "purposeType", default_value_t = 44)]
    purpose: u32,

    /// Org level, only used when purpose is 45
    #[arg(long, default_value_t = 0)]
    org: u32,

    /// Coin type level
    #[arg(long = "coinType", default_value_t = 0)]
    coin_type: u32,

    /// Account level
    #[arg(long, default_value_t = 0)]
    account: u32,

    /// Address index
    #[arg(long = "addressIndex", default_value_t = 0)]
    address_index: u32,
}

#[derive(Args)]
struct ExportChildArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Chain type: eth, btc
    #[arg(short = 't', long = "chainType", default_value = "eth")]
    chain_type: String,

    /// The child address
    #[arg(short = 'a', long = "childAddress", default_value = "")]
    child_address: String,

    /// The child account path
    #[arg(long = "childKeyPath", default_value = "")]
    child_key_path: String,

    /// Print the child raw private key
    #[arg(long = "exportChildRawKey")]
    export_raw_key: bool,

    /// Print the child base58 extended private key
    #[arg(long = "exportChildExtendedKey")]
    export_extended_key: bool,

    /// Print the child keystore JSON
    #[arg(long = "exportChildKeystore")]
    export_keystore: bool,

    /// Password for the exported keystore
    #[arg(long = "childKeystorePwd", default_value = "")]
    keystore_password: String,
}

#[derive(Args)]
struct SignArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Chain type: eth, btc
    #[arg(short = 't', long = "chainType", default_value = "eth")]
    chain_type: String,

    /// The child address
    #[arg(short = 'a', long = "childAddress", default_value = "")]
    child_address: String,

    /// The child account path
    #[arg(long = "childKeyPath", default_value = "")]
    child_key_path: String,

    /// The transaction hash to sign, hex (0x-prefix optional)
    #[arg(long = "signHash", default_value = "")]
    sign_hash: String,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    match Cli::parse().command {
        Command::Master(args) => run_master(args),
        Command::GeneChild(args) => run_gene_child(args),
        Command::ExportChild(args) => run_export_child(args),
        Command::Sign(args) => run_sign(args),
    }
}

/// Loads or bootstraps the wallet. An explicit mnemonic wins, then an
/// extended key, then plain load-or-create.
fn load_vault(common: &CommonArgs) -> Result<Vault> {
    set_active_language(Language::parse(&common.mnemonic_type));

    let vault = if !common.mnemonic.is_empty() {
        Vault::from_mnemonic(
            &common.path,
            &common.password,
            &common.mnemonic,
            common.use_pwd_blur,
        )
    } else if !common.prv_key_base58.is_empty() {
        Vault::from_extended_key(&common.path, &common.password, &common.prv_key_base58)
    } else {
        Vault::create(&common.path, &common.password)
    }
    .context("load or create wallet")?;

    vault.set_save_sub_key(common.save_sub_key);
    vault.set_save_extended_key(common.save_extended_key);
    if !common.save_mnemonic {
        vault.del_mnemonic().context("wipe mnemonic")?;
    }
    Ok(vault)
}

fn adapter_for(chain_type: &str, network_type: &str) -> Box<dyn ChainAdapter> {
    let network = NetworkKind::parse(network_type);
    match chain_type.to_ascii_lowercase().as_str() {
        "btc" => Box::new(BtcAdapter::new(network)),
        _ => Box::new(EthAdapter::new(network)),
    }
}

fn run_master(args: MasterArgs) -> Result<()> {
    let vault = load_vault(&args.common)?;

    if args.export_mnemonic {
        match vault.export_master_mnemonic() {
            Some(mnemonic) => println!("mnemonic: {mnemonic}"),
            None => println!("mnemonic: <wiped>"),
        }
    }
    if args.export_raw_key {
        println!("rawKey: {}", vault.export_master_raw_key());
    }
    if args.export_extended_key {
        println!("extendedKey: {}", vault.export_master_extended_key());
    }
    Ok(())
}

fn run_gene_child(args: GeneChildArgs) -> Result<()> {
    if args.purpose != 44 && args.purpose != 45 {
        bail!("purpose type must be 44 or 45");
    }
    let vault = load_vault(&args.common)?;
    let adapter = adapter_for(&args.chain_type, &args.common.network_type);

    let (address, key_path) = vault
        .create_account(
            args.purpose,
            args.coin_type,
            args.org,
            args.account,
            0,
            args.address_index,
            adapter.as_ref(),
        )
        .context("create child account")?;

    println!("address: {address}");
    println!("keyPath: {key_path}");
    Ok(())
}

fn run_export_child(args: ExportChildArgs) -> Result<()> {
    let vault = load_vault(&args.common)?;
    let adapter = adapter_for(&args.chain_type, &args.common.network_type);

    if args.export_raw_key {
        let key = vault
            .export_raw_key(&args.child_address, &args.child_key_path, adapter.as_ref())
            .context("export child raw key")?;
        println!("rawKey: {key}");
    }
    if args.export_extended_key {
        let key = vault
            .export_extended_key(&args.child_address, &args.child_key_path, adapter.as_ref())
            .context("export child extended key")?;
        println!("extendedKey: {key}");
    }
    if args.export_keystore {
        let keystore = vault
            .export_keystore(
                &args.child_address,
                &args.child_key_path,
                &args.keystore_password,
                adapter.as_ref(),
            )
            .context("export child keystore")?;
        println!("keystore: {keystore}");
    }
    Ok(())
}

fn run_sign(args: SignArgs) -> Result<()> {
    let vault = load_vault(&args.common)?;
    let adapter = adapter_for(&args.chain_type, &args.common.network_type);

    let hash_hex = args.sign_hash.trim_start_matches("0x");
    let hash = hex::decode(hash_hex).context("decode signHash hex")?;

    let signature = vault
        .sign(&args.child_address, &args.child_key_path, &hash, adapter.as_ref())
        .context("sign hash")?;

    println!("signature: 0x{}", hex::encode(signature.v_right()));
    Ok(())
}
