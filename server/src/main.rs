use anyhow::Result;
use clap::Parser;
use fabler_core::SignatureParams;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

/// Serve searches over a collection written by `fabler extract`.
#[derive(Parser)]
struct Args {
    #[arg(long, default_value = "./data/collection.json")]
    collection: PathBuf,
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Signature width in bits for `model=signature`
    #[arg(long, default_value_t = 64)]
    signature_bits: usize,
    /// Bits set per term signature
    #[arg(long, default_value_t = 3)]
    signature_weight: usize,
    /// Terms per signature block
    #[arg(long, default_value_t = 4)]
    signature_block_size: usize,
    /// Confirm signature candidates against the stored terms
    #[arg(long, default_value_t = false)]
    verify_signatures: bool,
}

impl Args {
    fn signature(&self) -> SignatureParams {
        SignatureParams {
            bits: self.signature_bits,
            weight: self.signature_weight,
            block_size: self.signature_block_size,
            verify: self.verify_signatures,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let app = fabler_server::build_app(&args.collection, args.signature())?;

    let addr = SocketAddr::new(args.host, args.port);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, collection = %args.collection.display(), "serving fables");
    axum::serve(listener, app).await?;
    Ok(())
}
