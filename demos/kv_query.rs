//! KV table query demo
//!
//! Run with: cargo run --example kv_query
//!
//! Requires ANTELOPE_NODE_URL. Rows come back in the node's serialized form;
//! this layer does not decode them.

use antelope_sdk::{ChainConfig, GetKvTableRowsRequest, HttpRpcProvider, RpcProvider};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = ChainConfig::from_env()?;
    let rpc = HttpRpcProvider::with_timeout(&config.node_url, config.http_timeout)?;

    let request = GetKvTableRowsRequest::new("kvaddrbook", "kvaddrbook", "accname")
        .with_lower_bound("jane")
        .with_limit(25);

    let response = rpc.get_kv_table_rows(&request).await?;
    println!("Got back {} rows:", response.rows.len());
    for row in &response.rows {
        println!("  {}", row);
    }
    if response.more {
        println!("(more rows available past {:?})", response.next_key);
    }

    Ok(())
}
