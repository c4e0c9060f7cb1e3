use std::io;
use std::sync::Arc;

use futures_util::StreamExt;
use scan_stream::impls::mem_store::MemStore;
use scan_stream::ScanIterator;
use scan_stream::ScanOptions;
use scan_stream::ScanStream;

#[tokio::main]
async fn main() -> io::Result<()> {
    // Create an in-memory store and fill it with some data
    let store = Arc::new(MemStore::default());
    for i in 0..1000 {
        store.set(format!("key-{}", i), "value");
        store.zadd("scores", i as f64, format!("player-{}", i))?;
    }

    // Pull: iterate over the keys matching a pattern, 200 entries per round trip
    let opts = ScanOptions::limit(200).with_match("key-99*");
    for key in ScanIterator::scan(store.clone(), opts) {
        println!("Key: {}", key?);
    }

    // Push: only the first 5 members are fetched and emitted
    let mut strm = ScanStream::zscan(store.clone(), "scores", ScanOptions::limit(5)).take(5);
    while let Some(result) = strm.next().await {
        let member = result?;
        println!("Member: {}", member);
    }

    // Push with explicit demand
    let engine = scan_stream::ScanEngine::new(
        scan_stream::variants::KeyScan::new(store),
        ScanOptions::default(),
    );
    let mut strm = ScanStream::with_demand(engine, 0);
    strm.request(3);
    for _ in 0..3 {
        if let Some(key) = strm.next().await {
            println!("Requested key: {}", key?);
        }
    }
    strm.cancel();
    println!("Stream state: {:?}", strm.state());

    Ok(())
}
