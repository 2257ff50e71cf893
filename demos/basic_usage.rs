//! Basic usage example of the entity cache.

use bridge_cache::model::{Group, Member};
use bridge_cache::observability::LogMetrics;
use bridge_cache::source::InMemorySource;
use bridge_cache::{
    CacheConfig, CacheRegistry, CacheStrategy, EntityCache, EntityManager, Lookup, Result,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Debug)
        .init();

    println!("=== bridge-cache basic usage ===\n");

    let config = CacheConfig::from_json(r#"{ "capacity_hint": 64 }"#)?;
    let registry = CacheRegistry::with_config(config).with_metrics(Arc::new(LogMetrics));

    // The "server": what an HTTP + XML source would return.
    let server = InMemorySource::new();
    server.insert(
        Member::new(1)
            .with_username("alice")
            .with_email("alice@example.org"),
    );
    server.insert(Member::new(2).with_username("bob"));

    let members = EntityManager::<Member, _>::new(&registry, server);

    println!("1. Read-through by username (cache miss -> fetch)");
    let alice = members
        .get(&Lookup::key("alice"), CacheStrategy::Refresh)
        .await?;
    println!("   found: {:?}\n", alice);

    println!("2. Same member by id (cache hit)");
    members.get(&Lookup::Id(1), CacheStrategy::Refresh).await?;
    println!("   fetches so far: {}\n", members.source().fetch_count());

    println!("3. Version of the cached entry");
    let version = members.store().get_version("alice");
    println!("   alice version: {:?}\n", version);

    println!("4. Remote rename, then invalidate");
    members
        .source()
        .insert(Member::new(1).with_username("alice.liddell"));
    members
        .get(&Lookup::Id(1), CacheStrategy::Invalidate)
        .await?;
    println!(
        "   by old key: {:?}, by new key: {:?}\n",
        members.store().get_by_key("alice").is_some(),
        members.store().get_by_key("alice.liddell").is_some()
    );

    println!("5. Write-through after a remote create");
    let groups = registry.store::<Group>();
    groups.put(Group::new(10).with_name("acme-web").with_owner("ACME"))?;
    println!("   group: {:?}\n", groups.get_by_key("acme-web"));

    println!("6. Entities without id are rejected");
    if let Err(e) = groups.put(Group::named("acme-draft")) {
        println!("   {}\n", e);
    }

    println!("7. Snapshot and flush");
    let snapshot = members.store().export()?;
    registry.remove_all();
    let restored = members.store().import(&snapshot)?;
    println!("   restored {} members", restored);

    for stats in registry.stats() {
        println!(
            "   [{}] {} entries, {} hits, {} misses",
            stats.kind, stats.entries, stats.hits, stats.misses
        );
    }

    Ok(())
}
