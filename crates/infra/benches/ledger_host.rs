use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::Utc;
use serde_json::Value as JsonValue;
use spacedao_core::{Address, LedgerId};
use spacedao_events::{EventEnvelope, InMemoryEventBus, execute};
use spacedao_fixed_supply::{AGGREGATE_TYPE, FixedSupplyCommand, FixedSupplyLedger};
use spacedao_infra::{HostConfig, InMemoryEventStore, LedgerHost};
use spacedao_token::{Genesis, TransferTokens};
use std::sync::Arc;

type Host = LedgerHost<
    FixedSupplyLedger,
    Arc<InMemoryEventStore>,
    Arc<InMemoryEventBus<EventEnvelope<JsonValue>>>,
>;

fn deployed_host(deployer: Address) -> Host {
    let host = LedgerHost::new(
        FixedSupplyLedger::empty(LedgerId::new()),
        AGGREGATE_TYPE,
        Arc::new(InMemoryEventStore::new()),
        Arc::new(InMemoryEventBus::new()),
        HostConfig::default(),
    );
    host.execute(&FixedSupplyCommand::Genesis(Genesis {
        deployer,
        occurred_at: Utc::now(),
    }))
    .unwrap();
    host
}

fn transfer(caller: Address, to: Address) -> FixedSupplyCommand {
    FixedSupplyCommand::Transfer(TransferTokens {
        caller,
        to,
        amount: 1,
        occurred_at: Utc::now(),
    })
}

fn bench_command_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("command_latency");
    group.throughput(Throughput::Elements(1));

    group.bench_function("transfer_in_memory_aggregate", |b| {
        let deployer = Address::new();
        let to = Address::new();
        let mut ledger = FixedSupplyLedger::empty(LedgerId::new());
        execute(
            &mut ledger,
            &FixedSupplyCommand::Genesis(Genesis {
                deployer,
                occurred_at: Utc::now(),
            }),
        )
        .unwrap();

        b.iter(|| black_box(execute(&mut ledger, &transfer(deployer, to)).unwrap()));
    });

    group.bench_function("transfer_through_host", |b| {
        let deployer = Address::new();
        let to = Address::new();
        let host = deployed_host(deployer);

        b.iter(|| black_box(host.execute(&transfer(deployer, to)).unwrap()));
    });

    group.finish();
}

fn bench_restore_speed(c: &mut Criterion) {
    let mut group = c.benchmark_group("restore_speed");

    for event_count in [10u64, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*event_count));
        group.bench_with_input(
            BenchmarkId::new("replay_stream", event_count),
            event_count,
            |b, &count| {
                let deployer = Address::new();
                let to = Address::new();
                let host = deployed_host(deployer);
                // Genesis already wrote two events.
                for _ in 2..count {
                    host.execute(&transfer(deployer, to)).unwrap();
                }
                let ledger_id = host.ledger_id().unwrap();

                b.iter(|| {
                    let restored: Host = LedgerHost::restore(
                        FixedSupplyLedger::empty(ledger_id),
                        AGGREGATE_TYPE,
                        host.store().clone(),
                        host.bus().clone(),
                        HostConfig::default(),
                    )
                    .unwrap();
                    black_box(restored.version().unwrap())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_command_latency, bench_restore_speed);
criterion_main!(benches);
