//! Fee market benchmarks
//!
//! - End-block controller update across window sizes
//! - Full transaction round trip (pre-phase + post-phase)
//! - Priority computation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use feemarket_common::{Address, Coin, GenesisState, Params, State};
use feemarket_keeper::ante::get_tx_priority;
use feemarket_keeper::testutil::MemBank;
use feemarket_keeper::{
    AnteDecorator, FeeMarketConfig, FeeMarketKeeper, FeeMarketModule, GasMeter, HostEnv,
    MemStore, PostDecorator, StdTx,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

// ============ CONTROLLER BENCHMARKS ============

fn bench_state_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("controller");
    group.measurement_time(Duration::from_secs(5));

    for window in [1u64, 8, 64, 1024].iter() {
        group.throughput(Throughput::Elements(*window));
        group.bench_with_input(BenchmarkId::new("window", window), window, |b, &window| {
            let mut params = Params::default_aimd();
            params.window = window;
            let mut state = State::new(window, Decimal::ONE, params.min_learning_rate);
            for (i, slot) in state.window.iter_mut().enumerate() {
                *slot = (i as u64 * 7_919_993) % params.max_block_utilization;
            }

            b.iter(|| {
                let mut s = state.clone();
                s.update_learning_rate(black_box(&params));
                s.update_base_gas_price(black_box(&params));
                s.increment_height();
                black_box(s)
            });
        });
    }

    group.finish();
}

fn bench_end_block(c: &mut Criterion) {
    let keeper = Arc::new(FeeMarketKeeper::new(
        Arc::new(MemStore::new()),
        FeeMarketConfig::default(),
    ));
    keeper.init_genesis(&GenesisState::default_aimd()).unwrap();
    let module = FeeMarketModule::new(keeper);
    let env = HostEnv::new(1);

    c.bench_function("end_block", |b| {
        b.iter(|| module.end_block(black_box(&env)).unwrap())
    });
}

// ============ FEE PIPELINE BENCHMARKS ============

fn bench_tx_round_trip(c: &mut Criterion) {
    let keeper = Arc::new(FeeMarketKeeper::new(
        Arc::new(MemStore::new()),
        FeeMarketConfig::default(),
    ));
    let mut genesis = GenesisState::default_aimd();
    genesis.params.max_block_utilization = u64::MAX;
    keeper.init_genesis(&genesis).unwrap();
    let module = FeeMarketModule::new(keeper);

    let bank = Arc::new(MemBank::new());
    let alice = Address::new("alice");
    bank.fund(&alice, Coin::new("stake", u128::MAX / 2));

    let ante = module.ante_decorator(bank.clone(), bank.clone());
    let post = module.post_decorator(bank.clone());
    let tx = StdTx::new(alice, vec![Coin::new("stake", 300)], 200);

    c.bench_function("tx_round_trip", |b| {
        b.iter(|| {
            let mut env = HostEnv::new(1)
                .with_proposer(Address::new("proposer"))
                .with_gas_meter(GasMeter::new());
            ante.ante_handle(&mut env, black_box(&tx), false).unwrap();
            env.gas_meter.consume_gas(150, "execution");
            post.post_handle(&mut env, black_box(&tx), false).unwrap();
            black_box(env.priority)
        })
    });
}

fn bench_priority(c: &mut Criterion) {
    c.bench_function("tx_priority", |b| {
        b.iter(|| {
            get_tx_priority(
                black_box(Decimal::new(30_000_000, 0)),
                black_box(21_000),
                black_box(Decimal::new(1_150, 3)),
                1_000_000,
            )
        })
    });
}

criterion_group!(
    benches,
    bench_state_update,
    bench_end_block,
    bench_tx_round_trip,
    bench_priority
);
criterion_main!(benches);
