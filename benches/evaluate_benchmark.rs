use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cue_sync::sync::{evaluate, CueSchedule, DuckingState};
use cue_sync::{CueRecord, DuckingConfig};

fn create_schedule(count: usize) -> CueSchedule {
    CueSchedule::new(
        (0..count)
            .map(|i| CueRecord::new(format!("{}:{:02}", i / 30, (i * 2) % 60), format!("Sfx{}", i)))
            .collect(),
    )
}

fn bench_evaluate(c: &mut Criterion) {
    let config = DuckingConfig::default();
    let state = DuckingState::inactive();

    for count in [8, 256] {
        let schedule = create_schedule(count);
        c.bench_function(&format!("evaluate_{}_cues", count), |b| {
            b.iter(|| evaluate(black_box(59.3), &schedule, &state, &config))
        });
    }
}

criterion_group!(benches, bench_evaluate);
criterion_main!(benches);
