//! Benchmarks for the pose smoothing pipeline

use ar_overlay::pose::{Pose, PoseBuffer};
use ar_overlay::smoothing::{PoseSmoother, SensitivityProfile};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::Vector3;

fn noisy_pose_stream(n: usize) -> Vec<Pose> {
    (0..n)
        .map(|i| {
            let t = i as f64 / 60.0;
            Pose::from_euler(
                Vector3::new(
                    t.sin() * 0.2 + (rand::random::<f64>() - 0.5) * 0.02,
                    t.cos() * 0.2 + (rand::random::<f64>() - 0.5) * 0.02,
                    (rand::random::<f64>() - 0.5) * 0.02,
                ),
                0.0,
                0.0,
                t * 0.3 + (rand::random::<f64>() - 0.5) * 0.01,
                t,
            )
        })
        .collect()
}

fn benchmark_profiles(c: &mut Criterion) {
    let mut group = c.benchmark_group("smoothing");
    let stream = noisy_pose_stream(100);

    for profile in [
        SensitivityProfile::Low,
        SensitivityProfile::Medium,
        SensitivityProfile::High,
    ] {
        group.bench_with_input(
            BenchmarkId::new("profile", format!("{profile:?}")),
            &profile,
            |b, &profile| {
                let params = profile.params();
                b.iter(|| {
                    let mut smoother = PoseSmoother::new();
                    let mut buffer = PoseBuffer::new(params.buffer_capacity);
                    for pose in &stream {
                        black_box(smoother.smooth(&mut buffer, *pose, &params));
                    }
                });
            },
        );
    }

    group.finish();
}

fn benchmark_single_sample(c: &mut Criterion) {
    let params = SensitivityProfile::Medium.params();
    let stream = noisy_pose_stream(1000);

    c.bench_function("smoothing/steady_state_sample", |b| {
        let mut smoother = PoseSmoother::new();
        let mut buffer = PoseBuffer::new(params.buffer_capacity);
        for pose in &stream {
            smoother.smooth(&mut buffer, *pose, &params);
        }
        let mut i = 0;
        b.iter(|| {
            let pose = stream[i % stream.len()];
            i += 1;
            black_box(smoother.smooth(&mut buffer, pose, &params))
        });
    });
}

criterion_group!(benches, benchmark_profiles, benchmark_single_sample);
criterion_main!(benches);
