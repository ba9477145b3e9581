use criterion::{criterion_group, criterion_main, Criterion};
use khora_gfx_core::renderer::api::pipeline::enums::{BlendFactor, CompareFunction};
use khora_gfx_core::renderer::api::pipeline::state::{
    BlendComponentDescriptor, BlendStateDescriptor, ColorWrites, DepthStateDescriptor,
};
use khora_gles::graphics::gles::{GlesBackend, GlesSettings, NativeContext, RecordingGl};
use std::hint::black_box;

fn bench_state_cache(c: &mut Criterion) {
    let gl = RecordingGl::new();
    let log = gl.log();
    let mut backend = GlesBackend::new(Box::new(gl), GlesSettings::default()).unwrap();
    backend.make_current(NativeContext(1)).unwrap();

    // 64 distinct blend states, each interned many times below
    let descriptors: Vec<BlendStateDescriptor> = (0..64u8)
        .map(|i| BlendStateDescriptor {
            alpha_to_coverage: i % 2 == 0,
            color: BlendComponentDescriptor {
                src_factor: if i % 4 < 2 {
                    BlendFactor::SrcAlpha
                } else {
                    BlendFactor::One
                },
                dst_factor: BlendFactor::OneMinusSrcAlpha,
                ..BlendComponentDescriptor::REPLACE
            },
            write_mask: ColorWrites::from_bits_truncate(i % 16),
            ..BlendStateDescriptor::default()
        })
        .collect();

    let mut group = c.benchmark_group("Pipeline State Cache");

    group.bench_function("Intern (hit)", |b| {
        b.iter(|| {
            for desc in &descriptors {
                black_box(backend.create_blend_state(*desc));
            }
        });
    });

    let blend_ids: Vec<_> = descriptors
        .iter()
        .map(|d| backend.create_blend_state(*d))
        .collect();
    let depth_ids = [
        backend.create_depth_state(DepthStateDescriptor::default()),
        backend.create_depth_state(DepthStateDescriptor {
            write_enabled: false,
            compare: CompareFunction::LessEqual,
            ..DepthStateDescriptor::default()
        }),
    ];

    group.bench_function("Redundant set (no driver calls)", |b| {
        backend.set_blend_state(blend_ids[0]);
        b.iter(|| {
            for _ in 0..64 {
                backend.set_blend_state(black_box(blend_ids[0]));
            }
        });
    });

    group.bench_function("Alternating set (diffed driver calls)", |b| {
        b.iter(|| {
            for (i, id) in blend_ids.iter().enumerate() {
                backend.set_blend_state(*id);
                backend.set_depth_state(depth_ids[i % 2]);
            }
            log.clear();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_state_cache);
criterion_main!(benches);
