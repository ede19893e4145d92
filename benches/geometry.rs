use criterion::{criterion_group, criterion_main, Criterion, black_box};

use atmoscatter::atmosphere::Atmosphere;
use atmoscatter::render::buffer::{BufferElement, BufferLayout, ElementType};
use atmoscatter::render::mesh::MeshData;

fn bench_uv_sphere_default(c: &mut Criterion) {
    c.bench_function("uv_sphere_64x128", |b| {
        b.iter(|| MeshData::uv_sphere(black_box(64), black_box(128)));
    });
}

fn bench_uv_sphere_dense(c: &mut Criterion) {
    c.bench_function("uv_sphere_256x512", |b| {
        b.iter(|| MeshData::uv_sphere(black_box(256), black_box(512)));
    });
}

fn bench_layout_unpacked(c: &mut Criterion) {
    c.bench_function("buffer_layout_unpacked", |b| {
        b.iter(|| {
            let layout = BufferLayout::new(
                vec![
                    BufferElement::new(ElementType::Float3, "Position"),
                    BufferElement::new(ElementType::UInt8_2, "Flags"),
                    BufferElement::new(ElementType::Float2, "TexCoord"),
                    BufferElement::new(ElementType::Mat4, "Transform"),
                ],
                black_box(true),
            );
            layout.attributes(0)
        });
    });
}

fn bench_atmosphere_uniform(c: &mut Criterion) {
    let mut atmosphere = Atmosphere::default();
    atmosphere.set_animate_sun(true);

    c.bench_function("atmosphere_update_uniform", |b| {
        b.iter(|| {
            atmosphere.update(black_box(1.0 / 60.0));
            atmosphere.uniform()
        });
    });
}

criterion_group!(
    benches,
    bench_uv_sphere_default,
    bench_uv_sphere_dense,
    bench_layout_unpacked,
    bench_atmosphere_uniform,
);
criterion_main!(benches);
