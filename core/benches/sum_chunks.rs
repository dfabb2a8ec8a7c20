use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use blockzip_core::prelude::*;

const CHUNK_ELEMS: usize = 256 * 1024;
const NCHUNKS: usize = 32;

fn build_container(codec: CompressionCodec) -> ChunkedContainer {
    let params = CompressionParams::new(codec, 5, 8);
    let values: Vec<i64> = (0..(CHUNK_ELEMS * NCHUNKS) as i64).map(|v| v / 5).collect();
    let mut container = ChunkedContainer::new(8);
    ChunkPipeline::new(&PipelineConfig::all_cores())
        .compress_into(&mut container, bytemuck::cast_slice(&values), CHUNK_ELEMS * 8, &params, default_tuner())
        .expect("compress");
    container
}

fn sum_i64(acc: &mut i64, _index: usize, bytes: &[u8]) {
    *acc += bytes
        .chunks_exact(8)
        .map(|b| i64::from_ne_bytes(b.try_into().unwrap()))
        .sum::<i64>();
}

fn bench_sum_chunks(c: &mut Criterion) {
    for codec in [CompressionCodec::Lz4, CompressionCodec::Zstd] {
        let container = build_container(codec);
        let mut group = c.benchmark_group(format!("sum_chunks/{}", codec.name()));
        group.throughput(Throughput::Bytes(container.total_uncompressed_bytes() as u64));

        for workers in [1usize, 2, 4, 8] {
            let pipeline = ChunkPipeline::new(&PipelineConfig::new(workers, RemainderPolicy::RoundRobin));
            group.bench_with_input(BenchmarkId::from_parameter(workers), &pipeline, |b, p| {
                b.iter(|| {
                    p.map_reduce(black_box(&container), || 0i64, sum_i64, |a, b| a + b)
                        .expect("map_reduce")
                        .value
                })
            });
        }
        group.finish();
    }
}

fn bench_compress_into(c: &mut Criterion) {
    let values: Vec<i64> = (0..(CHUNK_ELEMS * 8) as i64).map(|v| v % 1000).collect();
    let src: &[u8] = bytemuck::cast_slice(&values);
    let params = CompressionParams::new(CompressionCodec::Lz4, 5, 8);

    let mut group = c.benchmark_group("compress_into");
    group.throughput(Throughput::Bytes(src.len() as u64));
    for workers in [1usize, 4] {
        let pipeline = ChunkPipeline::new(&PipelineConfig::new(workers, RemainderPolicy::Tail));
        group.bench_with_input(BenchmarkId::from_parameter(workers), &pipeline, |b, p| {
            b.iter(|| {
                let mut container = ChunkedContainer::new(8);
                p.compress_into(&mut container, black_box(src), CHUNK_ELEMS * 8, &params, default_tuner())
                    .expect("compress_into");
                container
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sum_chunks, bench_compress_into);
criterion_main!(benches);
