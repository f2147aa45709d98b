use bytering::RingBuffer;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn bench_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_buffer");
    let chunk = [0x11u8; 64];
    group.throughput(Throughput::Bytes(chunk.len() as u64));

    group.bench_function("write_read_roundtrip_64b", |b| {
        let mut rb = RingBuffer::new(1 << 20).unwrap();
        let mut out = [0u8; 64];
        b.iter(|| {
            rb.write(black_box(&chunk)).unwrap();
            rb.read(&mut out).unwrap();
        })
    });

    group.bench_function("wrapping_roundtrip_64b", |b| {
        // Capacity not a multiple of the chunk, so copies keep splitting at the wrap
        let mut rb = RingBuffer::new(1000).unwrap();
        let mut out = [0u8; 64];
        b.iter(|| {
            rb.write(black_box(&chunk)).unwrap();
            rb.read(&mut out).unwrap();
        })
    });

    group.bench_function("read_bytes_line_64b", |b| {
        let mut rb = RingBuffer::new(4096).unwrap();
        let mut line = [b'x'; 64];
        line[63] = b'\n';
        let mut frame = Vec::with_capacity(64);
        b.iter(|| {
            rb.write(&line).unwrap();
            frame.clear();
            rb.read_bytes(b'\n', &mut frame).unwrap();
            black_box(&frame);
        })
    });

    group.finish();
}

criterion_group!(benches, bench_throughput);
criterion_main!(benches);
