//! Conversion throughput for a synthetic mixed trace.
//!
//! Run with: cargo bench --bench convert_benchmark

use asc2pcapng::{AscReader, Converter, PcapngWriter, pcapng::VecWriter};
use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

/// Build a trace with `records` lines cycling through CAN, CAN FD and Ethernet.
fn synthetic_trace(records: usize) -> String {
    let mut trace = String::from("date Mon Mar 10 12:34:56.789 pm 2025\nbase hex  timestamps absolute\n");
    for i in 0..records {
        let time = i as f64 * 0.0005;
        let channel = i % 4 + 1;
        let line = match i % 3 {
            0 => format!(
                "{time:.6} {channel}  {:X}  Rx   d 8 11 22 33 44 55 66 77 88\n",
                0x100 + i % 0x600
            ),
            1 => format!(
                "{time:.6} CANFD {channel} Tx {:X}x 1 0 d 32 {} 130000 130 1000\n",
                0x1800_0000 + i,
                vec!["AB"; 32].join(" ")
            ),
            _ => format!("{time:.6} ETH {channel} Rx 14:ffffffffffff0011223344550800\n"),
        };
        trace.push_str(&line);
    }
    trace
}

fn bench_reader(c: &mut Criterion) {
    let trace = synthetic_trace(10_000);
    let mut group = c.benchmark_group("reader");
    group.throughput(Throughput::Bytes(trace.len() as u64));
    group.bench_function("decode_10k_lines", |b| {
        b.iter(|| {
            let count = AscReader::new(black_box(trace.as_bytes()))
                .filter_map(|event| event.ok())
                .count();
            black_box(count)
        })
    });
    group.finish();
}

fn bench_convert(c: &mut Criterion) {
    let trace = synthetic_trace(10_000);
    let mut group = c.benchmark_group("convert");
    group.throughput(Throughput::Elements(10_000));
    group.bench_function("to_pcapng_in_memory", |b| {
        b.iter(|| {
            let mut writer = PcapngWriter::from_writer(VecWriter::with_capacity(2 << 20))
                .expect("section header");
            Converter::new()
                .run(AscReader::new(black_box(trace.as_bytes())), &mut writer)
                .expect("conversion");
            black_box(writer.finish().expect("flush").len())
        })
    });
    group.finish();
}

criterion_group!(benches, bench_reader, bench_convert);
criterion_main!(benches);
